use crate::history_store::HistoryStore;
use crate::prefetch::PrefetchQueue;
use nebula_core::content::ContentItem;
use nebula_core::{ArcadeError, GameMode, History, Result};

/// What the UI should show for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing loaded yet.
    Idle,
    /// A round is in progress.
    Playing,
    /// The current round was solved, chosen or won.
    RoundComplete,
    /// The player lost the current run.
    GameOver,
    /// The last batch held only repeats; asking again may help.
    OutOfContent,
    /// The model quota is spent. Terminal for this session.
    QuotaExhausted,
    /// The last action failed; the message is shown and the action may be
    /// retried.
    Failed(String),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::QuotaExhausted)
    }
}

/// State and history bookkeeping shared by every session controller.
///
/// History lives in the shared [`HistoryStore`], so sessions of the same
/// mode see each other's answers.
pub(crate) struct SessionTracker {
    mode: GameMode,
    histories: HistoryStore,
    state: SessionState,
}

impl SessionTracker {
    pub(crate) fn new(mode: GameMode, histories: HistoryStore) -> Self {
        Self {
            mode,
            histories,
            state: SessionState::Idle,
        }
    }

    pub(crate) fn mode(&self) -> GameMode {
        self.mode
    }

    pub(crate) fn state(&self) -> &SessionState {
        &self.state
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    pub(crate) fn history(&self) -> History {
        self.histories.load(self.mode)
    }

    /// Refuses every action once the quota is gone.
    pub(crate) fn ensure_active(&self) -> Result<()> {
        if self.state.is_terminal() {
            return Err(ArcadeError::QuotaExceeded(format!(
                "{} session halted after quota exhaustion",
                self.mode
            )));
        }
        Ok(())
    }

    /// Moves into the degraded state matching `error` and hands it back.
    pub(crate) fn fail(&mut self, error: ArcadeError) -> ArcadeError {
        self.state = if error.is_quota_exceeded() {
            SessionState::QuotaExhausted
        } else {
            SessionState::Failed(error.to_string())
        };
        tracing::warn!(mode = %self.mode, state = ?self.state, error = %error, "Session degraded");
        error
    }

    /// Draws the next unseen item from `queue`.
    pub(crate) async fn draw(&mut self, queue: &PrefetchQueue) -> Result<Option<ContentItem>> {
        self.ensure_active()?;
        let history = self.history();
        match queue.next(&history).await {
            Ok(Some(item)) => {
                self.state = SessionState::Playing;
                Ok(Some(item))
            }
            Ok(None) => {
                self.state = SessionState::OutOfContent;
                Ok(None)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Marks the round complete and appends `identifier` to history.
    ///
    /// A history write failure is logged; the round still counts.
    pub(crate) fn complete(&mut self, identifier: &str) {
        self.state = SessionState::RoundComplete;
        if let Err(e) = self.histories.record(self.mode, identifier) {
            tracing::warn!(mode = %self.mode, error = %e, "Failed to persist history");
        }
    }
}
