use super::tracker::{SessionState, SessionTracker};
use crate::history_store::HistoryStore;
use crate::prefetch::PrefetchQueue;
use nebula_core::content::{CipherPuzzle, ContentItem, EmojiPuzzle};
use nebula_core::{ArcadeError, GameMode, History, Result};
use std::sync::Arc;

/// A guess-the-answer puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Puzzle {
    Emoji(EmojiPuzzle),
    Cipher(CipherPuzzle),
}

impl Puzzle {
    fn from_item(item: ContentItem) -> Result<Self> {
        match item {
            ContentItem::EmojiPuzzle(puzzle) => Ok(Puzzle::Emoji(puzzle)),
            ContentItem::CipherPuzzle(puzzle) => Ok(Puzzle::Cipher(puzzle)),
            other => Err(ArcadeError::internal(format!(
                "{} item served to a puzzle session",
                other.mode()
            ))),
        }
    }

    pub fn answer(&self) -> &str {
        match self {
            Puzzle::Emoji(puzzle) => &puzzle.answer,
            Puzzle::Cipher(puzzle) => &puzzle.original,
        }
    }

    /// Hints in reveal order: five escalating hints for emoji puzzles, the
    /// category and then the rule for ciphers.
    pub fn hints(&self) -> Vec<&str> {
        match self {
            Puzzle::Emoji(puzzle) => puzzle.hints.iter().map(String::as_str).collect(),
            Puzzle::Cipher(puzzle) => vec![puzzle.category.as_str(), puzzle.rule.as_str()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct,
    Incorrect,
}

/// Controller for emoji riddles and cipher puzzles.
pub struct PuzzleSession {
    tracker: SessionTracker,
    queue: Arc<PrefetchQueue>,
    current: Option<Puzzle>,
    hints_revealed: usize,
}

impl PuzzleSession {
    /// # Errors
    ///
    /// Returns `InvalidAction` if `queue` serves neither emoji riddles nor
    /// ciphers.
    pub fn new(queue: Arc<PrefetchQueue>, histories: HistoryStore) -> Result<Self> {
        let mode = queue.mode();
        if !matches!(mode, GameMode::EmojiRiddle | GameMode::Cipher) {
            return Err(ArcadeError::invalid_action(format!(
                "{mode} is not a puzzle mode"
            )));
        }
        Ok(Self {
            tracker: SessionTracker::new(mode, histories),
            queue,
            current: None,
            hints_revealed: 0,
        })
    }

    /// Loads the next puzzle.
    ///
    /// # Returns
    ///
    /// `None` when the batch held only seen answers (state `OutOfContent`).
    pub async fn start(&mut self) -> Result<Option<&Puzzle>> {
        self.current = None;
        self.hints_revealed = 0;

        let Some(item) = self.tracker.draw(&self.queue).await? else {
            return Ok(None);
        };
        let puzzle = Puzzle::from_item(item).map_err(|e| self.tracker.fail(e))?;
        let puzzle = self.current.insert(puzzle);
        Ok(Some(&*puzzle))
    }

    /// Abandons the current puzzle without recording it and loads another.
    pub async fn skip(&mut self) -> Result<Option<&Puzzle>> {
        if let Some(puzzle) = &self.current {
            tracing::debug!(mode = %self.tracker.mode(), answer = puzzle.answer(), "Puzzle skipped");
        }
        self.start().await
    }

    /// Reveals the next hint, if any are left.
    pub fn reveal_hint(&mut self) -> Option<&str> {
        let puzzle = self.current.as_ref()?;
        let hint = puzzle.hints().get(self.hints_revealed).copied()?;
        self.hints_revealed += 1;
        Some(hint)
    }

    /// Checks `guess` against the answer, ignoring case and surrounding
    /// whitespace. A correct guess completes the round and records the
    /// answer in history.
    pub fn submit_guess(&mut self, guess: &str) -> Result<GuessOutcome> {
        self.tracker.ensure_active()?;
        if self.tracker.state() != &SessionState::Playing {
            return Err(ArcadeError::invalid_action("no puzzle in progress"));
        }
        let answer = match &self.current {
            Some(puzzle) => puzzle.answer().to_string(),
            None => return Err(ArcadeError::invalid_action("no puzzle in progress")),
        };

        if History::normalize(guess) != History::normalize(&answer) {
            return Ok(GuessOutcome::Incorrect);
        }

        self.tracker.complete(&answer);
        Ok(GuessOutcome::Correct)
    }

    pub fn current(&self) -> Option<&Puzzle> {
        self.current.as_ref()
    }

    pub fn hints_revealed(&self) -> usize {
        self.hints_revealed
    }

    pub fn state(&self) -> &SessionState {
        self.tracker.state()
    }

    /// Snapshot of the answers recorded for this mode.
    pub fn history(&self) -> History {
        self.tracker.history()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, cipher_batch, generator, memory_store};

    fn emoji_batch() -> String {
        serde_json::json!([{
            "emojis": "🦁👑",
            "answer": "The Lion King",
            "hints": ["Film", "1994", "Disney", "Africa", "Simba"]
        }])
        .to_string()
    }

    fn session(mode: GameMode, transport: &Arc<ScriptedTransport>) -> PuzzleSession {
        let queue = Arc::new(PrefetchQueue::new(mode, 5, generator(transport.clone())));
        PuzzleSession::new(queue, HistoryStore::new(memory_store())).unwrap()
    }

    #[tokio::test]
    async fn test_emoji_round_with_hints() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(emoji_batch())]));
        let mut puzzles = session(GameMode::EmojiRiddle, &transport);

        let puzzle = puzzles.start().await.unwrap().unwrap();
        assert_eq!(puzzle.answer(), "The Lion King");

        let hints: Vec<String> =
            std::iter::from_fn(|| puzzles.reveal_hint().map(String::from)).collect();
        assert_eq!(hints.len(), 5);
        assert_eq!(puzzles.reveal_hint(), None);

        assert_eq!(puzzles.submit_guess("lion king").unwrap(), GuessOutcome::Incorrect);
        assert_eq!(puzzles.submit_guess("  the LION king ").unwrap(), GuessOutcome::Correct);
        assert_eq!(puzzles.state(), &SessionState::RoundComplete);
        assert!(puzzles.history().contains("The Lion King"));

        // The round is over; further guesses are refused
        assert!(puzzles.submit_guess("The Lion King").is_err());
    }

    #[tokio::test]
    async fn test_skip_does_not_record_history() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(cipher_batch(&[
            "APPLE", "PEAR",
        ]))]));
        let mut puzzles = session(GameMode::Cipher, &transport);

        puzzles.start().await.unwrap();
        let next = puzzles.skip().await.unwrap().unwrap();
        assert_eq!(next.answer(), "PEAR");
        assert!(puzzles.history().is_empty());
    }

    #[tokio::test]
    async fn test_all_seen_batch_reports_out_of_content() {
        let store = memory_store();
        let histories = HistoryStore::new(store.clone());
        for word in ["APPLE", "PEAR", "PLUM", "KIWI", "LIME"] {
            histories.record(GameMode::Cipher, word).unwrap();
        }

        let transport = Arc::new(ScriptedTransport::new(vec![Ok(cipher_batch(&[
            "APPLE", "PEAR", "PLUM", "KIWI", "LIME",
        ]))]));
        let queue = Arc::new(PrefetchQueue::new(GameMode::Cipher, 5, generator(transport.clone())));
        let mut puzzles = PuzzleSession::new(queue.clone(), HistoryStore::new(store)).unwrap();

        assert!(puzzles.start().await.unwrap().is_none());
        assert_eq!(puzzles.state(), &SessionState::OutOfContent);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_quota_error_halts_session() {
        let transport = Arc::new(ScriptedTransport::new(vec![Err(ArcadeError::QuotaExceeded(
            "spent".into(),
        ))]));
        let mut puzzles = session(GameMode::Cipher, &transport);

        assert!(puzzles.start().await.unwrap_err().is_quota_exceeded());
        assert_eq!(puzzles.state(), &SessionState::QuotaExhausted);

        // Terminal: no further model calls
        assert!(puzzles.start().await.unwrap_err().is_quota_exceeded());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retryable() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(ArcadeError::RetriesExhausted {
                attempts: 3,
                last_message: "overloaded".into(),
            }),
            Ok(cipher_batch(&["APPLE"])),
        ]));
        let mut puzzles = session(GameMode::Cipher, &transport);

        assert!(puzzles.start().await.is_err());
        assert!(matches!(puzzles.state(), SessionState::Failed(_)));

        assert!(puzzles.start().await.unwrap().is_some());
        assert_eq!(puzzles.state(), &SessionState::Playing);
    }

    #[test]
    fn test_rejects_non_puzzle_queue() {
        let transport = Arc::new(ScriptedTransport::new(Vec::new()));
        let queue = Arc::new(PrefetchQueue::new(GameMode::Dilemma, 5, generator(transport)));
        assert!(PuzzleSession::new(queue, HistoryStore::new(memory_store())).is_err());
    }
}
