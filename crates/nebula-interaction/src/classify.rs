//! Maps provider error shapes into the arcade's error taxonomy.
//!
//! This is the only place that looks at HTTP statuses, provider codes and
//! message wording. Everything downstream matches on [`ArcadeError`].

use nebula_core::ArcadeError;
use nebula_core::model::ProviderError;

const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";
const UNAVAILABLE: &str = "UNAVAILABLE";

/// How the transport should react to a failed attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorClass {
    /// Worth another attempt after a backoff delay.
    Transient,
    /// Surface immediately, no retry.
    Fatal(ArcadeError),
}

/// Classifies one failed model call.
///
/// Rules, first match wins:
/// 1. "not found" / "API key not valid" wording → `CredentialInvalid`
/// 2. 429 or `RESOURCE_EXHAUSTED` with quota wording, or `RESOURCE_EXHAUSTED`
///    with no HTTP status at all → `QuotaExceeded`
/// 3. 429, 503, `UNAVAILABLE` or "overloaded" wording → transient
/// 4. anything else → `Provider`, surfaced unchanged
pub fn classify(error: &ProviderError) -> ErrorClass {
    let message = error.message.to_lowercase();
    let code = error.code.as_deref().unwrap_or_default();
    let resource_exhausted = code.eq_ignore_ascii_case(RESOURCE_EXHAUSTED);
    let too_many_requests = error.status == Some(429);

    if message.contains("not found") || message.contains("api key not valid") {
        return ErrorClass::Fatal(ArcadeError::CredentialInvalid(error.message.clone()));
    }

    let quota_wording = message.contains("quota");
    if ((too_many_requests || resource_exhausted) && quota_wording)
        || (resource_exhausted && error.status.is_none())
    {
        return ErrorClass::Fatal(ArcadeError::QuotaExceeded(error.message.clone()));
    }

    if too_many_requests
        || error.status == Some(503)
        || code.eq_ignore_ascii_case(UNAVAILABLE)
        || message.contains("overloaded")
    {
        return ErrorClass::Transient;
    }

    ErrorClass::Fatal(ArcadeError::Provider {
        status: error.status,
        message: error.to_string(),
    })
}
