//! Candidate fallback policy
//!
//! Pure classification of one candidate's outcome plus the small state that
//! carries across candidates. No I/O, so the whole retry protocol is testable
//! with scripted outcomes.

use super::error::{AttemptError, AttemptErrorKind, CompletionError, TransportError};
use super::types::BackendReply;
use std::ops::ControlFlow;

/// Statuses that only disqualify the current candidate
const SOFT_STATUSES: &[u16] = &[400, 404, 429];

/// What one candidate's outcome means for the call
#[derive(Debug)]
pub enum Verdict {
    Success(String),
    Soft(AttemptError),
    Abort(CompletionError),
}

/// Classify a single candidate outcome
pub fn classify(model: &str, outcome: Result<BackendReply, TransportError>) -> Verdict {
    let reply = match outcome {
        Ok(reply) => reply,
        Err(e) => {
            return Verdict::Abort(CompletionError::Network {
                model: model.to_string(),
                message: e.message,
            })
        }
    };

    if (200..300).contains(&reply.status) {
        return match reply.completion {
            Some(text) if !text.trim().is_empty() => Verdict::Success(text),
            _ => Verdict::Soft(AttemptError {
                model: model.to_string(),
                kind: AttemptErrorKind::MalformedResponse,
                status: reply.status,
                message: "Response contained no completion text".to_string(),
            }),
        };
    }

    let message = reply
        .error_message
        .unwrap_or_else(|| format!("HTTP {}", reply.status));

    if SOFT_STATUSES.contains(&reply.status) {
        Verdict::Soft(AttemptError {
            model: model.to_string(),
            kind: AttemptErrorKind::RateLimitedOrInvalidModel,
            status: reply.status,
            message,
        })
    } else {
        Verdict::Abort(CompletionError::FatalProvider {
            model: model.to_string(),
            status: reply.status,
            message,
        })
    }
}

/// Progress through the candidate list
#[derive(Debug, Default)]
pub struct FallbackPolicy {
    attempts: usize,
    last: Option<AttemptError>,
}

impl FallbackPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one candidate's outcome. `Break` ends the call with its result;
    /// `Continue` means the next candidate should be tried.
    pub fn step(
        &mut self,
        model: &str,
        outcome: Result<BackendReply, TransportError>,
    ) -> ControlFlow<Result<String, CompletionError>> {
        self.attempts += 1;
        match classify(model, outcome) {
            Verdict::Success(text) => ControlFlow::Break(Ok(text)),
            Verdict::Abort(e) => ControlFlow::Break(Err(e)),
            Verdict::Soft(e) => {
                tracing::warn!(model = %e.model, status = e.status, kind = ?e.kind, error = %e.message, "Candidate failed, trying next");
                self.last = Some(e);
                ControlFlow::Continue(())
            }
        }
    }

    /// Terminal error once every candidate has been consumed
    pub fn exhausted(self) -> CompletionError {
        match self.last {
            Some(last) => CompletionError::AllModelsFailed {
                attempts: self.attempts,
                last,
            },
            None => CompletionError::NoCandidates,
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_requires_text() {
        assert!(matches!(
            classify("m", Ok(BackendReply::ok("hello"))),
            Verdict::Success(t) if t == "hello"
        ));

        let empty = BackendReply {
            status: 200,
            completion: None,
            error_message: None,
        };
        assert!(matches!(
            classify("m", Ok(empty)),
            Verdict::Soft(AttemptError { kind: AttemptErrorKind::MalformedResponse, .. })
        ));
        assert!(matches!(
            classify("m", Ok(BackendReply::ok("  \n"))),
            Verdict::Soft(AttemptError { kind: AttemptErrorKind::MalformedResponse, .. })
        ));
    }

    #[test]
    fn test_soft_statuses() {
        for status in [400, 404, 429] {
            let verdict = classify("m", Ok(BackendReply::status(status, "nope")));
            assert!(
                matches!(
                    verdict,
                    Verdict::Soft(AttemptError {
                        kind: AttemptErrorKind::RateLimitedOrInvalidModel,
                        ..
                    })
                ),
                "status {status}"
            );
        }
    }

    #[test]
    fn test_other_statuses_are_fatal() {
        for status in [401, 403, 500, 503] {
            let verdict = classify("m", Ok(BackendReply::status(status, "boom")));
            assert!(
                matches!(verdict, Verdict::Abort(CompletionError::FatalProvider { status: s, .. }) if s == status),
                "status {status}"
            );
        }
    }

    #[test]
    fn test_transport_failure_aborts() {
        let verdict = classify("m", Err(TransportError::new("dns")));
        assert!(matches!(
            verdict,
            Verdict::Abort(CompletionError::Network { .. })
        ));
    }

    #[test]
    fn test_exhausted_carries_last_error() {
        let mut policy = FallbackPolicy::new();
        assert!(policy
            .step("a", Ok(BackendReply::status(429, "slow down")))
            .is_continue());
        assert!(policy
            .step("b", Ok(BackendReply::status(404, "no such model")))
            .is_continue());

        match policy.exhausted() {
            CompletionError::AllModelsFailed { attempts, last } => {
                assert_eq!(attempts, 2);
                assert_eq!(last.model, "b");
                assert_eq!(last.status, 404);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_exhausted_without_attempts() {
        assert!(matches!(
            FallbackPolicy::new().exhausted(),
            CompletionError::NoCandidates
        ));
    }
}
