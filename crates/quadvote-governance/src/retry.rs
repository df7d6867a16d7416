//! Bounded retry for optimistic commits.

use crate::error::GovernanceError;
use quadvote_storage::StorageError;

/// Run `attempt` until it succeeds, fails with something other than a
/// version conflict, or `max_attempts` conflicts have been seen.
///
/// Each call of `attempt` must re-read whatever it commits against.
pub(crate) fn retry_on_conflict<T>(
    operation: &'static str,
    max_attempts: u32,
    mut attempt: impl FnMut() -> Result<T, GovernanceError>,
) -> Result<T, GovernanceError> {
    for n in 1..=max_attempts {
        match attempt() {
            Err(GovernanceError::Storage(StorageError::Conflict {
                address,
                expected,
                actual,
            })) => {
                tracing::debug!(
                    operation,
                    attempt = n,
                    %address,
                    expected,
                    actual,
                    "Version conflict, retrying"
                );
            }
            other => return other,
        }
    }

    tracing::warn!(operation, attempts = max_attempts, "Retries exhausted");
    Err(GovernanceError::Conflict {
        attempts: max_attempts,
    })
}
