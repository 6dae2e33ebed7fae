//! Whole-sequence retry for remote deploy failures.

use tracing::warn;

use crate::error::DeployResult;

pub const MIN_ATTEMPTS: u32 = 1;
pub const MAX_ATTEMPTS: u32 = 10;

/// How many times the full remote call sequence may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: MIN_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Clamp a configured count into `[1, 10]`; out-of-range values are
    /// pulled to the nearest bound.
    pub fn from_configured(count: i64) -> Self {
        let attempts = count.clamp(i64::from(MIN_ATTEMPTS), i64::from(MAX_ATTEMPTS));
        Self {
            attempts: u32::try_from(attempts).unwrap_or(MIN_ATTEMPTS),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempts are used up. Returns the value and the attempt that
    /// produced it. Retries are immediate.
    pub fn run<T>(
        &self,
        mut operation: impl FnMut(u32) -> DeployResult<T>,
    ) -> DeployResult<(T, u32)> {
        let mut attempt = 1;
        loop {
            match operation(attempt) {
                Ok(value) => return Ok((value, attempt)),
                Err(err) if err.is_retryable() && attempt < self.attempts => {
                    warn!(
                        attempt,
                        max_attempts = self.attempts,
                        error = %err,
                        "Deployment attempt failed, retrying"
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
