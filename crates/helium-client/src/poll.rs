//! Bounded polling of peer-issued tokens.
//!
//! The serial link has no completion signal, so every asynchronous operation
//! is resolved by asking the Atom about its token until it stops answering
//! "not ready" or the retry budget runs out. Waiting between attempts is done
//! by the resolver itself (see [`crate::Atom`]); nothing here sleeps.

use atom_protocol::{Status, Token};
use tracing::{debug, trace, warn};

use crate::atom::Resolution;
use crate::error::{failure, HeliumError, Result};

/// Time the Atom binding waits after a "not ready" reply.
pub const POLL_WAIT_US: u32 = 500_000;

/// Attempts that add up to about five seconds at [`POLL_WAIT_US`].
pub const POLL_RETRIES_5S: u32 = 5_000_000 / POLL_WAIT_US;

/// How long to keep polling for a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryBudget {
    /// Poll at most this many times.
    Attempts(u32),
    /// Do not poll; hand the token back to the caller.
    NoRetry,
}

impl Default for RetryBudget {
    fn default() -> Self {
        RetryBudget::Attempts(POLL_RETRIES_5S)
    }
}

impl From<u32> for RetryBudget {
    fn from(attempts: u32) -> Self {
        RetryBudget::Attempts(attempts)
    }
}

/// Either a final value or a token to poll later.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Completion<T> {
    /// The operation finished.
    Resolved(T),
    /// The operation is still in flight on the Atom.
    Pending(Token),
}

impl<T> Completion<T> {
    /// The value, if resolved.
    pub fn resolved(self) -> Option<T> {
        match self {
            Completion::Resolved(value) => Some(value),
            Completion::Pending(_) => None,
        }
    }

    /// The token, if pending.
    pub fn token(&self) -> Option<Token> {
        match self {
            Completion::Resolved(_) => None,
            Completion::Pending(token) => Some(*token),
        }
    }

    /// Whether the value is still outstanding.
    pub fn is_pending(&self) -> bool {
        matches!(self, Completion::Pending(_))
    }

    /// Transform a resolved value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Completion<U> {
        match self {
            Completion::Resolved(value) => Completion::Resolved(f(value)),
            Completion::Pending(token) => Completion::Pending(token),
        }
    }
}

/// Resolve a freshly issued request.
///
/// A failed initiation is returned as-is without polling. With
/// [`RetryBudget::NoRetry`] the token is handed back unresolved.
pub fn drive<F>(
    initiated: std::result::Result<Token, Status>,
    budget: RetryBudget,
    resolver: F,
) -> Result<Completion<i8>>
where
    F: FnMut(Token) -> Resolution,
{
    let token = initiated.map_err(failure)?;
    match budget {
        RetryBudget::NoRetry => {
            debug!(%token, "deferring resolution to caller");
            Ok(Completion::Pending(token))
        }
        RetryBudget::Attempts(attempts) => resolve(token, attempts, resolver).map(Completion::Resolved),
    }
}

/// Resolve a freshly issued request, always polling.
pub fn complete<F>(
    initiated: std::result::Result<Token, Status>,
    attempts: u32,
    resolver: F,
) -> Result<i8>
where
    F: FnMut(Token) -> Resolution,
{
    let token = initiated.map_err(failure)?;
    resolve(token, attempts, resolver)
}

/// Poll `token` up to `attempts` times.
///
/// Returns the non-negative result on success. A negative result is
/// [`HeliumError::Channel`]. Running out of attempts is [`HeliumError::NoData`].
pub fn resolve<F>(token: Token, attempts: u32, mut resolver: F) -> Result<i8>
where
    F: FnMut(Token) -> Resolution,
{
    for attempt in 1..=attempts {
        let Resolution { status, result } = resolver(token);
        trace!(%token, attempt, %status, result, "poll attempt");
        match status {
            Status::OkNoData => continue,
            Status::Ok if result < 0 => {
                debug!(%token, result, "channel rejected request");
                return Err(HeliumError::Channel(result));
            }
            Status::Ok => {
                debug!(%token, attempt, result, "resolved");
                return Ok(result);
            }
            other => {
                debug!(%token, attempt, status = %other, "poll failed");
                return Err(failure(other));
            }
        }
    }
    warn!(%token, attempts, "retry budget exhausted");
    Err(HeliumError::NoData)
}
