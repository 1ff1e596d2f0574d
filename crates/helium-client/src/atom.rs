//! The operations the Atom exposes to the host.
//!
//! Each method is one request/reply exchange already reduced to a [`Status`].
//! Methods that start asynchronous work return a [`Token`]; the matching
//! `*_poll_result` method checks on it once and reports a [`Resolution`].
//! Retrying is the caller's job (see [`crate::poll`]).

use atom_protocol::{ChannelId, ConfigValue, Connection, Info, Status, Token};

/// Outcome of one poll attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// [`Status::OkNoData`] while the result is not ready; anything else is final.
    pub status: Status,
    /// Operation result. Negative values are channel errors. Only meaningful
    /// when `status` is [`Status::Ok`].
    pub result: i8,
}

impl Resolution {
    /// Not ready yet.
    pub fn pending() -> Self {
        Resolution {
            status: Status::OkNoData,
            result: 0,
        }
    }

    /// Finished with the given result.
    pub fn ok(result: i8) -> Self {
        Resolution {
            status: Status::Ok,
            result,
        }
    }

    /// Finished with a failure status.
    pub fn failed(status: Status) -> Self {
        Resolution { status, result: 0 }
    }

    /// Whether the poll should be retried.
    pub fn is_pending(&self) -> bool {
        self.status == Status::OkNoData
    }
}

/// Receives each key/value pair reported while polling a config get.
pub type ConfigHandler<'a> = dyn FnMut(&str, ConfigValue) + 'a;

/// A peer the session can drive.
///
/// Implementations must not block indefinitely: a link that goes quiet
/// is reported as [`Status::ErrCommunication`].
pub trait Atom {
    /// Whether a firmware update is waiting for a reset.
    fn needs_reset(&mut self) -> bool;

    /// Reset the Atom.
    fn reset(&mut self) -> Status;

    /// Query device information.
    fn info(&mut self) -> Result<Info, Status>;

    /// Start joining the network, optionally from saved state.
    fn connect(&mut self, connection: Option<&Connection>) -> Status;

    /// [`Status::Ok`] once joined.
    fn connected(&mut self) -> Status;

    /// Disconnect and power down, returning state for a quick rejoin.
    fn sleep(&mut self) -> Result<Connection, Status>;

    /// Wait one poll interval.
    fn wait(&mut self);

    /// Start creating a channel.
    fn channel_create(&mut self, name: &str) -> Result<Token, Status>;

    /// Start sending data on a channel.
    fn channel_send(&mut self, channel_id: ChannelId, data: &[u8]) -> Result<Token, Status>;

    /// Check on a create or send. The result is the channel id for a create.
    fn channel_poll_result(&mut self, token: Token) -> Resolution;

    /// Start fetching a config value.
    fn config_get(&mut self, channel_id: ChannelId, key: &str) -> Result<Token, Status>;

    /// Check on a config get. Reported pairs are handed to `handler` in order
    /// before this returns; the handler is not retained.
    fn config_get_poll_result(&mut self, token: Token, handler: &mut ConfigHandler<'_>) -> Resolution;

    /// Start setting a config value.
    fn config_set(&mut self, channel_id: ChannelId, key: &str, value: &ConfigValue) -> Result<Token, Status>;

    /// Check on a config set.
    fn config_set_poll_result(&mut self, token: Token) -> Resolution;

    /// Start checking whether tracked config changed upstream.
    fn poll_invalidate(&mut self, channel_id: ChannelId) -> Result<Token, Status>;

    /// Check on an invalidation request. A positive result means stale.
    fn poll_invalidate_poll_result(&mut self, token: Token) -> Resolution;
}
