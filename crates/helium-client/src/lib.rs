//! Helium Atom Client
//!
//! A blocking client for the Helium Atom radio module. The host talks to the
//! Atom over a half-duplex serial link; joining the network, creating
//! channels, sending data and reading or writing upstream configuration are
//! all request/response exchanges.
//!
//! # Overview
//!
//! - [`Helium`] is the session. It owns the link and issues every request.
//! - [`Channel`] is a named destination created through a session.
//! - [`Config`] reads and writes configuration through a channel.
//!
//! Work the Atom cannot finish immediately is identified by a
//! [`Token`](atom_protocol::Token). The client polls it up to a
//! [`RetryBudget`]; [`RetryBudget::NoRetry`] hands the token back as
//! [`Completion::Pending`] so the caller can poll later.
//!
//! # Example
//!
//! ```rust,no_run
//! use helium_client::{Channel, ConfigValue, Helium, RetryBudget, POLL_RETRIES_5S};
//!
//! let helium = Helium::open("/dev/serial0")?;
//! helium.connect(POLL_RETRIES_5S)?;
//!
//! if let Some(channel) = Channel::create(&helium, "Helium MQTT", RetryBudget::default())?.resolved() {
//!     if channel.send(b"hello", RetryBudget::default())?.is_pending() {
//!         println!("send still in flight");
//!     }
//!     let interval = channel
//!         .config()
//!         .get("channel.interval", ConfigValue::I32(60), POLL_RETRIES_5S)?;
//!     println!("interval: {}", interval);
//! }
//! # Ok::<(), helium_client::HeliumError>(())
//! ```

mod atom;
mod channel;
mod config;
mod error;
pub mod poll;
mod serial;
mod session;
mod settings;
mod transport;

pub use atom::*;
pub use channel::*;
pub use config::*;
pub use error::*;
pub use poll::{Completion, RetryBudget, POLL_RETRIES_5S, POLL_WAIT_US};
pub use serial::*;
pub use session::*;
pub use settings::*;
pub use transport::*;

pub use atom_protocol::{
    ChannelId, ConfigType, ConfigValue, Connection, FirmwareVersion, Info, Status, Token,
    CHANNEL_CONFIG_PREFIX, GLOBAL_CONFIG_PREFIX, MAX_CONFIG_STR_LEN,
};
