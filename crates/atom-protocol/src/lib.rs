//! Helium Atom Serial API
//!
//! This crate provides the wire vocabulary for talking to a Helium Atom radio
//! module over its serial link. It does no I/O: it only knows how requests,
//! replies and configuration values look as bytes.
//!
//! # Protocol Overview
//!
//! The host drives every exchange. Each request is one frame; the Atom answers
//! with exactly one reply frame carrying the command code and a [`Status`].
//! Operations that cannot finish immediately reply with a [`Token`], which the
//! host later polls with the matching `*_POLL` command until the Atom stops
//! answering [`Status::OkNoData`].
//!
//! Configuration values travel as a [`ConfigType`] tag followed by a
//! fixed-width [`ConfigBuffer`].
//!
//! # Example
//!
//! ```rust
//! use atom_protocol::{ConfigValue, FrameCodec, Request};
//!
//! let request = Request::ConfigSet {
//!     channel_id: 1,
//!     key: "channel.interval".to_string(),
//!     value: ConfigValue::I32(60),
//! };
//! let frame = FrameCodec::encode(&request.encode()?);
//! assert_eq!(frame[0], b'<');
//! # Ok::<(), atom_protocol::ProtocolError>(())
//! ```

mod commands;
mod config;
mod constants;
mod error;
mod frame;
mod responses;
mod types;

pub use commands::*;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use responses::*;
pub use types::*;
