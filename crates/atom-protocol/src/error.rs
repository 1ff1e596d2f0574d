//! Protocol error and status types.

use thiserror::Error;

/// Errors that can occur when encoding or decoding Atom messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame is too short to be valid.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Unknown reply command code.
    #[error("unknown reply code: 0x{0:02X}")]
    UnknownReply(u8),

    /// Unknown config value type tag.
    #[error("unknown config type: {0}")]
    UnknownConfigType(u8),

    /// A value does not fit its wire field.
    #[error("{field} too long: maximum {max} bytes, got {actual}")]
    ValueTooLong {
        /// Which field overflowed.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
        /// Actual length.
        actual: usize,
    },

    /// A value has no representation as a config value.
    #[error("unsupported config value: {0}")]
    UnsupportedValue(String),

    /// Invalid data in frame.
    #[error("invalid frame data: {0}")]
    InvalidData(String),

    /// UTF-8 decoding error.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,
}

/// Status codes returned by every Atom operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Success.
    Ok,
    /// Success, nothing to report yet.
    OkNoData,
    /// Serial link failure.
    ErrCommunication,
    /// Not joined to the network.
    ErrNotConnected,
    /// Request was dropped.
    ErrDropped,
    /// Atom must stay awake.
    ErrKeepAwake,
    /// A code this client does not know.
    Unknown(u8),
}

impl Status {
    /// Whether this is [`Status::Ok`].
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::OkNoData => write!(f, "OK_NO_DATA"),
            Status::ErrCommunication => write!(f, "ERR_COMMUNICATION"),
            Status::ErrNotConnected => write!(f, "ERR_NOT_CONNECTED"),
            Status::ErrDropped => write!(f, "ERR_DROPPED"),
            Status::ErrKeepAwake => write!(f, "ERR_KEEP_AWAKE"),
            Status::Unknown(code) => write!(f, "unknown status ({})", code),
        }
    }
}

impl From<u8> for Status {
    fn from(code: u8) -> Self {
        use crate::constants::*;
        match code {
            STATUS_OK => Status::Ok,
            STATUS_OK_NO_DATA => Status::OkNoData,
            STATUS_ERR_COMMUNICATION => Status::ErrCommunication,
            STATUS_ERR_NOT_CONNECTED => Status::ErrNotConnected,
            STATUS_ERR_DROPPED => Status::ErrDropped,
            STATUS_ERR_KEEP_AWAKE => Status::ErrKeepAwake,
            _ => Status::Unknown(code),
        }
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        use crate::constants::*;
        match status {
            Status::Ok => STATUS_OK,
            Status::OkNoData => STATUS_OK_NO_DATA,
            Status::ErrCommunication => STATUS_ERR_COMMUNICATION,
            Status::ErrNotConnected => STATUS_ERR_NOT_CONNECTED,
            Status::ErrDropped => STATUS_ERR_DROPPED,
            Status::ErrKeepAwake => STATUS_ERR_KEEP_AWAKE,
            Status::Unknown(code) => code,
        }
    }
}
