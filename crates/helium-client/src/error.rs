//! Error types for the Helium client.

use atom_protocol::{ProtocolError, Status};
use thiserror::Error;

/// Errors returned by every client operation.
///
/// The status-derived variants mirror the Atom's status codes one to one;
/// match on the variant to handle a specific outcome or treat the whole enum
/// as a single failure kind.
#[derive(Debug, Error)]
pub enum HeliumError {
    /// The Atom had nothing to report.
    #[error("no data")]
    NoData,

    /// The serial link failed, or the device could not be opened.
    #[error("communication error: {0}")]
    Communication(String),

    /// The Atom is not connected to the network.
    #[error("not connected")]
    NotConnected,

    /// The request was dropped before delivery.
    #[error("dropped")]
    Dropped,

    /// The Atom has undelivered data or a firmware update in progress.
    #[error("keep awake")]
    KeepAwake,

    /// The channel rejected the request with a negative result.
    #[error("channel error: {0}")]
    Channel(i8),

    /// A status code this client does not know.
    #[error("unknown status: {0}")]
    Unknown(u8),

    /// A config value could not be encoded.
    #[error("invalid config value: {0}")]
    InvalidValue(#[from] ProtocolError),

    /// An argument does not fit the wire format.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The session was closed.
    #[error("session is closed")]
    Closed,

    /// A session configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, HeliumError>;

impl HeliumError {
    /// Map a status to its error, or `None` for [`Status::Ok`].
    pub fn from_status(status: Status) -> Option<Self> {
        match status {
            Status::Ok => None,
            Status::OkNoData => Some(HeliumError::NoData),
            Status::ErrCommunication => Some(HeliumError::Communication(status.to_string())),
            Status::ErrNotConnected => Some(HeliumError::NotConnected),
            Status::ErrDropped => Some(HeliumError::Dropped),
            Status::ErrKeepAwake => Some(HeliumError::KeepAwake),
            Status::Unknown(code) => Some(HeliumError::Unknown(code)),
        }
    }

    /// The status this error was mapped from, if any.
    pub fn status(&self) -> Option<Status> {
        match self {
            HeliumError::NoData => Some(Status::OkNoData),
            HeliumError::Communication(_) => Some(Status::ErrCommunication),
            HeliumError::NotConnected => Some(Status::ErrNotConnected),
            HeliumError::Dropped => Some(Status::ErrDropped),
            HeliumError::KeepAwake => Some(Status::ErrKeepAwake),
            HeliumError::Unknown(code) => Some(Status::Unknown(*code)),
            _ => None,
        }
    }
}

/// `Ok(())` for [`Status::Ok`], the mapped error otherwise.
pub fn status_result(status: Status) -> Result<()> {
    match HeliumError::from_status(status) {
        None => Ok(()),
        Some(err) => Err(err),
    }
}

/// Map a status the Atom reported as a failure.
pub(crate) fn failure(status: Status) -> HeliumError {
    HeliumError::from_status(status)
        .unwrap_or_else(|| HeliumError::Communication("OK reported as a failure".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table() {
        assert!(HeliumError::from_status(Status::Ok).is_none());
        assert!(matches!(
            HeliumError::from_status(Status::OkNoData),
            Some(HeliumError::NoData)
        ));
        assert!(matches!(
            HeliumError::from_status(Status::ErrCommunication),
            Some(HeliumError::Communication(_))
        ));
        assert!(matches!(
            HeliumError::from_status(Status::ErrNotConnected),
            Some(HeliumError::NotConnected)
        ));
        assert!(matches!(
            HeliumError::from_status(Status::ErrDropped),
            Some(HeliumError::Dropped)
        ));
        assert!(matches!(
            HeliumError::from_status(Status::ErrKeepAwake),
            Some(HeliumError::KeepAwake)
        ));
        assert!(matches!(
            HeliumError::from_status(Status::Unknown(77)),
            Some(HeliumError::Unknown(77))
        ));
    }

    #[test]
    fn test_status_round_trip() {
        for code in 1..=10u8 {
            let status = Status::from(code);
            let err = HeliumError::from_status(status).expect("non-OK status");
            assert_eq!(err.status(), Some(status));
        }
        assert_eq!(HeliumError::Channel(-1).status(), None);
    }

    #[test]
    fn test_status_result() {
        assert!(status_result(Status::Ok).is_ok());
        assert!(matches!(
            status_result(Status::ErrKeepAwake),
            Err(HeliumError::KeepAwake)
        ));
    }

    #[test]
    fn test_failure_never_succeeds() {
        assert!(matches!(failure(Status::Ok), HeliumError::Communication(_)));
        assert!(matches!(failure(Status::ErrDropped), HeliumError::Dropped));
    }

    #[test]
    fn test_display() {
        assert_eq!(HeliumError::Channel(-3).to_string(), "channel error: -3");
        assert_eq!(HeliumError::Unknown(9).to_string(), "unknown status: 9");
    }
}
