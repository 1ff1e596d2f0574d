//! Protocol constants
//!
//! These constants define the command codes, status codes, and size limits
//! used in the Atom serial API.

// ============================================================================
// Command Codes (host → Atom)
// ============================================================================

/// Ask whether a firmware update is waiting for a reset.
pub const CMD_NEEDS_RESET: u8 = 1;
/// Reset the Atom.
pub const CMD_RESET: u8 = 2;
/// Query hardware and firmware information.
pub const CMD_INFO: u8 = 3;
/// Start joining the network (optionally from a saved connection).
pub const CMD_CONNECT: u8 = 4;
/// Query the network join state.
pub const CMD_CONNECTED: u8 = 5;
/// Disconnect and power down, returning the connection state.
pub const CMD_SLEEP: u8 = 6;
/// Create a channel by name.
pub const CMD_CHANNEL_CREATE: u8 = 7;
/// Send data on a channel.
pub const CMD_CHANNEL_SEND: u8 = 8;
/// Poll the result of a channel create or send.
pub const CMD_CHANNEL_POLL_RESULT: u8 = 9;
/// Request a configuration value.
pub const CMD_CONFIG_GET: u8 = 10;
/// Poll the result of a configuration get.
pub const CMD_CONFIG_GET_POLL: u8 = 11;
/// Set a configuration value.
pub const CMD_CONFIG_SET: u8 = 12;
/// Poll the result of a configuration set.
pub const CMD_CONFIG_SET_POLL: u8 = 13;
/// Ask whether tracked configuration changed upstream.
pub const CMD_POLL_INVALIDATE: u8 = 14;
/// Poll the result of an invalidation check.
pub const CMD_POLL_INVALIDATE_POLL: u8 = 15;

// ============================================================================
// Status Codes (Atom → host)
// ============================================================================

/// Operation succeeded.
pub const STATUS_OK: u8 = 0;
/// Operation succeeded but there is nothing to report (yet).
pub const STATUS_OK_NO_DATA: u8 = 1;
/// The serial link failed.
pub const STATUS_ERR_COMMUNICATION: u8 = 2;
/// The Atom is not connected to the network.
pub const STATUS_ERR_NOT_CONNECTED: u8 = 3;
/// The request was dropped before it could be delivered.
pub const STATUS_ERR_DROPPED: u8 = 4;
/// The Atom has pending work and refuses to sleep.
pub const STATUS_ERR_KEEP_AWAKE: u8 = 5;

// ============================================================================
// Config Value Types
// ============================================================================

/// No value.
pub const CONFIG_TYPE_NULL: u8 = 0;
/// 32-bit signed integer.
pub const CONFIG_TYPE_I32: u8 = 1;
/// 32-bit float.
pub const CONFIG_TYPE_F32: u8 = 2;
/// Boolean.
pub const CONFIG_TYPE_BOOL: u8 = 3;
/// NUL-terminated string.
pub const CONFIG_TYPE_STR: u8 = 4;

// ============================================================================
// Size Limits
// ============================================================================

/// Size of the fixed config value buffer.
pub const CONFIG_VALUE_SIZE: usize = 100;
/// Longest string that fits the config value buffer (one byte is the terminator).
pub const MAX_CONFIG_STR_LEN: usize = CONFIG_VALUE_SIZE - 1;
/// Longest config key (length is sent as one byte).
pub const MAX_CONFIG_KEY_LEN: usize = 255;
/// Longest channel name (length is sent as one byte).
pub const MAX_CHANNEL_NAME_LEN: usize = 255;
/// Largest saved connection blob.
pub const MAX_CONNECTION_SIZE: usize = 64;
/// Largest payload a single channel send can carry.
pub const MAX_PAYLOAD_SIZE: usize = 255;
/// Encoded size of an info reply body.
pub const INFO_SIZE: usize = 21;

// ============================================================================
// Config Key Conventions
// ============================================================================

/// Prefix for device-global configuration keys.
pub const GLOBAL_CONFIG_PREFIX: &str = "config.";
/// Prefix for channel-scoped configuration keys.
pub const CHANNEL_CONFIG_PREFIX: &str = "channel.";
