//! Requests that can be sent to the Atom.

use bytes::BufMut;

use crate::config::ConfigValue;
use crate::constants::*;
use crate::error::ProtocolError;
use crate::types::*;

/// Requests that can be sent to the Atom.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Ask whether a reset is needed to finish a firmware update.
    NeedsReset,

    /// Reset the Atom.
    Reset,

    /// Query hardware and firmware information.
    Info,

    /// Start joining the network.
    Connect {
        /// Saved state from a previous sleep, for a quick rejoin.
        connection: Option<Connection>,
    },

    /// Query the join state.
    Connected,

    /// Disconnect and power down.
    Sleep,

    /// Create a channel.
    ChannelCreate {
        /// Channel name as configured on the dashboard.
        name: String,
    },

    /// Send data on a channel.
    ChannelSend {
        /// Target channel.
        channel_id: ChannelId,
        /// Payload bytes.
        data: Vec<u8>,
    },

    /// Poll the result of a create or send.
    ChannelPollResult {
        /// Token from the create or send.
        token: Token,
    },

    /// Request a configuration value.
    ConfigGet {
        /// Channel the request goes through.
        channel_id: ChannelId,
        /// Full key including its scope prefix.
        key: String,
    },

    /// Poll the result of a config get.
    ConfigGetPoll {
        /// Token from the get.
        token: Token,
    },

    /// Set a configuration value.
    ConfigSet {
        /// Channel the request goes through.
        channel_id: ChannelId,
        /// Full key including its scope prefix.
        key: String,
        /// New value.
        value: ConfigValue,
    },

    /// Poll the result of a config set.
    ConfigSetPoll {
        /// Token from the set.
        token: Token,
    },

    /// Ask whether tracked configuration is stale.
    PollInvalidate {
        /// Channel the request goes through.
        channel_id: ChannelId,
    },

    /// Poll the result of an invalidation check.
    PollInvalidatePoll {
        /// Token from the invalidation check.
        token: Token,
    },
}

impl Request {
    /// The command code byte for this request.
    pub fn code(&self) -> u8 {
        match self {
            Request::NeedsReset => CMD_NEEDS_RESET,
            Request::Reset => CMD_RESET,
            Request::Info => CMD_INFO,
            Request::Connect { .. } => CMD_CONNECT,
            Request::Connected => CMD_CONNECTED,
            Request::Sleep => CMD_SLEEP,
            Request::ChannelCreate { .. } => CMD_CHANNEL_CREATE,
            Request::ChannelSend { .. } => CMD_CHANNEL_SEND,
            Request::ChannelPollResult { .. } => CMD_CHANNEL_POLL_RESULT,
            Request::ConfigGet { .. } => CMD_CONFIG_GET,
            Request::ConfigGetPoll { .. } => CMD_CONFIG_GET_POLL,
            Request::ConfigSet { .. } => CMD_CONFIG_SET,
            Request::ConfigSetPoll { .. } => CMD_CONFIG_SET_POLL,
            Request::PollInvalidate { .. } => CMD_POLL_INVALIDATE,
            Request::PollInvalidatePoll { .. } => CMD_POLL_INVALIDATE_POLL,
        }
    }

    /// Encode the request payload (without framing).
    ///
    /// Every variable-length field is checked against its limit, so a request
    /// that encodes successfully always fits in a frame.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut buf = Vec::with_capacity(16);
        buf.push(self.code());

        match self {
            Request::NeedsReset
            | Request::Reset
            | Request::Info
            | Request::Connected
            | Request::Sleep => {}

            Request::Connect { connection } => {
                let bytes = connection.as_ref().map_or(&[][..], Connection::as_bytes);
                put_short_bytes(&mut buf, "connection", bytes, MAX_CONNECTION_SIZE)?;
            }

            Request::ChannelCreate { name } => {
                put_short_bytes(&mut buf, "channel name", name.as_bytes(), MAX_CHANNEL_NAME_LEN)?;
            }

            Request::ChannelSend { channel_id, data } => {
                check_len("payload", data.len(), MAX_PAYLOAD_SIZE)?;
                buf.push(*channel_id);
                buf.extend_from_slice(data);
            }

            Request::ConfigGet { channel_id, key } => {
                buf.push(*channel_id);
                put_short_bytes(&mut buf, "config key", key.as_bytes(), MAX_CONFIG_KEY_LEN)?;
            }

            Request::ConfigSet {
                channel_id,
                key,
                value,
            } => {
                let (ty, value_buf) = value.encode()?;
                buf.push(*channel_id);
                put_short_bytes(&mut buf, "config key", key.as_bytes(), MAX_CONFIG_KEY_LEN)?;
                buf.push(ty.into());
                buf.extend_from_slice(value_buf.as_bytes());
            }

            Request::PollInvalidate { channel_id } => {
                buf.push(*channel_id);
            }

            Request::ChannelPollResult { token }
            | Request::ConfigGetPoll { token }
            | Request::ConfigSetPoll { token }
            | Request::PollInvalidatePoll { token } => {
                buf.put_u16_le(token.value());
            }
        }

        Ok(buf)
    }
}

fn check_len(field: &'static str, actual: usize, max: usize) -> Result<(), ProtocolError> {
    if actual > max {
        return Err(ProtocolError::ValueTooLong { field, max, actual });
    }
    Ok(())
}

/// Write a one-byte length followed by the bytes.
fn put_short_bytes(
    buf: &mut Vec<u8>,
    field: &'static str,
    bytes: &[u8],
    max: usize,
) -> Result<(), ProtocolError> {
    check_len(field, bytes.len(), max.min(u8::MAX as usize))?;
    buf.push(bytes.len() as u8);
    buf.extend_from_slice(bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_simple_commands() {
        assert_eq!(Request::Info.encode().unwrap(), vec![CMD_INFO]);
        assert_eq!(Request::Sleep.encode().unwrap(), vec![CMD_SLEEP]);
        assert_eq!(
            Request::Connect { connection: None }.encode().unwrap(),
            vec![CMD_CONNECT, 0]
        );
    }

    #[test]
    fn test_encode_channel_create() {
        let req = Request::ChannelCreate {
            name: "Helium MQTT".to_string(),
        };
        let encoded = req.encode().unwrap();
        assert_eq!(encoded[0], CMD_CHANNEL_CREATE);
        assert_eq!(encoded[1], 11);
        assert_eq!(&encoded[2..], b"Helium MQTT");
    }

    #[test]
    fn test_encode_send() {
        let req = Request::ChannelSend {
            channel_id: 4,
            data: b"hello".to_vec(),
        };
        assert_eq!(req.encode().unwrap(), b"\x08\x04hello".to_vec());
    }

    #[test]
    fn test_encode_poll_token() {
        let req = Request::ChannelPollResult {
            token: Token(0x1234),
        };
        assert_eq!(req.encode().unwrap(), vec![CMD_CHANNEL_POLL_RESULT, 0x34, 0x12]);
    }

    #[test]
    fn test_encode_config_set() {
        let req = Request::ConfigSet {
            channel_id: 1,
            key: "channel.rate".to_string(),
            value: ConfigValue::I32(60),
        };
        let encoded = req.encode().unwrap();
        assert_eq!(encoded[0], CMD_CONFIG_SET);
        assert_eq!(encoded[1], 1);
        assert_eq!(encoded[2] as usize, "channel.rate".len());
        let tag_at = 3 + "channel.rate".len();
        assert_eq!(encoded[tag_at], CONFIG_TYPE_I32);
        assert_eq!(encoded.len(), tag_at + 1 + CONFIG_VALUE_SIZE);
        assert_eq!(&encoded[tag_at + 1..tag_at + 5], &60i32.to_le_bytes());
    }

    #[test]
    fn test_rejects_oversize_fields() {
        let long_name = Request::ChannelCreate {
            name: "n".repeat(MAX_CHANNEL_NAME_LEN + 1),
        };
        assert!(matches!(
            long_name.encode(),
            Err(ProtocolError::ValueTooLong { field: "channel name", .. })
        ));

        let big_payload = Request::ChannelSend {
            channel_id: 0,
            data: vec![0; MAX_PAYLOAD_SIZE + 1],
        };
        assert!(matches!(
            big_payload.encode(),
            Err(ProtocolError::ValueTooLong { field: "payload", .. })
        ));

        let long_value = Request::ConfigSet {
            channel_id: 0,
            key: "config.k".into(),
            value: ConfigValue::Str("v".repeat(MAX_CONFIG_STR_LEN + 1)),
        };
        assert!(matches!(
            long_value.encode(),
            Err(ProtocolError::ValueTooLong { field: "config string", .. })
        ));
    }
}
