//! Replies from the Atom.
//!
//! Every reply payload starts with the command code it answers and a status
//! byte. Only replies with [`Status::Ok`] carry a body.

use bytes::{Buf, BufMut};

use crate::config::{ConfigBuffer, ConfigType, ConfigValue};
use crate::constants::*;
use crate::error::*;
use crate::types::*;

/// A decoded reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Command code this reply answers.
    pub command: u8,
    /// Outcome reported by the Atom.
    pub status: Status,
    /// Command-specific body (empty unless the status is OK).
    pub body: ReplyBody,
}

/// Command-specific reply contents.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    /// No body.
    Empty,
    /// Whether a reset is needed.
    NeedsReset(bool),
    /// Device information.
    Info(Info),
    /// Connection state saved by a sleep.
    Connection(Connection),
    /// Token for a pending result.
    Token(Token),
    /// Result of a polled operation. Negative values are channel errors.
    Result(i8),
    /// Result of a config get poll together with the reported values.
    ConfigEntries {
        /// Channel result.
        result: i8,
        /// Key/value pairs in the order the Atom reported them.
        entries: Vec<(String, ConfigValue)>,
    },
}

impl Reply {
    /// A reply with no body.
    pub fn status_only(command: u8, status: Status) -> Self {
        Reply {
            command,
            status,
            body: ReplyBody::Empty,
        }
    }

    /// An OK reply with the given body.
    pub fn ok(command: u8, body: ReplyBody) -> Self {
        Reply {
            command,
            status: Status::Ok,
            body,
        }
    }

    /// Decode a reply from a frame's payload.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < 2 {
            return Err(ProtocolError::FrameTooShort {
                expected: 2,
                actual: data.len(),
            });
        }

        let command = data[0];
        let status = Status::from(data[1]);
        let mut body = &data[2..];

        if !status.is_ok() {
            return Ok(Reply::status_only(command, status));
        }

        let body = match command {
            CMD_RESET | CMD_CONNECT | CMD_CONNECTED => ReplyBody::Empty,
            CMD_NEEDS_RESET => {
                need(body, 1)?;
                ReplyBody::NeedsReset(body.get_u8() != 0)
            }
            CMD_INFO => ReplyBody::Info(Info::decode(body)?),
            CMD_SLEEP => ReplyBody::Connection(Connection::from_bytes(get_short_bytes(&mut body)?)?),
            CMD_CHANNEL_CREATE | CMD_CHANNEL_SEND | CMD_CONFIG_GET | CMD_CONFIG_SET
            | CMD_POLL_INVALIDATE => {
                need(body, 2)?;
                ReplyBody::Token(Token(body.get_u16_le()))
            }
            CMD_CHANNEL_POLL_RESULT | CMD_CONFIG_SET_POLL | CMD_POLL_INVALIDATE_POLL => {
                need(body, 1)?;
                ReplyBody::Result(body.get_i8())
            }
            CMD_CONFIG_GET_POLL => decode_config_entries(body)?,
            _ => return Err(ProtocolError::UnknownReply(command)),
        };

        Ok(Reply {
            command,
            status,
            body,
        })
    }

    /// Encode the reply payload (without framing), as the Atom would.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut buf = vec![self.command, u8::from(self.status)];
        match &self.body {
            ReplyBody::Empty => {}
            ReplyBody::NeedsReset(v) => buf.push(u8::from(*v)),
            ReplyBody::Info(info) => buf.extend_from_slice(&info.encode()),
            ReplyBody::Connection(conn) => {
                buf.push(conn.as_bytes().len() as u8);
                buf.extend_from_slice(conn.as_bytes());
            }
            ReplyBody::Token(token) => buf.put_u16_le(token.value()),
            ReplyBody::Result(result) => buf.put_i8(*result),
            ReplyBody::ConfigEntries { result, entries } => {
                buf.put_i8(*result);
                if entries.len() > u8::MAX as usize {
                    return Err(ProtocolError::ValueTooLong {
                        field: "config entries",
                        max: u8::MAX as usize,
                        actual: entries.len(),
                    });
                }
                buf.push(entries.len() as u8);
                for (key, value) in entries {
                    if key.len() > MAX_CONFIG_KEY_LEN {
                        return Err(ProtocolError::ValueTooLong {
                            field: "config key",
                            max: MAX_CONFIG_KEY_LEN,
                            actual: key.len(),
                        });
                    }
                    let (ty, value_buf) = value.encode()?;
                    buf.push(key.len() as u8);
                    buf.extend_from_slice(key.as_bytes());
                    buf.push(ty.into());
                    buf.extend_from_slice(value_buf.as_bytes());
                }
            }
        }
        Ok(buf)
    }
}

fn need(body: &[u8], n: usize) -> Result<(), ProtocolError> {
    if body.remaining() < n {
        return Err(ProtocolError::FrameTooShort {
            expected: n,
            actual: body.remaining(),
        });
    }
    Ok(())
}

fn get_short_bytes<'a>(body: &mut &'a [u8]) -> Result<&'a [u8], ProtocolError> {
    need(body, 1)?;
    let len = body.get_u8() as usize;
    need(body, len)?;
    let slice: &'a [u8] = *body;
    let (bytes, rest) = slice.split_at(len);
    *body = rest;
    Ok(bytes)
}

fn decode_config_entries(mut body: &[u8]) -> Result<ReplyBody, ProtocolError> {
    need(body, 2)?;
    let result = body.get_i8();
    let count = body.get_u8() as usize;

    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let key = std::str::from_utf8(get_short_bytes(&mut body)?)
            .map_err(|_| ProtocolError::InvalidUtf8)?
            .to_string();
        need(body, 1 + CONFIG_VALUE_SIZE)?;
        let ty = ConfigType::try_from(body.get_u8())?;
        let value_buf = ConfigBuffer::from_slice(&body[..CONFIG_VALUE_SIZE])?;
        body.advance(CONFIG_VALUE_SIZE);
        entries.push((key, ConfigValue::decode(ty, &value_buf)?));
    }

    Ok(ReplyBody::ConfigEntries { result, entries })
}
