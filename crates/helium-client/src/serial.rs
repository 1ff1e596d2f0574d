//! The [`Atom`] operations bound to a framed serial link.

use atom_protocol::{
    ChannelId, ConfigValue, Connection, FrameCodec, Info, Reply, ReplyBody, Request, Status, Token,
    MAX_FRAMED_SIZE,
};
use tracing::{debug, trace, warn};

use crate::atom::{Atom, ConfigHandler, Resolution};
use crate::poll::POLL_WAIT_US;
use crate::transport::Transport;

/// Replies for other commands tolerated before giving up on an exchange.
pub const MAX_STALE_REPLIES: usize = 4;

/// Bytes read while waiting for a single frame before giving up.
const MAX_READ_BYTES: usize = 4 * (MAX_FRAMED_SIZE + 3);

/// An [`Atom`] reached through a [`Transport`].
///
/// Each operation writes one request frame and reads until the matching
/// reply frame arrives. The link is half-duplex, so exchanges never overlap.
#[derive(Debug)]
pub struct SerialAtom<T: Transport> {
    transport: T,
    codec: FrameCodec,
    poll_wait_us: u32,
}

impl<T: Transport> SerialAtom<T> {
    /// Wrap a transport, waiting [`POLL_WAIT_US`] after "not ready" replies.
    pub fn new(transport: T) -> Self {
        SerialAtom {
            transport,
            codec: FrameCodec::new(),
            poll_wait_us: POLL_WAIT_US,
        }
    }

    /// Set the wait after "not ready" replies.
    pub fn with_poll_wait(mut self, poll_wait_us: u32) -> Self {
        self.poll_wait_us = poll_wait_us;
        self
    }

    /// Get the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Unwrap the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Send a request and wait for its reply.
    fn exchange(&mut self, request: &Request) -> Result<Reply, Status> {
        let payload = request.encode().map_err(|e| {
            warn!(error = %e, command = request.code(), "request does not encode");
            Status::ErrCommunication
        })?;

        // Anything still buffered belongs to an earlier exchange
        self.codec.clear();

        trace!(command = request.code(), len = payload.len(), "sending request");
        for byte in FrameCodec::encode(&payload) {
            if !self.transport.write_byte(byte) {
                debug!(command = request.code(), "write failed");
                return Err(Status::ErrCommunication);
            }
        }

        for _ in 0..=MAX_STALE_REPLIES {
            let frame = self.read_frame()?;
            let reply = Reply::decode(&frame).map_err(|e| {
                warn!(error = %e, command = request.code(), "undecodable reply");
                Status::ErrCommunication
            })?;
            if reply.command == request.code() {
                trace!(command = reply.command, status = %reply.status, "received reply");
                return Ok(reply);
            }
            debug!(
                expected = request.code(),
                got = reply.command,
                "skipping reply for another command"
            );
        }
        warn!(command = request.code(), "no matching reply");
        Err(Status::ErrCommunication)
    }

    fn read_frame(&mut self) -> Result<Vec<u8>, Status> {
        let mut read = 0;
        loop {
            if let Some(frame) = self.codec.decode() {
                return Ok(frame);
            }
            if !self.transport.readable() {
                debug!("link went quiet waiting for reply");
                return Err(Status::ErrCommunication);
            }
            while let Some(byte) = self.transport.read_byte() {
                self.codec.push_byte(byte);
                read += 1;
                if read > MAX_READ_BYTES {
                    warn!(read, "no frame in received data");
                    return Err(Status::ErrCommunication);
                }
            }
        }
    }

    /// Exchange and extract the body of an OK reply.
    fn request_body(&mut self, request: &Request) -> Result<ReplyBody, Status> {
        let reply = self.exchange(request)?;
        if reply.status.is_ok() {
            Ok(reply.body)
        } else {
            Err(reply.status)
        }
    }

    fn request_token(&mut self, request: &Request) -> Result<Token, Status> {
        match self.request_body(request)? {
            ReplyBody::Token(token) => Ok(token),
            other => Err(unexpected(request, &other)),
        }
    }

    /// One poll exchange. `on_body` turns an OK body into a result.
    fn poll<F>(&mut self, request: &Request, on_body: F) -> Resolution
    where
        F: FnOnce(ReplyBody) -> Option<i8>,
    {
        let reply = match self.exchange(request) {
            Ok(reply) => reply,
            Err(status) => return Resolution::failed(status),
        };
        match reply.status {
            Status::OkNoData => {
                self.transport.wait_us(self.poll_wait_us);
                Resolution::pending()
            }
            Status::Ok => match on_body(reply.body) {
                Some(result) => Resolution::ok(result),
                None => {
                    warn!(command = request.code(), "poll reply without a result");
                    Resolution::failed(Status::ErrCommunication)
                }
            },
            other => Resolution::failed(other),
        }
    }
}

fn unexpected(request: &Request, body: &ReplyBody) -> Status {
    warn!(command = request.code(), ?body, "unexpected reply body");
    Status::ErrCommunication
}

fn result_of(body: ReplyBody) -> Option<i8> {
    match body {
        ReplyBody::Result(result) => Some(result),
        _ => None,
    }
}

impl<T: Transport> Atom for SerialAtom<T> {
    fn needs_reset(&mut self) -> bool {
        matches!(
            self.request_body(&Request::NeedsReset),
            Ok(ReplyBody::NeedsReset(true))
        )
    }

    fn reset(&mut self) -> Status {
        match self.exchange(&Request::Reset) {
            Ok(reply) => reply.status,
            Err(status) => status,
        }
    }

    fn info(&mut self) -> Result<Info, Status> {
        let request = Request::Info;
        match self.request_body(&request)? {
            ReplyBody::Info(info) => Ok(info),
            other => Err(unexpected(&request, &other)),
        }
    }

    fn connect(&mut self, connection: Option<&Connection>) -> Status {
        let request = Request::Connect {
            connection: connection.cloned(),
        };
        match self.exchange(&request) {
            Ok(reply) => reply.status,
            Err(status) => status,
        }
    }

    fn connected(&mut self) -> Status {
        match self.exchange(&Request::Connected) {
            Ok(reply) => reply.status,
            Err(status) => status,
        }
    }

    fn sleep(&mut self) -> Result<Connection, Status> {
        let request = Request::Sleep;
        match self.request_body(&request)? {
            ReplyBody::Connection(connection) => Ok(connection),
            other => Err(unexpected(&request, &other)),
        }
    }

    fn wait(&mut self) {
        self.transport.wait_us(self.poll_wait_us);
    }

    fn channel_create(&mut self, name: &str) -> Result<Token, Status> {
        self.request_token(&Request::ChannelCreate {
            name: name.to_string(),
        })
    }

    fn channel_send(&mut self, channel_id: ChannelId, data: &[u8]) -> Result<Token, Status> {
        self.request_token(&Request::ChannelSend {
            channel_id,
            data: data.to_vec(),
        })
    }

    fn channel_poll_result(&mut self, token: Token) -> Resolution {
        self.poll(&Request::ChannelPollResult { token }, result_of)
    }

    fn config_get(&mut self, channel_id: ChannelId, key: &str) -> Result<Token, Status> {
        self.request_token(&Request::ConfigGet {
            channel_id,
            key: key.to_string(),
        })
    }

    fn config_get_poll_result(&mut self, token: Token, handler: &mut ConfigHandler<'_>) -> Resolution {
        self.poll(&Request::ConfigGetPoll { token }, |body| match body {
            ReplyBody::ConfigEntries { result, entries } => {
                for (key, value) in entries {
                    handler(&key, value);
                }
                Some(result)
            }
            _ => None,
        })
    }

    fn config_set(&mut self, channel_id: ChannelId, key: &str, value: &ConfigValue) -> Result<Token, Status> {
        self.request_token(&Request::ConfigSet {
            channel_id,
            key: key.to_string(),
            value: value.clone(),
        })
    }

    fn config_set_poll_result(&mut self, token: Token) -> Resolution {
        self.poll(&Request::ConfigSetPoll { token }, result_of)
    }

    fn poll_invalidate(&mut self, channel_id: ChannelId) -> Result<Token, Status> {
        self.request_token(&Request::PollInvalidate { channel_id })
    }

    fn poll_invalidate_poll_result(&mut self, token: Token) -> Resolution {
        self.poll(&Request::PollInvalidatePoll { token }, result_of)
    }
}
