//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use atom_protocol::{ChannelId, ConfigValue, Connection, Info, Status, Token};
use helium_client::{Atom, ConfigHandler, Resolution, Transport};
use tracing_subscriber::EnvFilter;

/// Route library logs to the test output, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Scripted Atom
// ============================================================================

/// What the scripted Atom answers and what it saw.
pub struct Script {
    /// Operations in call order.
    pub calls: Vec<String>,
    /// Times the peer was dropped.
    pub releases: u32,

    pub needs_reset: bool,
    pub reset_status: Status,
    pub info: Result<Info, Status>,
    pub connect_status: Status,
    /// `connected()` answers OK from this check on (1-based); `None` never.
    pub connected_on_check: Option<u32>,
    pub connected_checks: u32,
    pub not_connected_status: Status,
    pub last_connection: Option<Connection>,
    pub sleep_result: Result<Connection, Status>,
    pub waits: u32,

    /// Answers for requests that return a token; empty means a fresh token.
    pub initiations: VecDeque<Result<Token, Status>>,
    pub next_token: u16,
    /// Answers for plain polls; empty means "not ready".
    pub polls: VecDeque<Resolution>,
    /// Answers for config get polls with the pairs reported alongside.
    pub config_polls: VecDeque<(Resolution, Vec<(String, ConfigValue)>)>,

    pub sent: Vec<(ChannelId, Vec<u8>)>,
    pub set_values: Vec<(ChannelId, String, ConfigValue)>,
}

impl Default for Script {
    fn default() -> Self {
        Script {
            calls: Vec::new(),
            releases: 0,
            needs_reset: false,
            reset_status: Status::Ok,
            info: Ok(Info::default()),
            connect_status: Status::Ok,
            connected_on_check: Some(1),
            connected_checks: 0,
            not_connected_status: Status::ErrNotConnected,
            last_connection: None,
            sleep_result: Ok(Connection::default()),
            waits: 0,
            initiations: VecDeque::new(),
            next_token: 1,
            polls: VecDeque::new(),
            config_polls: VecDeque::new(),
            sent: Vec::new(),
            set_values: Vec::new(),
        }
    }
}

impl Script {
    /// Number of calls to the named operation.
    pub fn count(&self, op: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == op).count()
    }

    fn initiate(&mut self) -> Result<Token, Status> {
        self.initiations.pop_front().unwrap_or_else(|| {
            let token = Token(self.next_token);
            self.next_token += 1;
            Ok(token)
        })
    }
}

/// An [`Atom`] that replays a [`Script`].
pub struct ScriptedAtom {
    script: Rc<RefCell<Script>>,
}

/// Build a scripted Atom and a handle to its script.
pub fn scripted() -> (ScriptedAtom, Rc<RefCell<Script>>) {
    let script = Rc::new(RefCell::new(Script::default()));
    (
        ScriptedAtom {
            script: Rc::clone(&script),
        },
        script,
    )
}

impl ScriptedAtom {
    fn record(&self, op: &str) -> std::cell::RefMut<'_, Script> {
        let mut script = self.script.borrow_mut();
        script.calls.push(op.to_string());
        script
    }
}

impl Drop for ScriptedAtom {
    fn drop(&mut self) {
        self.script.borrow_mut().releases += 1;
    }
}

impl Atom for ScriptedAtom {
    fn needs_reset(&mut self) -> bool {
        self.record("needs_reset").needs_reset
    }

    fn reset(&mut self) -> Status {
        self.record("reset").reset_status
    }

    fn info(&mut self) -> Result<Info, Status> {
        self.record("info").info
    }

    fn connect(&mut self, connection: Option<&Connection>) -> Status {
        let mut script = self.record("connect");
        script.last_connection = connection.cloned();
        script.connect_status
    }

    fn connected(&mut self) -> Status {
        let mut script = self.record("connected");
        script.connected_checks += 1;
        match script.connected_on_check {
            Some(n) if script.connected_checks >= n => Status::Ok,
            _ => script.not_connected_status,
        }
    }

    fn sleep(&mut self) -> Result<Connection, Status> {
        self.record("sleep").sleep_result.clone()
    }

    fn wait(&mut self) {
        self.script.borrow_mut().waits += 1;
    }

    fn channel_create(&mut self, _name: &str) -> Result<Token, Status> {
        self.record("channel_create").initiate()
    }

    fn channel_send(&mut self, channel_id: ChannelId, data: &[u8]) -> Result<Token, Status> {
        let mut script = self.record("channel_send");
        script.sent.push((channel_id, data.to_vec()));
        script.initiate()
    }

    fn channel_poll_result(&mut self, _token: Token) -> Resolution {
        let mut script = self.record("channel_poll_result");
        script.polls.pop_front().unwrap_or_else(Resolution::pending)
    }

    fn config_get(&mut self, _channel_id: ChannelId, _key: &str) -> Result<Token, Status> {
        self.record("config_get").initiate()
    }

    fn config_get_poll_result(&mut self, _token: Token, handler: &mut ConfigHandler<'_>) -> Resolution {
        let next = self.record("config_get_poll_result").config_polls.pop_front();
        match next {
            Some((resolution, entries)) => {
                for (key, value) in entries {
                    handler(&key, value);
                }
                resolution
            }
            None => Resolution::pending(),
        }
    }

    fn config_set(&mut self, channel_id: ChannelId, key: &str, value: &ConfigValue) -> Result<Token, Status> {
        let mut script = self.record("config_set");
        script.set_values.push((channel_id, key.to_string(), value.clone()));
        script.initiate()
    }

    fn config_set_poll_result(&mut self, _token: Token) -> Resolution {
        let mut script = self.record("config_set_poll_result");
        script.polls.pop_front().unwrap_or_else(Resolution::pending)
    }

    fn poll_invalidate(&mut self, _channel_id: ChannelId) -> Result<Token, Status> {
        self.record("poll_invalidate").initiate()
    }

    fn poll_invalidate_poll_result(&mut self, _token: Token) -> Resolution {
        let mut script = self.record("poll_invalidate_poll_result");
        script.polls.pop_front().unwrap_or_else(Resolution::pending)
    }
}

// ============================================================================
// In-memory serial link
// ============================================================================

/// Answers one request payload with zero or more reply payloads.
pub type Responder = Box<dyn FnMut(&[u8]) -> Vec<Vec<u8>>>;

/// A [`Transport`] that plays the Atom's side of the framed link.
pub struct MemoryTransport {
    responder: Responder,
    tx: Vec<u8>,
    rx: VecDeque<u8>,
    /// Request payloads received, in order.
    pub requests: Vec<Vec<u8>>,
    /// Bytes written, raw.
    pub written: Vec<u8>,
    /// Waits requested, in microseconds.
    pub waits: Vec<u32>,
    /// Bytes queued ahead of every reply.
    pub noise: Vec<u8>,
    /// Fail every write.
    pub broken: bool,
}

impl MemoryTransport {
    pub fn new(responder: impl FnMut(&[u8]) -> Vec<Vec<u8>> + 'static) -> Self {
        MemoryTransport {
            responder: Box::new(responder),
            tx: Vec::new(),
            rx: VecDeque::new(),
            requests: Vec::new(),
            written: Vec::new(),
            waits: Vec::new(),
            noise: Vec::new(),
            broken: false,
        }
    }

    fn take_request(&mut self) -> Option<Vec<u8>> {
        if self.tx.len() < 3 || self.tx[0] != b'<' {
            return None;
        }
        let len = u16::from_le_bytes([self.tx[1], self.tx[2]]) as usize;
        if self.tx.len() < 3 + len {
            return None;
        }
        let payload = self.tx[3..3 + len].to_vec();
        self.tx.drain(..3 + len);
        Some(payload)
    }
}

/// Frame a reply payload as the Atom sends it.
pub fn atom_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![b'>'];
    frame.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    frame.extend_from_slice(payload);
    frame
}

impl Transport for MemoryTransport {
    fn readable(&mut self) -> bool {
        !self.rx.is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write_byte(&mut self, byte: u8) -> bool {
        if self.broken {
            return false;
        }
        self.written.push(byte);
        self.tx.push(byte);
        if let Some(request) = self.take_request() {
            let replies = (self.responder)(&request);
            self.requests.push(request);
            for reply in replies {
                self.rx.extend(self.noise.iter().copied());
                self.rx.extend(atom_frame(&reply));
            }
        }
        true
    }

    fn wait_us(&mut self, us: u32) {
        self.waits.push(us);
    }
}
