//! The session context every other operation goes through.

use std::cell::{RefCell, RefMut};
use std::time::Duration;

use atom_protocol::{Connection, Info, Status};
use tracing::{debug, info, warn};

use crate::atom::Atom;
use crate::error::{failure, status_result, HeliumError, Result};
use crate::serial::SerialAtom;
use crate::settings::SessionConfig;
use crate::transport::{Baud, SerialTransport};

/// A session with one Atom.
///
/// The session owns the peer (and through it the transport) exclusively.
/// Operations take `&self` so that several [`Channel`](crate::Channel)s can
/// borrow the same session, but they run strictly one after another; the
/// type is not `Sync`, so sharing it across threads needs an external lock.
///
/// The transport is released by [`Helium::close`] or when the session is
/// dropped, whichever comes first.
pub struct Helium<A: Atom> {
    atom: RefCell<Option<A>>,
}

impl Helium<SerialAtom<SerialTransport>> {
    /// Open a session on a serial device at the default baud rate.
    pub fn open(path: &str) -> Result<Self> {
        Self::open_with(&SessionConfig {
            port: path.to_string(),
            ..SessionConfig::default()
        })
    }

    /// Open a session with explicit settings.
    pub fn open_with(config: &SessionConfig) -> Result<Self> {
        let transport = SerialTransport::open(
            &config.port,
            config.baud,
            Duration::from_millis(config.read_timeout_ms),
        )
        .map_err(|e| HeliumError::Communication(e.to_string()))?;
        info!(port = %config.port, baud = config.baud.nominal(), "session opened");
        Ok(Helium::new(
            SerialAtom::new(transport).with_poll_wait(config.poll_wait_us),
        ))
    }

    /// Open a session at a specific baud rate.
    pub fn open_at(path: &str, baud: Baud) -> Result<Self> {
        Self::open_with(&SessionConfig {
            port: path.to_string(),
            baud,
            ..SessionConfig::default()
        })
    }
}

impl<A: Atom> Helium<A> {
    /// Start a session over an already reachable peer.
    pub fn new(atom: A) -> Self {
        Helium {
            atom: RefCell::new(Some(atom)),
        }
    }

    /// Run `f` against the peer, or fail with [`HeliumError::Closed`].
    pub(crate) fn with_atom<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut A) -> Result<R>,
    {
        let mut guard = self.atom.borrow_mut();
        let atom = guard.as_mut().ok_or(HeliumError::Closed)?;
        f(atom)
    }

    /// Borrow the peer for an operation with no error channel.
    fn open_atom(&self) -> RefMut<'_, A> {
        RefMut::map(self.atom.borrow_mut(), |atom| match atom {
            Some(atom) => atom,
            None => panic!("Helium session used after close()"),
        })
    }

    /// Whether a firmware update is waiting for a reset.
    ///
    /// # Panics
    ///
    /// Panics if the session has been closed.
    pub fn needs_reset(&self) -> bool {
        self.open_atom().needs_reset()
    }

    /// Reset the Atom.
    pub fn reset(&self) -> Result<()> {
        self.with_atom(|atom| {
            debug!("resetting atom");
            status_result(atom.reset())
        })
    }

    /// Query device information. Works without a network connection.
    pub fn info(&self) -> Result<Info> {
        self.with_atom(|atom| atom.info().map_err(failure))
    }

    /// Join the network, checking the join state up to `retries` times.
    ///
    /// Only "not connected" counts as still joining; any other failure status
    /// from a check ends the join at once.
    ///
    /// There is no deferred form: join progress has no token. Callers that
    /// must not block can pass a small `retries` and check
    /// [`Helium::connected`] themselves.
    pub fn connect(&self, retries: u32) -> Result<()> {
        self.connect_with(None, retries)
    }

    /// Join the network, resuming from state saved by [`Helium::sleep`].
    pub fn connect_with(&self, connection: Option<&Connection>, retries: u32) -> Result<()> {
        self.with_atom(|atom| {
            debug!(quick = connection.is_some(), retries, "connecting");
            status_result(atom.connect(connection))?;

            for attempt in 0..retries {
                if attempt > 0 {
                    atom.wait();
                }
                match atom.connected() {
                    Status::Ok => {
                        info!(attempt, "connected");
                        return Ok(());
                    }
                    Status::ErrNotConnected => {}
                    other => {
                        warn!(attempt, status = %other, "network join failed");
                        return Err(failure(other));
                    }
                }
            }
            warn!(retries, "gave up waiting for network join");
            Err(HeliumError::NotConnected)
        })
    }

    /// Whether the Atom is joined to the network.
    ///
    /// # Panics
    ///
    /// Panics if the session has been closed.
    pub fn connected(&self) -> bool {
        self.open_atom().connected().is_ok()
    }

    /// Disconnect and power the Atom down.
    ///
    /// Fails with [`HeliumError::KeepAwake`] while the Atom still has data to
    /// deliver or a firmware update in progress; try again later. The returned
    /// [`Connection`] can be passed to [`Helium::connect_with`].
    pub fn sleep(&self) -> Result<Connection> {
        self.with_atom(|atom| {
            let connection = atom.sleep().map_err(failure)?;
            debug!(saved = connection.as_bytes().len(), "atom asleep");
            Ok(connection)
        })
    }

    /// Release the transport. Later calls do nothing.
    pub fn close(&self) {
        if let Some(atom) = self.atom.borrow_mut().take() {
            drop(atom);
            debug!("session closed");
        }
    }

    /// Whether [`Helium::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.atom.borrow().is_none()
    }
}

impl<A: Atom> std::fmt::Debug for Helium<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Helium")
            .field("closed", &self.is_closed())
            .finish()
    }
}
