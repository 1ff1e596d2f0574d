//! Byte-level access to the serial link.
//!
//! The [`Transport`] trait is all the client needs from the link: a blocking
//! "is there data" check, single-byte reads and writes, and a way to wait.
//! [`SerialTransport`] implements it on top of a real serial device.

use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, warn};

/// Byte-level link to the Atom.
///
/// Releasing the link is `Drop`.
pub trait Transport {
    /// Block until data is available. Returns `false` if none arrives before
    /// the link gives up or on a link error.
    fn readable(&mut self) -> bool;

    /// Read one byte if one is immediately available.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write one byte. Returns `false` on failure.
    fn write_byte(&mut self, byte: u8) -> bool;

    /// Sleep for the given number of microseconds.
    fn wait_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }
}

/// Baud rates the Atom supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Baud {
    /// 9600 baud, the Atom's power-on default.
    #[default]
    B9600,
    /// 14400 baud.
    B14400,
    /// 19200 baud.
    B19200,
    /// 38400 baud.
    B38400,
    /// 57600 baud.
    B57600,
    /// 115200 baud.
    B115200,
}

impl Baud {
    /// The nominal rate in bits per second.
    pub fn nominal(&self) -> u32 {
        match self {
            Baud::B9600 => 9_600,
            Baud::B14400 => 14_400,
            Baud::B19200 => 19_200,
            Baud::B38400 => 38_400,
            Baud::B57600 => 57_600,
            Baud::B115200 => 115_200,
        }
    }

    /// The rate the host port is actually opened at.
    pub fn port_rate(&self) -> u32 {
        match self {
            // No standard termios rate for 14400; use the next one up
            Baud::B14400 => 19_200,
            other => other.nominal(),
        }
    }
}

impl TryFrom<u32> for Baud {
    type Error = String;

    fn try_from(rate: u32) -> Result<Self, Self::Error> {
        match rate {
            9_600 => Ok(Baud::B9600),
            14_400 => Ok(Baud::B14400),
            19_200 => Ok(Baud::B19200),
            38_400 => Ok(Baud::B38400),
            57_600 => Ok(Baud::B57600),
            115_200 => Ok(Baud::B115200),
            _ => Err(format!("unsupported baud rate: {}", rate)),
        }
    }
}

impl From<Baud> for u32 {
    fn from(baud: Baud) -> Self {
        baud.nominal()
    }
}

/// A [`Transport`] over a serial device.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    /// Byte consumed by `readable` but not yet handed out.
    pending: Option<u8>,
}

impl SerialTransport {
    /// Open a serial device at 8N1 without flow control.
    ///
    /// `read_timeout` bounds how long [`Transport::readable`] blocks.
    pub fn open(path: &str, baud: Baud, read_timeout: Duration) -> Result<Self, serialport::Error> {
        let port = serialport::new(path, baud.port_rate())
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(read_timeout)
            .open()?;
        debug!(path, baud = baud.nominal(), "opened serial port");
        Ok(SerialTransport {
            port,
            pending: None,
        })
    }

    fn read_one(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            Ok(_) => None,
            Err(e) if e.kind() == ErrorKind::TimedOut => None,
            Err(e) => {
                warn!(error = %e, "serial read failed");
                None
            }
        }
    }
}

impl Transport for SerialTransport {
    fn readable(&mut self) -> bool {
        if self.pending.is_none() {
            self.pending = self.read_one();
        }
        self.pending.is_some()
    }

    fn read_byte(&mut self) -> Option<u8> {
        if let Some(byte) = self.pending.take() {
            return Some(byte);
        }
        match self.port.bytes_to_read() {
            Ok(n) if n > 0 => self.read_one(),
            _ => None,
        }
    }

    fn write_byte(&mut self, byte: u8) -> bool {
        match self.port.write_all(&[byte]) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "serial write failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port", &self.port.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baud_rates() {
        assert_eq!(Baud::default(), Baud::B9600);
        assert_eq!(Baud::B14400.nominal(), 14_400);
        assert_eq!(Baud::B14400.port_rate(), 19_200);
        assert_eq!(Baud::B115200.port_rate(), 115_200);
    }

    #[test]
    fn test_baud_from_rate() {
        assert_eq!(Baud::try_from(57_600), Ok(Baud::B57600));
        assert!(Baud::try_from(1_234).is_err());
        assert_eq!(u32::from(Baud::B38400), 38_400);
    }

    #[test]
    fn test_open_missing_device() {
        let result = SerialTransport::open(
            "/dev/does-not-exist-helium",
            Baud::B9600,
            Duration::from_millis(10),
        );
        assert!(result.is_err());
    }
}
