//! Common types used in the protocol.

use crate::constants::*;
use crate::error::ProtocolError;

/// Peer-issued handle for a result that is not ready yet.
///
/// Tokens are opaque: the Atom may reuse them, and nothing about their
/// ordering is meaningful to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token(pub u16);

impl Token {
    /// Get the raw token value.
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Peer-assigned channel identifier.
pub type ChannelId = u8;

/// Snapshot of the Atom's identity and firmware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Info {
    /// 64-bit hardware address.
    pub mac: u64,
    /// Seconds since the Atom booted.
    pub uptime: u32,
    /// Current epoch time in seconds (only meaningful once connected).
    pub time: u32,
    /// Packed firmware version, see [`Info::firmware_version`].
    pub fw_version: u32,
    /// Number of radios on the module.
    pub radio_count: u8,
}

impl Info {
    /// Unpack the firmware version.
    pub fn firmware_version(&self) -> FirmwareVersion {
        FirmwareVersion::from_packed(self.fw_version)
    }

    /// Encode into the [`INFO_SIZE`]-byte wire layout.
    pub fn encode(&self) -> [u8; INFO_SIZE] {
        let mut buf = [0u8; INFO_SIZE];
        buf[0..8].copy_from_slice(&self.mac.to_le_bytes());
        buf[8..12].copy_from_slice(&self.uptime.to_le_bytes());
        buf[12..16].copy_from_slice(&self.time.to_le_bytes());
        buf[16..20].copy_from_slice(&self.fw_version.to_le_bytes());
        buf[20] = self.radio_count;
        buf
    }

    /// Decode from the wire layout.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < INFO_SIZE {
            return Err(ProtocolError::FrameTooShort {
                expected: INFO_SIZE,
                actual: data.len(),
            });
        }
        Ok(Info {
            mac: u64::from_le_bytes([
                data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7],
            ]),
            uptime: u32::from_le_bytes([data[8], data[9], data[10], data[11]]),
            time: u32::from_le_bytes([data[12], data[13], data[14], data[15]]),
            fw_version: u32::from_le_bytes([data[16], data[17], data[18], data[19]]),
            radio_count: data[20],
        })
    }
}

/// Firmware version unpacked from [`Info::fw_version`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FirmwareVersion {
    /// Major version.
    pub major: u8,
    /// Minor version.
    pub minor: u8,
    /// Patch version.
    pub patch: u8,
    /// Extra build number.
    pub extra: u8,
}

impl FirmwareVersion {
    /// Unpack from a u32 with the major version in the most significant byte.
    pub fn from_packed(packed: u32) -> Self {
        let [major, minor, patch, extra] = packed.to_be_bytes();
        FirmwareVersion {
            major,
            minor,
            patch,
            extra,
        }
    }

    /// Pack back into a u32.
    pub fn packed(&self) -> u32 {
        u32::from_be_bytes([self.major, self.minor, self.patch, self.extra])
    }
}

impl std::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.patch, self.extra)
    }
}

/// Opaque network connection state handed back by a sleep.
///
/// Passing it to the next connect lets the Atom rejoin without a full
/// network join.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connection(Vec<u8>);

impl Connection {
    /// Wrap raw connection bytes. Fails if longer than [`MAX_CONNECTION_SIZE`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() > MAX_CONNECTION_SIZE {
            return Err(ProtocolError::ValueTooLong {
                field: "connection",
                max: MAX_CONNECTION_SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Connection(bytes.to_vec()))
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the connection carries no state.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Connection {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
