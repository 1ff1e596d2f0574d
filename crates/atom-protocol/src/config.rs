//! Typed configuration values and their fixed-width wire encoding.
//!
//! This module provides:
//! - [`ConfigType`] - The wire tag identifying a value's kind
//! - [`ConfigValue`] - The tagged value itself
//! - [`ConfigBuffer`] - The fixed [`CONFIG_VALUE_SIZE`]-byte buffer every value is encoded into
//!
//! Layout inside the buffer:
//!
//! | Type | Bytes |
//! |------|-------|
//! | null | all zero |
//! | i32  | little-endian in `[0..4]` |
//! | f32  | little-endian IEEE-754 bits in `[0..4]` |
//! | bool | `0` or `1` in `[0]` |
//! | str  | UTF-8 bytes, NUL terminator, zero padding |

use crate::constants::*;
use crate::error::ProtocolError;

// ============================================================================
// Config Type Tag
// ============================================================================

/// The kind of value carried in a [`ConfigBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigType {
    /// No value.
    Null,
    /// 32-bit signed integer.
    I32,
    /// 32-bit float.
    F32,
    /// Boolean.
    Bool,
    /// Short string.
    Str,
}

impl TryFrom<u8> for ConfigType {
    type Error = ProtocolError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            CONFIG_TYPE_NULL => Ok(ConfigType::Null),
            CONFIG_TYPE_I32 => Ok(ConfigType::I32),
            CONFIG_TYPE_F32 => Ok(ConfigType::F32),
            CONFIG_TYPE_BOOL => Ok(ConfigType::Bool),
            CONFIG_TYPE_STR => Ok(ConfigType::Str),
            _ => Err(ProtocolError::UnknownConfigType(tag)),
        }
    }
}

impl From<ConfigType> for u8 {
    fn from(ty: ConfigType) -> Self {
        match ty {
            ConfigType::Null => CONFIG_TYPE_NULL,
            ConfigType::I32 => CONFIG_TYPE_I32,
            ConfigType::F32 => CONFIG_TYPE_F32,
            ConfigType::Bool => CONFIG_TYPE_BOOL,
            ConfigType::Str => CONFIG_TYPE_STR,
        }
    }
}

// ============================================================================
// Config Buffer
// ============================================================================

/// Fixed-width scratch buffer shared by every value kind.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ConfigBuffer([u8; CONFIG_VALUE_SIZE]);

impl ConfigBuffer {
    /// An all-zero buffer.
    pub fn zeroed() -> Self {
        ConfigBuffer([0u8; CONFIG_VALUE_SIZE])
    }

    /// Copy a buffer out of received data. The slice must be exactly
    /// [`CONFIG_VALUE_SIZE`] bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self, ProtocolError> {
        if slice.len() != CONFIG_VALUE_SIZE {
            return Err(ProtocolError::InvalidData(format!(
                "config buffer must be {} bytes, got {}",
                CONFIG_VALUE_SIZE,
                slice.len()
            )));
        }
        let mut bytes = [0u8; CONFIG_VALUE_SIZE];
        bytes.copy_from_slice(slice);
        Ok(ConfigBuffer(bytes))
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; CONFIG_VALUE_SIZE] {
        &self.0
    }

    fn word(&self) -> [u8; 4] {
        [self.0[0], self.0[1], self.0[2], self.0[3]]
    }
}

impl Default for ConfigBuffer {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl std::fmt::Debug for ConfigBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Trailing zeros are padding
        let used = self.0.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        f.debug_tuple("ConfigBuffer").field(&&self.0[..used]).finish()
    }
}

impl AsRef<[u8]> for ConfigBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ============================================================================
// Config Value
// ============================================================================

/// A configuration value as stored by the Atom.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ConfigValue {
    /// No value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    I32(i32),
    /// Floating point value.
    F32(f32),
    /// String value, at most [`MAX_CONFIG_STR_LEN`] bytes.
    Str(String),
}

impl ConfigValue {
    /// The wire tag for this value.
    pub fn config_type(&self) -> ConfigType {
        match self {
            ConfigValue::Null => ConfigType::Null,
            ConfigValue::Bool(_) => ConfigType::Bool,
            ConfigValue::I32(_) => ConfigType::I32,
            ConfigValue::F32(_) => ConfigType::F32,
            ConfigValue::Str(_) => ConfigType::Str,
        }
    }

    /// Encode into a fixed-width buffer.
    ///
    /// Strings longer than [`MAX_CONFIG_STR_LEN`] bytes are rejected, never
    /// truncated. Strings containing NUL are rejected because the terminator
    /// would cut them short on decode.
    pub fn encode(&self) -> Result<(ConfigType, ConfigBuffer), ProtocolError> {
        let mut buf = ConfigBuffer::zeroed();
        match self {
            ConfigValue::Null => {}
            ConfigValue::Bool(v) => buf.0[0] = u8::from(*v),
            ConfigValue::I32(v) => buf.0[..4].copy_from_slice(&v.to_le_bytes()),
            ConfigValue::F32(v) => buf.0[..4].copy_from_slice(&v.to_le_bytes()),
            ConfigValue::Str(s) => {
                let bytes = s.as_bytes();
                if bytes.len() > MAX_CONFIG_STR_LEN {
                    return Err(ProtocolError::ValueTooLong {
                        field: "config string",
                        max: MAX_CONFIG_STR_LEN,
                        actual: bytes.len(),
                    });
                }
                if bytes.contains(&0) {
                    return Err(ProtocolError::InvalidData(
                        "config string contains NUL".to_string(),
                    ));
                }
                buf.0[..bytes.len()].copy_from_slice(bytes);
            }
        }
        Ok((self.config_type(), buf))
    }

    /// Decode a value of the given type from a buffer.
    pub fn decode(ty: ConfigType, buf: &ConfigBuffer) -> Result<Self, ProtocolError> {
        let value = match ty {
            ConfigType::Null => ConfigValue::Null,
            ConfigType::Bool => ConfigValue::Bool(buf.0[0] != 0),
            ConfigType::I32 => ConfigValue::I32(i32::from_le_bytes(buf.word())),
            ConfigType::F32 => ConfigValue::F32(f32::from_le_bytes(buf.word())),
            ConfigType::Str => {
                // A buffer without a terminator is corrupt: encode always leaves one
                let end = buf.0.iter().position(|&b| b == 0).ok_or_else(|| {
                    ProtocolError::InvalidData("config string is not terminated".to_string())
                })?;
                let s = std::str::from_utf8(&buf.0[..end]).map_err(|_| ProtocolError::InvalidUtf8)?;
                ConfigValue::Str(s.to_string())
            }
        };
        Ok(value)
    }

    /// Get as i32 if this is an integer.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ConfigValue::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as f32. Integers convert.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ConfigValue::F32(v) => Some(*v),
            ConfigValue::I32(v) => Some(*v as f32),
            _ => None,
        }
    }

    /// Get as bool if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as a string slice if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Check if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }
}

impl Default for ConfigValue {
    fn default() -> Self {
        ConfigValue::Null
    }
}

impl std::fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValue::Null => write!(f, "null"),
            ConfigValue::Bool(v) => write!(f, "{}", v),
            ConfigValue::I32(v) => write!(f, "{}", v),
            ConfigValue::F32(v) => write!(f, "{}", v),
            ConfigValue::Str(v) => write!(f, "{}", v),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<i32> for ConfigValue {
    fn from(v: i32) -> Self {
        ConfigValue::I32(v)
    }
}

impl From<f32> for ConfigValue {
    fn from(v: f32) -> Self {
        ConfigValue::F32(v)
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Str(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::Str(v)
    }
}

impl<T: Into<ConfigValue>> From<Option<T>> for ConfigValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => ConfigValue::Null,
        }
    }
}

impl TryFrom<i64> for ConfigValue {
    type Error = ProtocolError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        i32::try_from(v)
            .map(ConfigValue::I32)
            .map_err(|_| ProtocolError::UnsupportedValue(format!("{} does not fit in i32", v)))
    }
}

impl TryFrom<f64> for ConfigValue {
    type Error = ProtocolError;

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        let narrowed = v as f32;
        if v.is_nan() || f64::from(narrowed) == v {
            Ok(ConfigValue::F32(narrowed))
        } else {
            Err(ProtocolError::UnsupportedValue(format!(
                "{} is not representable as f32",
                v
            )))
        }
    }
}
