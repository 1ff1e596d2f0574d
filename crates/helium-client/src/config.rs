//! Reading and writing configuration stored upstream.
//!
//! Keys carry their scope in a prefix, e.g. [`GLOBAL_CONFIG_PREFIX`] for
//! device-wide values and [`CHANNEL_CONFIG_PREFIX`] for values attached to
//! the channel. The prefix is passed through untouched.
//!
//! [`GLOBAL_CONFIG_PREFIX`]: atom_protocol::GLOBAL_CONFIG_PREFIX
//! [`CHANNEL_CONFIG_PREFIX`]: atom_protocol::CHANNEL_CONFIG_PREFIX

use atom_protocol::{ChannelId, ConfigValue, MAX_CONFIG_KEY_LEN};
use tracing::debug;

use crate::atom::Atom;
use crate::error::{HeliumError, Result};
use crate::poll;
use crate::session::Helium;

/// Key/value pairs in the order the Atom reported them.
///
/// A key reported twice keeps its first position and takes the later value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigMap {
    entries: Vec<(String, ConfigValue)>,
}

impl ConfigMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: &str, value: ConfigValue) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in report order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl IntoIterator for ConfigMap {
    type Item = (String, ConfigValue);
    type IntoIter = std::vec::IntoIter<(String, ConfigValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Configuration access through one channel.
pub struct Config<'h, A: Atom> {
    helium: &'h Helium<A>,
    channel_id: ChannelId,
}

impl<'h, A: Atom> Config<'h, A> {
    pub(crate) fn new(helium: &'h Helium<A>, channel_id: ChannelId) -> Self {
        Config { helium, channel_id }
    }

    /// Get a value, or `default` if the Atom has none for `key`.
    pub fn get(&self, key: &str, default: ConfigValue, retries: u32) -> Result<ConfigValue> {
        let mut values = self.fetch(key, retries)?;
        let position = values.entries.iter().position(|(k, _)| k == key);
        Ok(match position {
            Some(i) => values.entries.swap_remove(i).1,
            None => default,
        })
    }

    /// Fetch everything the Atom reports for `key`.
    ///
    /// The Atom may report related keys along with the requested one. "No
    /// data" is not an error here: it yields an empty map.
    pub fn fetch(&self, key: &str, retries: u32) -> Result<ConfigMap> {
        check_key(key)?;

        let mut values = ConfigMap::new();
        let outcome = self.helium.with_atom(|atom| {
            let initiated = atom.config_get(self.channel_id, key);
            poll::complete(initiated, retries, |token| {
                atom.config_get_poll_result(token, &mut |k: &str, v: ConfigValue| values.insert(k, v))
            })
        });

        match outcome {
            Ok(_) => {
                debug!(key, reported = values.len(), "config fetched");
                Ok(values)
            }
            Err(HeliumError::NoData) => {
                debug!(key, "no config data");
                Ok(ConfigMap::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Set a value.
    ///
    /// The value is encoded before anything is sent, so a value that cannot
    /// be represented fails with [`HeliumError::InvalidValue`] without any
    /// traffic to the Atom.
    pub fn set(&self, key: &str, value: impl Into<ConfigValue>, retries: u32) -> Result<()> {
        check_key(key)?;
        let value = value.into();
        value.encode()?;

        self.helium.with_atom(|atom| {
            let initiated = atom.config_set(self.channel_id, key, &value);
            poll::complete(initiated, retries, |token| atom.config_set_poll_result(token))
        })?;
        debug!(key, %value, "config set");
        Ok(())
    }

    /// Whether any tracked value changed upstream since the last check.
    pub fn poll_invalidate(&self, retries: u32) -> Result<bool> {
        let outcome = self.helium.with_atom(|atom| {
            let initiated = atom.poll_invalidate(self.channel_id);
            poll::complete(initiated, retries, |token| atom.poll_invalidate_poll_result(token))
        });
        match outcome {
            Ok(result) => Ok(result > 0),
            Err(HeliumError::NoData) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn check_key(key: &str) -> Result<()> {
    if key.len() > MAX_CONFIG_KEY_LEN {
        return Err(HeliumError::InvalidArgument(format!(
            "config key is {} bytes, maximum is {}",
            key.len(),
            MAX_CONFIG_KEY_LEN
        )));
    }
    Ok(())
}
