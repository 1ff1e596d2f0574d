//! Named channels for sending data to the network.

use atom_protocol::{ChannelId, Token, MAX_CHANNEL_NAME_LEN, MAX_PAYLOAD_SIZE};
use tracing::debug;

use crate::atom::Atom;
use crate::config::Config;
use crate::error::{HeliumError, Result};
use crate::poll::{self, Completion, RetryBudget};
use crate::session::Helium;

/// A channel created through a session.
///
/// Channels are configured on the dashboard; creating one only binds its name
/// to an id the Atom hands out. There is no destroy: a channel that went away
/// upstream simply fails on use.
pub struct Channel<'h, A: Atom> {
    helium: &'h Helium<A>,
    id: ChannelId,
    name: String,
}

impl<'h, A: Atom> Channel<'h, A> {
    /// Create a channel by name.
    ///
    /// With [`RetryBudget::NoRetry`] this returns the token instead; poll it
    /// with [`Channel::poll`] on any channel, or later build the channel with
    /// [`Channel::new`] from the resolved id.
    pub fn create(helium: &'h Helium<A>, name: &str, budget: RetryBudget) -> Result<Completion<Self>> {
        if name.len() > MAX_CHANNEL_NAME_LEN {
            return Err(HeliumError::InvalidArgument(format!(
                "channel name is {} bytes, maximum is {}",
                name.len(),
                MAX_CHANNEL_NAME_LEN
            )));
        }

        let completion = helium.with_atom(|atom| {
            let initiated = atom.channel_create(name);
            poll::drive(initiated, budget, |token| atom.channel_poll_result(token))
        })?;

        Ok(completion.map(|id| {
            debug!(name, id, "channel created");
            Channel::new(helium, id as ChannelId, name)
        }))
    }

    /// Bind a channel whose id is already known.
    pub fn new(helium: &'h Helium<A>, id: ChannelId, name: &str) -> Self {
        Channel {
            helium,
            id,
            name: name.to_string(),
        }
    }

    /// The id the Atom assigned.
    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// The name the channel was created with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The session this channel belongs to.
    pub fn helium(&self) -> &'h Helium<A> {
        self.helium
    }

    /// Send data on this channel.
    ///
    /// Fails with [`HeliumError::Channel`] if the channel rejects the data.
    pub fn send(&self, data: &[u8], budget: RetryBudget) -> Result<Completion<()>> {
        if data.len() > MAX_PAYLOAD_SIZE {
            return Err(HeliumError::InvalidArgument(format!(
                "payload is {} bytes, maximum is {}",
                data.len(),
                MAX_PAYLOAD_SIZE
            )));
        }

        let completion = self.helium.with_atom(|atom| {
            let initiated = atom.channel_send(self.id, data);
            poll::drive(initiated, budget, |token| atom.channel_poll_result(token))
        })?;
        Ok(completion.map(|_| ()))
    }

    /// Resolve a token from a deferred create or send.
    ///
    /// Returns the operation's result: a channel id for a create, `0` for a send.
    pub fn poll(&self, token: Token, budget: RetryBudget) -> Result<Completion<i8>> {
        match budget {
            RetryBudget::NoRetry => Ok(Completion::Pending(token)),
            RetryBudget::Attempts(attempts) => self.helium.with_atom(|atom| {
                poll::resolve(token, attempts, |token| atom.channel_poll_result(token))
                    .map(Completion::Resolved)
            }),
        }
    }

    /// Configuration access through this channel.
    pub fn config(&self) -> Config<'h, A> {
        Config::new(self.helium, self.id)
    }
}

impl<A: Atom> std::fmt::Debug for Channel<'_, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}
