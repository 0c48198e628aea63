use std::{fmt, sync::Arc};

use log::warn;

use crate::{error::ChannelError, types::Payload};

use super::{
    channel_receiver::ChannelReceiver,
    value_cell::{CellSide, SubscriptionKey, ValueCell},
};

/// Which side of the link declared a channel
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChannelDirection {
    /// Declared on this side, seeded into the outgoing cell
    Local,
    /// Declared by the peer, seeded into the incoming cell
    Remote,
}

/// A named pair of value cells: `outgoing` holds what this side publishes,
/// `incoming` holds the last value received from the peer. Clones share the
/// same cells.
pub struct DuplexChannel<P> {
    name: Arc<str>,
    outgoing: ValueCell<P>,
    incoming: ValueCell<P>,
}

impl<P> Clone for DuplexChannel<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            outgoing: self.outgoing.clone(),
            incoming: self.incoming.clone(),
        }
    }
}

impl<P> fmt::Debug for DuplexChannel<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuplexChannel")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<P: Payload> DuplexChannel<P> {
    /// Creates a channel whose `direction` cell holds `initial` and whose
    /// other cell holds the empty sentinel
    pub fn new(name: &str, initial: P, direction: ChannelDirection) -> Self {
        let name: Arc<str> = Arc::from(name);
        let (outgoing, incoming) = match direction {
            ChannelDirection::Local => (Some(initial), None),
            ChannelDirection::Remote => (None, Some(initial)),
        };
        Self {
            outgoing: ValueCell::new(name.clone(), CellSide::Outgoing, outgoing),
            incoming: ValueCell::new(name.clone(), CellSide::Incoming, incoming),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if both handles point at the same cells
    pub fn same_channel(&self, other: &DuplexChannel<P>) -> bool {
        Arc::ptr_eq(&self.name, &other.name)
    }

    // Outgoing

    /// Publishes a value into the outgoing cell. Every outgoing subscriber is
    /// notified, including the wire forwarder, even if the value is unchanged.
    pub fn send(&self, value: P) -> bool {
        match self.try_send(value) {
            Ok(sent) => sent,
            Err(error) => {
                warn!("{}", error);
                false
            }
        }
    }

    pub fn try_send(&self, value: P) -> Result<bool, ChannelError> {
        self.outgoing.publish(value)
    }

    /// The value this side last published
    pub fn local_value(&self) -> Option<P> {
        self.outgoing.value().unwrap_or_else(|error| {
            warn!("{}", error);
            None
        })
    }

    /// Observes the values this side publishes
    pub fn observe_local(&self) -> ChannelReceiver<P> {
        self.outgoing.observe()
    }

    /// Calls `callback` with the latest published value, then with every new one
    pub fn subscribe_local<F: FnMut(&P) + Send + Sync + 'static>(
        &self,
        callback: F,
    ) -> Result<SubscriptionKey, ChannelError> {
        self.outgoing.subscribe(Box::new(callback), true)
    }

    // Like `subscribe_local`, without replaying the current value
    pub(crate) fn forward<F: FnMut(&P) + Send + Sync + 'static>(
        &self,
        callback: F,
    ) -> Result<SubscriptionKey, ChannelError> {
        self.outgoing.subscribe(Box::new(callback), false)
    }

    // Incoming

    // Pushes a value into the incoming cell, exactly like a peer-originated update
    pub(crate) fn receive(&self, value: P) -> bool {
        match self.incoming.publish(value) {
            Ok(received) => received,
            Err(error) => {
                warn!("{}", error);
                false
            }
        }
    }

    /// The last value received from the peer
    pub fn remote_value(&self) -> Option<P> {
        self.incoming.value().unwrap_or_else(|error| {
            warn!("{}", error);
            None
        })
    }

    /// Observes the values received from the peer. The latest one is replayed
    /// first; the empty sentinel is never yielded.
    pub fn observe(&self) -> ChannelReceiver<P> {
        self.incoming.observe()
    }

    /// Calls `callback` with the latest received value, then with every new one
    pub fn subscribe<F: FnMut(&P) + Send + Sync + 'static>(
        &self,
        callback: F,
    ) -> Result<SubscriptionKey, ChannelError> {
        self.incoming.subscribe(Box::new(callback), true)
    }

    // Lifecycle

    pub fn unsubscribe(&self, key: &SubscriptionKey) -> bool {
        match key.side() {
            CellSide::Outgoing => self.outgoing.unsubscribe(key),
            CellSide::Incoming => self.incoming.unsubscribe(key),
        }
    }

    /// Releases both cells and terminates their subscriptions. Closing an
    /// already closed channel is a no-op. Returns true if this call closed it.
    pub fn close(&self) -> bool {
        if self.is_closed() {
            warn!("Channel `{}` is already closed", self.name);
            return false;
        }
        let outgoing = self.outgoing.close();
        let incoming = self.incoming.close();
        outgoing || incoming
    }

    pub fn is_closed(&self) -> bool {
        self.outgoing.is_closed() && self.incoming.is_closed()
    }
}
