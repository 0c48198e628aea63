//! # Conduit Coordinator
//! The coordinating end of a conduit link. Holds one isolated channel scope
//! per connected peer, answers each peer's handshake, and multiplexes
//! control messages by the peer they came from.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod transport;
pub mod shared {
    pub use conduit_shared::{
        ChannelDirection, ChannelError, ChannelHandle, ChannelReceiver, ChannelRegistry,
        ControlKind, ControlMessage, DuplexChannel, Payload, ScopeEvent, ScopeRegistry,
        SignalData, SubscriptionKey,
    };
}

mod coordinator;
mod error;
mod events;
mod peer_key;

pub use coordinator::{Coordinator, CoordinatorConfig};
pub use error::{ConfigurationError, CoordinatorError};
pub use events::CoordinatorEvents;
pub use peer_key::PeerKey;
