//! # Conduit Peer
//! The dependent end of a conduit link. Owns a single channel scope,
//! initiates the handshake with its coordinator and keeps resending INIT
//! until the coordinator acknowledges it or the retry bound is reached.

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

mod error;
mod events;
mod handshake;
mod peer;

pub use error::{HandshakeError, PeerError};
pub use events::PeerEvents;
pub use handshake::HandshakeState;
pub use peer::{ExposedPeer, Peer, PeerConfig};
