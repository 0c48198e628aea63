//! # Conduit Shared
//! Common functionality shared between conduit-coordinator & conduit-peer
//! crates: the duplex channel primitive, the per-peer scope registry and the
//! control messages exchanged during the handshake.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

mod backends;
mod channel;
mod error;
mod messages;
mod registry;
mod scope;
mod transport;
mod types;

cfg_if! {
    if #[cfg(feature = "wire")] {
        pub mod wire;
    }
}

pub use backends::Timer;
pub use channel::{
    channel_handle::ChannelHandle,
    channel_receiver::ChannelReceiver,
    duplex_channel::{ChannelDirection, DuplexChannel},
    value_cell::{CellSide, SubscriptionKey},
};
pub use error::ChannelError;
pub use messages::{
    control_kind::ControlKind,
    control_message::{ControlMessage, SignalData},
};
pub use registry::ChannelRegistry;
pub use scope::{scope_event::ScopeEvent, scope_registry::ScopeRegistry};
pub use transport::{ControlSender, LinkGate, RecvError, SendError};
pub use types::{Payload, ScopeKey, PEER_SCOPE_KEY};
