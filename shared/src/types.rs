/// Identifies a channel namespace inside a registry
pub type ScopeKey = u64;

/// The key of a Peer's one and only scope
pub const PEER_SCOPE_KEY: ScopeKey = 0;

/// Anything that can be carried through a channel. Serialization of the
/// payload is left to the transport.
pub trait Payload: Clone + Send + Sync + 'static {}

impl<P: Clone + Send + Sync + 'static> Payload for P {}
