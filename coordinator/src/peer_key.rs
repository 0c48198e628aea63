use std::fmt;

use conduit_shared::ScopeKey;

// PeerKey
/// Identifies a connected peer. Assigned by the transport and captured from
/// the origin of every incoming message.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct PeerKey(u64);

impl PeerKey {
    pub fn new(id: u64) -> Self {
        PeerKey(id)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }

    pub(crate) fn scope_key(&self) -> ScopeKey {
        self.0
    }
}

impl From<u64> for PeerKey {
    fn from(value: u64) -> Self {
        PeerKey(value)
    }
}

impl fmt::Display for PeerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
