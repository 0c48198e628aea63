use std::vec::IntoIter;

use conduit_shared::ScopeEvent;

use crate::PeerKey;

/// Scope events produced by one `Coordinator::receive` pass, tagged with the
/// peer whose scope produced them, in processing order
#[derive(Debug, Default)]
pub struct CoordinatorEvents {
    events: Vec<(PeerKey, ScopeEvent)>,
}

impl CoordinatorEvents {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub(crate) fn push(&mut self, peer: PeerKey, event: ScopeEvent) {
        self.events.push((peer, event));
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(PeerKey, ScopeEvent)> {
        self.events.iter()
    }

    /// Events of a single peer's scope
    pub fn for_peer(&self, peer: PeerKey) -> impl Iterator<Item = &ScopeEvent> + '_ {
        self.events
            .iter()
            .filter(move |(key, _)| *key == peer)
            .map(|(_, event)| event)
    }

    /// Peers that completed a handshake during this pass
    pub fn initialized_peers(&self) -> Vec<PeerKey> {
        self.events
            .iter()
            .filter(|(_, event)| *event == ScopeEvent::Initialized)
            .map(|(peer, _)| *peer)
            .collect()
    }
}

impl IntoIterator for CoordinatorEvents {
    type Item = (PeerKey, ScopeEvent);
    type IntoIter = IntoIter<(PeerKey, ScopeEvent)>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
