use std::vec::IntoIter;

use conduit_shared::ScopeEvent;

/// Scope events produced by one `Peer::receive` pass, in processing order
#[derive(Debug, Default)]
pub struct PeerEvents {
    events: Vec<ScopeEvent>,
}

impl PeerEvents {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub(crate) fn push(&mut self, event: ScopeEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScopeEvent> {
        self.events.iter()
    }

    pub fn contains(&self, event: &ScopeEvent) -> bool {
        self.events.contains(event)
    }
}

impl IntoIterator for PeerEvents {
    type Item = ScopeEvent;
    type IntoIter = IntoIter<ScopeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
