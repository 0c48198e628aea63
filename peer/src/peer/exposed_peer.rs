use conduit_shared::{ChannelHandle, ChannelRegistry, Payload};

use super::peer::Peer;

/// The surface handed to sandboxed contexts: they may look up and declare
/// channels, nothing else. No access to the transport, the handshake or
/// the scope itself.
pub struct ExposedPeer<'p, P: Payload> {
    peer: &'p mut Peer<P>,
}

impl<'p, P: Payload> ExposedPeer<'p, P> {
    pub(crate) fn new(peer: &'p mut Peer<P>) -> Self {
        Self { peer }
    }

    pub fn get_channel<T>(&self, name: &str) -> Option<ChannelHandle<T, P>> {
        self.peer.get(name)
    }

    pub fn add_channel<T: Into<P>>(&mut self, name: &str, initial: T) -> ChannelHandle<T, P> {
        self.peer.add_channel(name, initial)
    }
}
