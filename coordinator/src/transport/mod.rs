use conduit_shared::{ControlMessage, ControlSender, Payload};

pub use conduit_shared::{RecvError, SendError};

use crate::PeerKey;

/// Used to send control messages to connected peers
pub trait MessageSender<P>: Send + Sync {
    /// Sends a control message to the given peer
    fn send(&self, peer: &PeerKey, message: ControlMessage<P>) -> Result<(), SendError>;
    /// Creates a new boxed clone of the sender
    fn box_clone(&self) -> Box<dyn MessageSender<P>>;
}

impl<P> Clone for Box<dyn MessageSender<P>> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Used to receive control messages from connected peers
pub trait MessageReceiver<P>: Send + Sync {
    /// Receives the next control message along with the key of the peer
    /// that sent it, or `None` if nothing is waiting
    fn receive(&mut self) -> Result<Option<(PeerKey, ControlMessage<P>)>, RecvError>;
}

// Binds a MessageSender to one peer, so that a scope can write to it
pub(crate) struct ScopeSender<P> {
    peer: PeerKey,
    sender: Box<dyn MessageSender<P>>,
}

impl<P> ScopeSender<P> {
    pub(crate) fn new(peer: PeerKey, sender: Box<dyn MessageSender<P>>) -> Self {
        Self { peer, sender }
    }
}

impl<P: Payload> ControlSender<P> for ScopeSender<P> {
    fn send(&self, message: ControlMessage<P>) -> Result<(), SendError> {
        self.sender.send(&self.peer, message)
    }

    fn box_clone(&self) -> Box<dyn ControlSender<P>> {
        Box::new(ScopeSender {
            peer: self.peer,
            sender: self.sender.box_clone(),
        })
    }
}
