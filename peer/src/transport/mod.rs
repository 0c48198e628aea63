use conduit_shared::ControlMessage;

pub use conduit_shared::{ControlSender as MessageSender, RecvError, SendError};

/// Used to receive control messages from the Coordinator
pub trait MessageReceiver<P>: Send + Sync {
    /// Receives the next control message, or `None` if nothing is waiting
    fn receive(&mut self) -> Result<Option<ControlMessage<P>>, RecvError>;
}
