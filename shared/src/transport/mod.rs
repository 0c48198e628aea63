use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::messages::control_message::ControlMessage;

#[derive(Debug)]
pub struct SendError;

#[derive(Debug)]
pub struct RecvError;

/// The sink a scope registry writes its outgoing control messages into.
/// Implemented by each role over its transport.
pub trait ControlSender<P>: Send + Sync {
    /// Sends a control message to the peer on the other end of the scope
    fn send(&self, message: ControlMessage<P>) -> Result<(), SendError>;
    /// Creates a new boxed clone of the sender
    fn box_clone(&self) -> Box<dyn ControlSender<P>>;
}

impl<P> Clone for Box<dyn ControlSender<P>> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// A switch shared by every sender of a link. Once severed, nothing more is
/// written to the underlying transport.
#[derive(Clone)]
pub struct LinkGate {
    open: Arc<AtomicBool>,
}

impl LinkGate {
    pub fn new() -> Self {
        Self {
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn sever(&self) {
        self.open.store(false, Ordering::Release);
    }

    /// Wraps a sender so that it silently drops messages once this gate is
    /// severed
    pub fn guard<P: 'static>(&self, sender: Box<dyn ControlSender<P>>) -> Box<dyn ControlSender<P>> {
        Box::new(GatedSender {
            inner: sender,
            gate: self.clone(),
        })
    }
}

impl Default for LinkGate {
    fn default() -> Self {
        Self::new()
    }
}

struct GatedSender<P> {
    inner: Box<dyn ControlSender<P>>,
    gate: LinkGate,
}

impl<P: 'static> ControlSender<P> for GatedSender<P> {
    fn send(&self, message: ControlMessage<P>) -> Result<(), SendError> {
        if !self.gate.is_open() {
            return Ok(());
        }
        self.inner.send(message)
    }

    fn box_clone(&self) -> Box<dyn ControlSender<P>> {
        Box::new(GatedSender {
            inner: self.inner.box_clone(),
            gate: self.gate.clone(),
        })
    }
}
