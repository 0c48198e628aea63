mod supervisor;

pub(crate) use supervisor::{HandshakeAction, HandshakeSupervisor};
pub use supervisor::HandshakeState;
