use thiserror::Error;

/// Errors that can occur during the handshake with the Coordinator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    /// No INIT acknowledgement arrived within the retry bound
    #[error("Handshake failed: no acknowledgement from the coordinator after {attempts} INIT attempts. The peer context must be recreated")]
    Timeout {
        attempts: u8,
    },
}

/// General Peer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeerError {
    /// Handshake error, fatal to the Peer's channel subsystem
    #[error("Handshake error: {0}")]
    Handshake(#[from] HandshakeError),
}
