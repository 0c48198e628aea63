use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by a Peer
#[derive(Clone, Debug)]
pub struct PeerConfig {
    /// How long to wait for the Coordinator's INIT acknowledgement before
    /// sending INIT again
    pub handshake_resend_interval: Duration,
    /// How many times INIT is resent after the first attempt before the
    /// handshake is considered failed
    pub handshake_max_retries: u8,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            handshake_resend_interval: Duration::from_secs(3),
            handshake_max_retries: 3,
        }
    }
}
