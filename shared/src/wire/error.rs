use thiserror::Error;

/// Errors that can occur while encoding or decoding control messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// Control message does not fit in a single buffer
    #[error("Control message `{kind}` requires {bits_needed} bits, but a buffer only has {bits_free} bits available")]
    MessageTooLarge {
        kind: &'static str,
        bits_needed: u32,
        bits_free: u32,
    },

    /// Buffer could not be read as a control message (SECURITY: potentially malicious payload)
    #[error("Failed to decode control message from {length} bytes (possible malformed or malicious data)")]
    Malformed {
        length: usize,
    },
}
