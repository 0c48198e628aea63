//! Reference bit-packed codec for control messages.
//!
//! The protocol core is agnostic of how payloads travel; this codec exists
//! for transports that move raw bytes, such as in-memory test sockets. Every
//! message must fit in a single MTU-sized buffer.

mod control_message;
mod error;

pub use error::WireError;

use naia_serde::{BitReader, BitWriter, Serde, MTU_SIZE_BITS};

use crate::ControlMessage;

/// Encodes a control message into a byte buffer
pub fn encode<P: Serde>(message: &ControlMessage<P>) -> Result<Vec<u8>, WireError> {
    let bits = message.bit_length();
    if bits > MTU_SIZE_BITS {
        return Err(WireError::MessageTooLarge {
            kind: message.kind().as_str(),
            bits_needed: bits,
            bits_free: MTU_SIZE_BITS,
        });
    }

    let mut writer = BitWriter::new();
    message.ser(&mut writer);
    Ok(writer.to_bytes().to_vec())
}

/// Decodes a control message from a byte buffer
pub fn decode<P: Serde>(bytes: &[u8]) -> Result<ControlMessage<P>, WireError> {
    let mut reader = BitReader::new(bytes);
    ControlMessage::de(&mut reader).map_err(|_| WireError::Malformed {
        length: bytes.len(),
    })
}
