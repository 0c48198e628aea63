// Bit layout of a control message: a 3-bit kind index, followed by the
// channel name for Create/Data/Close, followed by the payload for Create/Data

use naia_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr, UnsignedInteger};

use crate::{ControlKind, ControlMessage, SignalData};

fn kind_index(kind: ControlKind) -> u8 {
    match kind {
        ControlKind::Init => 0,
        ControlKind::Create => 1,
        ControlKind::Data => 2,
        ControlKind::Close => 3,
        ControlKind::Quit => 4,
        ControlKind::Reload => 5,
    }
}

impl<P: Serde> Serde for ControlMessage<P> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedInteger::<3>::new(kind_index(self.kind())).ser(writer);

        match self {
            ControlMessage::Create(signal) | ControlMessage::Data(signal) => {
                signal.channel.ser(writer);
                signal.data.ser(writer);
            }
            ControlMessage::Close { channel } => {
                channel.ser(writer);
            }
            ControlMessage::Init | ControlMessage::Quit | ControlMessage::Reload => {}
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let kind = match UnsignedInteger::<3>::de(reader)?.get() {
            0 => ControlKind::Init,
            1 => ControlKind::Create,
            2 => ControlKind::Data,
            3 => ControlKind::Close,
            4 => ControlKind::Quit,
            5 => ControlKind::Reload,
            // SECURITY: malformed or malicious buffers may carry unused indices
            _ => return Err(SerdeErr),
        };

        let message = match kind {
            ControlKind::Init => ControlMessage::Init,
            ControlKind::Quit => ControlMessage::Quit,
            ControlKind::Reload => ControlMessage::Reload,
            ControlKind::Close => ControlMessage::Close {
                channel: String::de(reader)?,
            },
            ControlKind::Create | ControlKind::Data => {
                let channel = String::de(reader)?;
                let data = P::de(reader)?;
                let signal = SignalData { channel, data };
                if kind == ControlKind::Create {
                    ControlMessage::Create(signal)
                } else {
                    ControlMessage::Data(signal)
                }
            }
        };

        Ok(message)
    }

    fn bit_length(&self) -> u32 {
        let mut output = <UnsignedInteger<3> as ConstBitLength>::const_bit_length();

        match self {
            ControlMessage::Create(signal) | ControlMessage::Data(signal) => {
                output += signal.channel.bit_length();
                output += signal.data.bit_length();
            }
            ControlMessage::Close { channel } => {
                output += channel.bit_length();
            }
            ControlMessage::Init | ControlMessage::Quit | ControlMessage::Reload => {}
        }

        output
    }
}
