use super::control_kind::ControlKind;

/// A channel name paired with a value for that channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalData<P> {
    pub channel: String,
    pub data: P,
}

impl<P> SignalData<P> {
    pub fn new(channel: &str, data: P) -> Self {
        Self {
            channel: channel.to_string(),
            data,
        }
    }
}

/// A message of the channel synchronization protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage<P> {
    Init,
    Create(SignalData<P>),
    Data(SignalData<P>),
    Close { channel: String },
    Quit,
    Reload,
}

impl<P> ControlMessage<P> {
    pub fn create(channel: &str, data: P) -> Self {
        Self::Create(SignalData::new(channel, data))
    }

    pub fn data(channel: &str, data: P) -> Self {
        Self::Data(SignalData::new(channel, data))
    }

    pub fn close(channel: &str) -> Self {
        Self::Close {
            channel: channel.to_string(),
        }
    }

    pub fn kind(&self) -> ControlKind {
        match self {
            Self::Init => ControlKind::Init,
            Self::Create(_) => ControlKind::Create,
            Self::Data(_) => ControlKind::Data,
            Self::Close { .. } => ControlKind::Close,
            Self::Quit => ControlKind::Quit,
            Self::Reload => ControlKind::Reload,
        }
    }

    /// The channel this message addresses, if any
    pub fn channel(&self) -> Option<&str> {
        match self {
            Self::Create(signal) | Self::Data(signal) => Some(&signal.channel),
            Self::Close { channel } => Some(channel),
            Self::Init | Self::Quit | Self::Reload => None,
        }
    }
}
