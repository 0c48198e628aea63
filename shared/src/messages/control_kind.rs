use std::fmt;

// The kinds of control message exchanged between a Coordinator and a Peer
#[derive(Copy, Debug, Clone, Eq, PartialEq, Hash)]
pub enum ControlKind {
    // Handshake start (Peer -> Coordinator) and acknowledgement (Coordinator -> Peer)
    Init,
    // Declares a channel and seeds its value on the receiving side
    Create,
    // Updates the value of a channel
    Data,
    // Tears down a channel
    Close,
    // Scope teardown notice
    Quit,
    // Sent by a Peer before its execution context is recreated
    Reload,
}

impl ControlKind {
    pub const ALL: [ControlKind; 6] = [
        ControlKind::Init,
        ControlKind::Create,
        ControlKind::Data,
        ControlKind::Close,
        ControlKind::Quit,
        ControlKind::Reload,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlKind::Init => "init",
            ControlKind::Create => "create",
            ControlKind::Data => "data",
            ControlKind::Close => "close",
            ControlKind::Quit => "quit",
            ControlKind::Reload => "reload",
        }
    }

    /// Whether messages of this kind carry a channel name
    pub fn has_channel(&self) -> bool {
        matches!(
            self,
            ControlKind::Create | ControlKind::Data | ControlKind::Close
        )
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
