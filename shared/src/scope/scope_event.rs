/// Something that happened to a scope while processing a control message
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeEvent {
    /// The handshake completed and queued channels were flushed
    Initialized,
    /// The peer tore the scope down; local channels are queued for resend
    Quit,
    /// The peer announced it will recreate its context
    Reload,
    /// The peer originated a channel this side had not declared
    ChannelOpened(String),
    /// The peer closed a channel
    ChannelClosed(String),
}
