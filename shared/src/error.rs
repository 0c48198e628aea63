use thiserror::Error;

/// Errors that can occur while touching a channel's value cells
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// A cell was modified from inside one of its own notifications
    #[error("Channel `{channel}` {side} cell is already held on the current thread. A listener may not publish into the cell that is notifying it")]
    Reentrant {
        channel: String,
        side: &'static str,
    },

    /// A cell lock was poisoned by a panicking listener
    #[error("Channel `{channel}` {side} cell was poisoned by a panicking listener")]
    Poisoned {
        channel: String,
        side: &'static str,
    },
}
