use crate::{channel::channel_handle::ChannelHandle, types::Payload};

/// The capabilities shared by both ends of the link
pub trait ChannelRegistry<P: Payload> {
    /// Declares a channel on this side, seeded with `initial`, and returns a
    /// typed handle to it. If an open channel already has that name the value
    /// is published into it instead.
    fn add_channel<T: Into<P>>(&mut self, name: &str, initial: T) -> ChannelHandle<T, P>;

    /// Returns a typed handle to an open channel, declared by either side
    fn get<T>(&self, name: &str) -> Option<ChannelHandle<T, P>>;

    /// Closes a channel and notifies the peer. Returns false if no open
    /// channel had that name.
    fn close(&mut self, name: &str) -> bool;
}
