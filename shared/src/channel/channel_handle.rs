use std::{fmt, marker::PhantomData};

use crate::{error::ChannelError, types::Payload};

use super::{
    channel_receiver::ChannelReceiver, duplex_channel::DuplexChannel, value_cell::SubscriptionKey,
};

/// A typed view over a registry's channel.
///
/// The registry carries one payload type `P`; each handle picks its own `T`,
/// converting with `Into<P>` when sending and `TryFrom<P>` when reading. With
/// `T = P` both conversions are the identity.
pub struct ChannelHandle<T, P = T> {
    channel: DuplexChannel<P>,
    phantom: PhantomData<fn() -> T>,
}

impl<T, P> Clone for ChannelHandle<T, P> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
            phantom: PhantomData,
        }
    }
}

impl<T, P> fmt::Debug for ChannelHandle<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChannelHandle").field(&self.channel).finish()
    }
}

impl<T, P: Payload> ChannelHandle<T, P> {
    pub fn new(channel: DuplexChannel<P>) -> Self {
        Self {
            channel,
            phantom: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        self.channel.name()
    }

    /// The untyped channel underneath
    pub fn channel(&self) -> &DuplexChannel<P> {
        &self.channel
    }

    pub fn unsubscribe(&self, key: &SubscriptionKey) -> bool {
        self.channel.unsubscribe(key)
    }

    pub fn close(&self) -> bool {
        self.channel.close()
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }
}

impl<T: Into<P>, P: Payload> ChannelHandle<T, P> {
    /// Publishes a value to the peer
    pub fn send(&self, value: T) -> bool {
        self.channel.send(value.into())
    }
}

impl<T: TryFrom<P> + 'static, P: Payload> ChannelHandle<T, P> {
    /// The last value received from the peer
    pub fn remote_value(&self) -> Option<T> {
        self.channel
            .remote_value()
            .and_then(|value| T::try_from(value).ok())
    }

    /// The value this side last published
    pub fn local_value(&self) -> Option<T> {
        self.channel
            .local_value()
            .and_then(|value| T::try_from(value).ok())
    }

    pub fn observe(&self) -> ChannelReceiver<T, P> {
        self.channel.observe().cast()
    }

    pub fn observe_local(&self) -> ChannelReceiver<T, P> {
        self.channel.observe_local().cast()
    }

    pub fn subscribe<F: FnMut(T) + Send + Sync + 'static>(
        &self,
        mut callback: F,
    ) -> Result<SubscriptionKey, ChannelError> {
        self.channel.subscribe(move |value: &P| {
            if let Ok(value) = T::try_from(value.clone()) {
                callback(value);
            }
        })
    }

    pub fn subscribe_local<F: FnMut(T) + Send + Sync + 'static>(
        &self,
        mut callback: F,
    ) -> Result<SubscriptionKey, ChannelError> {
        self.channel.subscribe_local(move |value: &P| {
            if let Ok(value) = T::try_from(value.clone()) {
                callback(value);
            }
        })
    }
}
