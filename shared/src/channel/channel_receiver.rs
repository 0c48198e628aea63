use std::{
    collections::VecDeque,
    marker::PhantomData,
    sync::{Arc, Mutex},
};

use log::warn;

// Values published into a cell, waiting to be read by one receiver
pub(crate) struct ReceiverQueue<P> {
    pub(crate) buffer: VecDeque<P>,
    pub(crate) closed: bool,
}

impl<P> ReceiverQueue<P> {
    pub(crate) fn new() -> Self {
        Self {
            buffer: VecDeque::new(),
            closed: false,
        }
    }

    pub(crate) fn closed() -> Self {
        Self {
            buffer: VecDeque::new(),
            closed: true,
        }
    }
}

/// A restartable view over the updates of one value cell.
///
/// A new receiver starts with the cell's latest value (if any) and then
/// buffers every later update. The empty sentinel is never yielded. Once the
/// buffer is drained, `receive` returns `None` until the next update arrives,
/// so the receiver can be polled again and again from an event loop.
pub struct ChannelReceiver<T, P = T> {
    queue: Arc<Mutex<ReceiverQueue<P>>>,
    phantom: PhantomData<fn() -> T>,
}

impl<T, P> ChannelReceiver<T, P> {
    pub(crate) fn new(queue: Arc<Mutex<ReceiverQueue<P>>>) -> Self {
        Self {
            queue,
            phantom: PhantomData,
        }
    }

    /// Re-types the receiver. Values are converted on read.
    pub(crate) fn cast<U>(self) -> ChannelReceiver<U, P> {
        ChannelReceiver {
            queue: self.queue,
            phantom: PhantomData,
        }
    }

    /// Returns true if the underlying channel was closed and every buffered
    /// value has been read
    pub fn is_closed(&self) -> bool {
        let Ok(queue) = self.queue.lock() else {
            return true;
        };
        queue.closed && queue.buffer.is_empty()
    }

    /// Returns true if at least one value is waiting to be read
    pub fn has_pending(&self) -> bool {
        let Ok(queue) = self.queue.lock() else {
            return false;
        };
        !queue.buffer.is_empty()
    }
}

impl<T: TryFrom<P>, P> ChannelReceiver<T, P> {
    /// Pops the oldest buffered value
    pub fn receive(&mut self) -> Option<T> {
        loop {
            let value = {
                let Ok(mut queue) = self.queue.lock() else {
                    return None;
                };
                queue.buffer.pop_front()?
            };
            match T::try_from(value) {
                Ok(value) => return Some(value),
                Err(_) => {
                    warn!(
                        "Dropping channel value that does not convert to `{}`",
                        std::any::type_name::<T>()
                    );
                }
            }
        }
    }

    /// Pops every buffered value, oldest first
    pub fn drain(&mut self) -> Vec<T> {
        let mut output = Vec::new();
        while let Some(value) = self.receive() {
            output.push(value);
        }
        output
    }

    /// Pops every buffered value and keeps only the most recent one
    pub fn latest(&mut self) -> Option<T> {
        self.drain().pop()
    }
}

impl<T: TryFrom<P>, P> Iterator for ChannelReceiver<T, P> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.receive()
    }
}
