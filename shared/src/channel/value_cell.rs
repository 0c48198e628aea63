use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, RwLock,
    },
    thread::{self, ThreadId},
};

use log::{debug, warn};

use crate::error::ChannelError;

use super::channel_receiver::{ChannelReceiver, ReceiverQueue};

/// Which of a channel's two cells a subscription is attached to
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CellSide {
    /// The value this side publishes
    Outgoing,
    /// The last value received from the peer
    Incoming,
}

impl CellSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellSide::Outgoing => "outgoing",
            CellSide::Incoming => "incoming",
        }
    }
}

impl fmt::Display for CellSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when registering a listener, used to unsubscribe it later
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    side: CellSide,
    id: u64,
}

impl SubscriptionKey {
    pub fn side(&self) -> CellSide {
        self.side
    }
}

pub(crate) type Callback<P> = Box<dyn FnMut(&P) + Send + Sync>;

enum Listener<P> {
    Queue(Arc<Mutex<ReceiverQueue<P>>>),
    Callback(Callback<P>),
}

impl<P: Clone> Listener<P> {
    fn notify(&mut self, value: &P) {
        match self {
            Listener::Queue(queue) => {
                if let Ok(mut queue) = queue.lock() {
                    queue.buffer.push_back(value.clone());
                }
            }
            Listener::Callback(callback) => callback(value),
        }
    }

    // a queue nobody can read from anymore
    fn is_orphaned(&self) -> bool {
        match self {
            Listener::Queue(queue) => Arc::strong_count(queue) == 1,
            Listener::Callback(_) => false,
        }
    }

    fn close(&mut self) {
        if let Listener::Queue(queue) = self {
            if let Ok(mut queue) = queue.lock() {
                queue.closed = true;
            }
        }
    }
}

struct ListenerSet<P> {
    entries: Vec<(u64, Listener<P>)>,
    next_id: u64,
}

// ValueCell
/// Holds the latest value of one side of a channel and notifies listeners of
/// every new value. `None` is the empty sentinel and is never published.
///
/// The value lock is only held long enough to swap or clone the value, so
/// listeners may read the cell they are being notified by. Publishes are
/// serialized by the listener lock. A publish from another thread waits for
/// the running notification to finish. A publish from inside a listener on
/// the notifying thread is refused with `ChannelError::Reentrant`.
pub(crate) struct ValueCell<P> {
    channel: Arc<str>,
    side: CellSide,
    closed: Arc<AtomicBool>,
    value: Arc<RwLock<Option<P>>>,
    listeners: Arc<Mutex<ListenerSet<P>>>,
    // the thread currently running this cell's listeners
    notifier: Arc<Mutex<Option<ThreadId>>>,
}

impl<P> Clone for ValueCell<P> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
            side: self.side,
            closed: self.closed.clone(),
            value: self.value.clone(),
            listeners: self.listeners.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

// Marks the current thread as the notifier until dropped
struct Notifying<'a> {
    notifier: &'a Mutex<Option<ThreadId>>,
}

impl<'a> Notifying<'a> {
    fn enter(notifier: &'a Mutex<Option<ThreadId>>) -> Self {
        *lock_notifier(notifier) = Some(thread::current().id());
        Self { notifier }
    }
}

impl Drop for Notifying<'_> {
    fn drop(&mut self) {
        *lock_notifier(self.notifier) = None;
    }
}

// only ever holds a thread id, a poisoned guard is still valid
fn lock_notifier(notifier: &Mutex<Option<ThreadId>>) -> MutexGuard<'_, Option<ThreadId>> {
    notifier.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<P: Clone + Send + Sync + 'static> ValueCell<P> {
    pub(crate) fn new(channel: Arc<str>, side: CellSide, initial: Option<P>) -> Self {
        Self {
            channel,
            side,
            closed: Arc::new(AtomicBool::new(false)),
            value: Arc::new(RwLock::new(initial)),
            listeners: Arc::new(Mutex::new(ListenerSet {
                entries: Vec::new(),
                next_id: 0,
            })),
            notifier: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn is_notifying_thread(&self) -> bool {
        *lock_notifier(&self.notifier) == Some(thread::current().id())
    }

    fn lock_listeners(&self) -> Result<MutexGuard<'_, ListenerSet<P>>, ChannelError> {
        if self.is_notifying_thread() {
            return Err(self.reentrant());
        }
        self.listeners.lock().map_err(|_| self.poisoned())
    }

    fn reentrant(&self) -> ChannelError {
        ChannelError::Reentrant {
            channel: self.channel.to_string(),
            side: self.side.as_str(),
        }
    }

    fn poisoned(&self) -> ChannelError {
        ChannelError::Poisoned {
            channel: self.channel.to_string(),
            side: self.side.as_str(),
        }
    }

    /// The latest published value, `None` while the cell holds the sentinel
    pub(crate) fn value(&self) -> Result<Option<P>, ChannelError> {
        let value = self.value.read().map_err(|_| self.poisoned())?;
        Ok(value.clone())
    }

    /// Stores `value` and notifies every listener, even if the value did not
    /// change. Returns false if the cell is closed.
    pub(crate) fn publish(&self, value: P) -> Result<bool, ChannelError> {
        let mut listeners = self.lock_listeners()?;
        if self.is_closed() {
            debug!(
                "Dropping value published into closed {} cell of channel `{}`",
                self.side, self.channel
            );
            return Ok(false);
        }

        *self.value.write().map_err(|_| self.poisoned())? = Some(value.clone());

        listeners.entries.retain(|(_, listener)| !listener.is_orphaned());
        let _notifying = Notifying::enter(&self.notifier);
        for (_, listener) in listeners.entries.iter_mut() {
            listener.notify(&value);
        }

        Ok(true)
    }

    fn attach(&self, mut listener: Listener<P>, replay: bool) -> Result<SubscriptionKey, ChannelError> {
        let mut listeners = self.lock_listeners()?;
        let id = listeners.next_id;
        listeners.next_id = listeners.next_id.wrapping_add(1);
        let key = SubscriptionKey {
            side: self.side,
            id,
        };

        if self.is_closed() {
            listener.close();
            return Ok(key);
        }

        if replay {
            if let Some(value) = self.value()? {
                let _notifying = Notifying::enter(&self.notifier);
                listener.notify(&value);
            }
        }
        listeners.entries.push((id, listener));

        Ok(key)
    }

    /// Creates a receiver that replays the latest value, then every update
    pub(crate) fn observe<T>(&self) -> ChannelReceiver<T, P> {
        let queue = Arc::new(Mutex::new(ReceiverQueue::new()));
        match self.attach(Listener::Queue(queue.clone()), true) {
            Ok(_) => ChannelReceiver::new(queue),
            Err(error) => {
                warn!("{}", error);
                ChannelReceiver::new(Arc::new(Mutex::new(ReceiverQueue::closed())))
            }
        }
    }

    pub(crate) fn subscribe(&self, callback: Callback<P>, replay: bool) -> Result<SubscriptionKey, ChannelError> {
        self.attach(Listener::Callback(callback), replay)
    }

    pub(crate) fn unsubscribe(&self, key: &SubscriptionKey) -> bool {
        if self.is_closed() {
            warn!(
                "Unsubscribing from already closed {} cell of channel `{}`",
                self.side, self.channel
            );
            return false;
        }
        let mut listeners = match self.lock_listeners() {
            Ok(listeners) => listeners,
            Err(error) => {
                warn!("{}", error);
                return false;
            }
        };
        let before = listeners.entries.len();
        listeners.entries.retain(|(id, _)| *id != key.id);
        before != listeners.entries.len()
    }

    /// Releases the value and every listener. Returns false if the cell was
    /// already closed.
    pub(crate) fn close(&self) -> bool {
        let mut listeners = match self.lock_listeners() {
            Ok(listeners) => listeners,
            Err(error) => {
                warn!("{}", error);
                return false;
            }
        };
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        match self.value.write() {
            Ok(mut value) => *value = None,
            Err(_) => warn!("{}", self.poisoned()),
        }
        for (_, listener) in listeners.entries.iter_mut() {
            listener.close();
        }
        listeners.entries.clear();
        true
    }
}
