use std::collections::{HashMap, VecDeque};

use log::{debug, warn};

use crate::{
    channel::duplex_channel::{ChannelDirection, DuplexChannel},
    messages::control_message::{ControlMessage, SignalData},
    transport::ControlSender,
    types::{Payload, ScopeKey},
};

use super::scope_event::ScopeEvent;

struct ScopeChannel<P> {
    channel: DuplexChannel<P>,
    direction: ChannelDirection,
    // registration order, used when re-queueing
    order: u64,
}

/// The channel namespace of one peer.
///
/// Holds every channel of the scope, the names waiting to be announced to
/// the peer, and whether the handshake with that peer has completed. The
/// pending queue is only filled while the scope is uninitialized (or after a
/// RELOAD notice) and is flushed in full when the handshake completes.
pub struct ScopeRegistry<P> {
    key: ScopeKey,
    channels: HashMap<String, ScopeChannel<P>>,
    pending: VecDeque<String>,
    initialized: bool,
    next_order: u64,
    sender: Box<dyn ControlSender<P>>,
}

impl<P: Payload> ScopeRegistry<P> {
    pub fn new(key: ScopeKey, sender: Box<dyn ControlSender<P>>) -> Self {
        Self {
            key,
            channels: HashMap::new(),
            pending: VecDeque::new(),
            initialized: false,
            next_order: 0,
            sender,
        }
    }

    pub fn key(&self) -> ScopeKey {
        self.key
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Names waiting to be announced with CREATE on the next handshake
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    /// Names of every open channel in the scope, in no particular order
    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels
            .iter()
            .filter(|(_, entry)| !entry.channel.is_closed())
            .map(|(name, _)| name.as_str())
    }

    pub fn direction(&self, name: &str) -> Option<ChannelDirection> {
        self.open_entry(name).map(|entry| entry.direction)
    }

    pub fn get(&self, name: &str) -> Option<DuplexChannel<P>> {
        self.open_entry(name).map(|entry| entry.channel.clone())
    }

    fn open_entry(&self, name: &str) -> Option<&ScopeChannel<P>> {
        self.channels
            .get(name)
            .filter(|entry| !entry.channel.is_closed())
    }

    /// Writes a control message to the peer of this scope
    pub fn send(&self, message: ControlMessage<P>) {
        let kind = message.kind();
        if self.sender.send(message).is_err() {
            warn!("Cannot send {} message to scope {}", kind, self.key);
        }
    }

    // Local channels

    /// Declares a channel on this side. The channel is usable immediately;
    /// every value published into it is forwarded to the peer as DATA. If the
    /// scope has not completed its handshake yet the name is queued, and the
    /// peer learns about the channel through CREATE once it does.
    pub fn add_channel(&mut self, name: &str, initial: P) -> DuplexChannel<P> {
        let existing = self
            .open_entry(name)
            .map(|entry| (entry.channel.clone(), entry.direction));

        if let Some((channel, direction)) = existing {
            if direction == ChannelDirection::Remote {
                debug!("Channel `{}` in scope {} is now declared locally", name, self.key);
                self.attach_forwarder(&channel);
                if let Some(entry) = self.channels.get_mut(name) {
                    entry.direction = ChannelDirection::Local;
                }
            }
            if !self.initialized {
                self.enqueue(name);
            }
            channel.send(initial);
            return channel;
        }

        let channel = DuplexChannel::new(name, initial.clone(), ChannelDirection::Local);
        self.attach_forwarder(&channel);
        self.insert(name, &channel, ChannelDirection::Local);

        if self.initialized {
            self.send(ControlMessage::data(name, initial));
        } else {
            self.enqueue(name);
        }

        channel
    }

    /// Closes a channel and tells the peer about it. Returns false if no open
    /// channel had that name.
    pub fn close(&mut self, name: &str) -> bool {
        let Some(entry) = self.channels.remove(name) else {
            return false;
        };
        self.pending.retain(|pending| pending != name);
        if entry.channel.is_closed() || !entry.channel.close() {
            return false;
        }
        if self.initialized {
            self.send(ControlMessage::close(name));
        }
        true
    }

    /// Closes every channel of the scope without notifying the peer
    pub fn close_all(&mut self) {
        for (_, entry) in self.channels.drain() {
            if !entry.channel.is_closed() {
                entry.channel.close();
            }
        }
        self.pending.clear();
    }

    // every value published locally is written to the peer as DATA
    fn attach_forwarder(&self, channel: &DuplexChannel<P>) {
        let sender = self.sender.box_clone();
        let name = channel.name().to_string();
        let scope_key = self.key;
        let result = channel.forward(move |value: &P| {
            if sender
                .send(ControlMessage::data(&name, value.clone()))
                .is_err()
            {
                warn!("Cannot forward channel `{}` to scope {}", name, scope_key);
            }
        });
        if let Err(error) = result {
            warn!("{}", error);
        }
    }

    fn insert(
        &mut self,
        name: &str,
        channel: &DuplexChannel<P>,
        direction: ChannelDirection,
    ) {
        let order = self.next_order;
        self.next_order += 1;
        self.channels.insert(
            name.to_string(),
            ScopeChannel {
                channel: channel.clone(),
                direction,
                order,
            },
        );
    }

    fn enqueue(&mut self, name: &str) {
        if self.pending.iter().any(|pending| pending == name) {
            return;
        }
        self.pending.push_back(name.to_string());
    }

    /// Queues every open local channel, in registration order, so the next
    /// handshake resends the full local state
    pub fn requeue_local(&mut self) {
        let mut local: Vec<(u64, String)> = self
            .channels
            .iter()
            .filter(|(_, entry)| {
                entry.direction == ChannelDirection::Local && !entry.channel.is_closed()
            })
            .map(|(name, entry)| (entry.order, name.clone()))
            .collect();
        local.sort();
        for (_, name) in local {
            self.enqueue(&name);
        }
    }

    // Handshake

    /// Closes and removes every channel the peer declared, discarding stale
    /// incoming state from a previous connection. Returns how many were
    /// removed.
    pub fn reset_remote(&mut self) -> usize {
        let stale: Vec<String> = self
            .channels
            .iter()
            .filter(|(_, entry)| {
                entry.direction == ChannelDirection::Remote || entry.channel.is_closed()
            })
            .map(|(name, _)| name.clone())
            .collect();

        let mut removed = 0;
        for name in stale {
            let Some(entry) = self.channels.remove(&name) else {
                continue;
            };
            if entry.direction == ChannelDirection::Remote {
                removed += 1;
            }
            if !entry.channel.is_closed() {
                entry.channel.close();
            }
        }
        removed
    }

    /// Resets the remote channels, marks the scope initialized, optionally
    /// acknowledges with INIT, then announces every queued channel with
    /// CREATE carrying its current local value
    pub fn initialize(&mut self, acknowledge: bool) -> ScopeEvent {
        let removed = self.reset_remote();
        self.initialized = true;
        if acknowledge {
            self.send(ControlMessage::Init);
        }
        let flushed = self.flush_pending();
        debug!(
            "Scope {} initialized: {} stale channels removed, {} channels announced",
            self.key, removed, flushed
        );
        ScopeEvent::Initialized
    }

    fn flush_pending(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let mut flushed = 0;
        for name in pending {
            let Some(entry) = self.open_entry(&name) else {
                continue;
            };
            let Some(value) = entry.channel.local_value() else {
                continue;
            };
            self.send(ControlMessage::create(&name, value));
            flushed += 1;
        }
        flushed
    }

    // Incoming messages

    /// The peer declared a channel
    pub fn receive_create(&mut self, signal: SignalData<P>) -> Option<ScopeEvent> {
        debug!("Scope {} received CREATE for `{}`", self.key, signal.channel);
        self.receive_data(signal)
    }

    /// The peer updated a channel. A channel this side never declared is
    /// created on the fly, seeded with the received value.
    pub fn receive_data(&mut self, signal: SignalData<P>) -> Option<ScopeEvent> {
        let SignalData { channel: name, data } = signal;
        if let Some(entry) = self.open_entry(&name) {
            entry.channel.receive(data);
            return None;
        }

        let channel = DuplexChannel::new(&name, data, ChannelDirection::Remote);
        self.insert(&name, &channel, ChannelDirection::Remote);
        Some(ScopeEvent::ChannelOpened(name))
    }

    /// The peer closed a channel. Unknown names are ignored.
    pub fn receive_close(&mut self, name: &str) -> Option<ScopeEvent> {
        let entry = self.channels.remove(name)?;
        self.pending.retain(|pending| pending != name);
        if entry.channel.is_closed() {
            return None;
        }
        entry.channel.close();
        Some(ScopeEvent::ChannelClosed(name.to_string()))
    }

    /// The peer tore down the scope
    pub fn receive_quit(&mut self) -> ScopeEvent {
        let removed = self.reset_remote();
        self.initialized = false;
        self.requeue_local();
        debug!(
            "Scope {} quit: {} remote channels removed, {} channels queued",
            self.key,
            removed,
            self.pending.len()
        );
        ScopeEvent::Quit
    }

    /// The peer is about to recreate its context and will handshake again
    pub fn receive_reload(&mut self) -> ScopeEvent {
        self.requeue_local();
        ScopeEvent::Reload
    }
}
