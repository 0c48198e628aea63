/// In-memory transport for E2E testing
/// Routes encoded control messages between a coordinator and any number of
/// peers without I/O. Every message goes through the wire codec, so tests
/// exercise the same bytes a real transport would carry.
use std::{
    collections::{HashMap, HashSet, VecDeque},
    marker::PhantomData,
    sync::{Arc, Mutex},
};

use log::warn;
use naia_serde::Serde;

use conduit_coordinator::{
    transport::{
        MessageReceiver as CoordinatorMessageReceiver, MessageSender as CoordinatorMessageSender,
    },
    PeerKey,
};
use conduit_peer::transport::{
    MessageReceiver as PeerMessageReceiver, MessageSender as PeerMessageSender,
};
use conduit_shared::{
    wire::{decode, encode},
    ControlMessage, RecvError, SendError,
};

#[derive(Default)]
struct Hub {
    // peer -> coordinator
    to_coordinator: VecDeque<(PeerKey, Vec<u8>)>,
    // coordinator -> peer
    to_peers: HashMap<PeerKey, VecDeque<Vec<u8>>>,
    // links that silently drop everything, in both directions
    severed: HashSet<PeerKey>,
    // every message the coordinator sent, per peer, in order
    coordinator_log: HashMap<PeerKey, Vec<Vec<u8>>>,
    // every message a peer sent, in order
    peer_log: HashMap<PeerKey, Vec<Vec<u8>>>,
}

/// One coordinator endpoint plus a factory for peer endpoints, all sharing
/// the same in-memory queues
pub struct LocalTransport<P> {
    hub: Arc<Mutex<Hub>>,
    phantom: PhantomData<fn() -> P>,
}

impl<P> Clone for LocalTransport<P> {
    fn clone(&self) -> Self {
        Self {
            hub: self.hub.clone(),
            phantom: PhantomData,
        }
    }
}

impl<P: Serde + Clone + Send + Sync + 'static> LocalTransport<P> {
    pub fn new() -> Self {
        Self {
            hub: Arc::new(Mutex::new(Hub::default())),
            phantom: PhantomData,
        }
    }

    /// Sender and receiver for the coordinator end
    pub fn coordinator_endpoint(
        &self,
    ) -> (
        Box<dyn CoordinatorMessageSender<P>>,
        Box<dyn CoordinatorMessageReceiver<P>>,
    ) {
        (
            Box::new(LocalCoordinatorSender {
                hub: self.hub.clone(),
                phantom: PhantomData,
            }),
            Box::new(LocalCoordinatorReceiver {
                hub: self.hub.clone(),
                phantom: PhantomData,
            }),
        )
    }

    /// Sender and receiver for a peer end identified by `peer`
    pub fn peer_endpoint(
        &self,
        peer: PeerKey,
    ) -> (Box<dyn PeerMessageSender<P>>, Box<dyn PeerMessageReceiver<P>>) {
        self.lock().to_peers.entry(peer).or_default();
        (
            Box::new(LocalPeerSender {
                hub: self.hub.clone(),
                peer,
                phantom: PhantomData,
            }),
            Box::new(LocalPeerReceiver {
                hub: self.hub.clone(),
                peer,
                phantom: PhantomData,
            }),
        )
    }

    /// Drops every message to or from `peer` until the link is restored.
    /// Messages already queued are discarded.
    pub fn sever(&self, peer: PeerKey) {
        let mut hub = self.lock();
        hub.severed.insert(peer);
        hub.to_coordinator.retain(|(key, _)| *key != peer);
        if let Some(queue) = hub.to_peers.get_mut(&peer) {
            queue.clear();
        }
    }

    pub fn restore(&self, peer: PeerKey) {
        self.lock().severed.remove(&peer);
    }

    /// Returns true if no message is waiting in any queue
    pub fn is_idle(&self) -> bool {
        let hub = self.lock();
        hub.to_coordinator.is_empty() && hub.to_peers.values().all(VecDeque::is_empty)
    }

    /// Every message the coordinator sent to `peer`, decoded, and clears the log
    pub fn take_sent_to(&self, peer: PeerKey) -> Vec<ControlMessage<P>> {
        let bytes = self
            .lock()
            .coordinator_log
            .remove(&peer)
            .unwrap_or_default();
        decode_all(bytes)
    }

    /// Every message `peer` sent, decoded, and clears the log
    pub fn take_sent_by(&self, peer: PeerKey) -> Vec<ControlMessage<P>> {
        let bytes = self.lock().peer_log.remove(&peer).unwrap_or_default();
        decode_all(bytes)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Hub> {
        lock_hub(&self.hub)
    }
}

impl<P: Serde + Clone + Send + Sync + 'static> Default for LocalTransport<P> {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_all<P: Serde>(packets: Vec<Vec<u8>>) -> Vec<ControlMessage<P>> {
    packets
        .iter()
        .filter_map(|bytes| decode(bytes).ok())
        .collect()
}

// a panicking test thread is the only way to poison the hub
fn lock_hub(hub: &Arc<Mutex<Hub>>) -> std::sync::MutexGuard<'_, Hub> {
    hub.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// Coordinator Components

struct LocalCoordinatorSender<P> {
    hub: Arc<Mutex<Hub>>,
    phantom: PhantomData<fn() -> P>,
}

impl<P: Serde + Clone + Send + Sync + 'static> CoordinatorMessageSender<P> for LocalCoordinatorSender<P> {
    fn send(&self, peer: &PeerKey, message: ControlMessage<P>) -> Result<(), SendError> {
        let bytes = encode(&message).map_err(|error| {
            warn!("{}", error);
            SendError
        })?;

        let mut hub = lock_hub(&self.hub);
        if hub.severed.contains(peer) {
            return Ok(());
        }
        hub.coordinator_log
            .entry(*peer)
            .or_default()
            .push(bytes.clone());
        hub.to_peers.entry(*peer).or_default().push_back(bytes);
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn CoordinatorMessageSender<P>> {
        Box::new(LocalCoordinatorSender {
            hub: self.hub.clone(),
            phantom: PhantomData,
        })
    }
}

struct LocalCoordinatorReceiver<P> {
    hub: Arc<Mutex<Hub>>,
    phantom: PhantomData<fn() -> P>,
}

impl<P: Serde + Clone + Send + Sync + 'static> CoordinatorMessageReceiver<P>
    for LocalCoordinatorReceiver<P>
{
    fn receive(&mut self) -> Result<Option<(PeerKey, ControlMessage<P>)>, RecvError> {
        loop {
            let Some((peer, bytes)) = lock_hub(&self.hub).to_coordinator.pop_front() else {
                return Ok(None);
            };
            match decode(&bytes) {
                Ok(message) => return Ok(Some((peer, message))),
                Err(error) => warn!("{}", error),
            }
        }
    }
}

// Peer Components

struct LocalPeerSender<P> {
    hub: Arc<Mutex<Hub>>,
    peer: PeerKey,
    phantom: PhantomData<fn() -> P>,
}

impl<P: Serde + Clone + Send + Sync + 'static> PeerMessageSender<P> for LocalPeerSender<P> {
    fn send(&self, message: ControlMessage<P>) -> Result<(), SendError> {
        let bytes = encode(&message).map_err(|error| {
            warn!("{}", error);
            SendError
        })?;

        let mut hub = lock_hub(&self.hub);
        if hub.severed.contains(&self.peer) {
            return Ok(());
        }
        hub.peer_log
            .entry(self.peer)
            .or_default()
            .push(bytes.clone());
        hub.to_coordinator.push_back((self.peer, bytes));
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn PeerMessageSender<P>> {
        Box::new(LocalPeerSender {
            hub: self.hub.clone(),
            peer: self.peer,
            phantom: PhantomData,
        })
    }
}

struct LocalPeerReceiver<P> {
    hub: Arc<Mutex<Hub>>,
    peer: PeerKey,
    phantom: PhantomData<fn() -> P>,
}

impl<P: Serde + Clone + Send + Sync + 'static> PeerMessageReceiver<P> for LocalPeerReceiver<P> {
    fn receive(&mut self) -> Result<Option<ControlMessage<P>>, RecvError> {
        loop {
            let next = lock_hub(&self.hub)
                .to_peers
                .get_mut(&self.peer)
                .and_then(VecDeque::pop_front);
            let Some(bytes) = next else {
                return Ok(None);
            };
            match decode(&bytes) {
                Ok(message) => return Ok(Some(message)),
                Err(error) => warn!("{}", error),
            }
        }
    }
}
