use std::collections::HashMap;

use log::{debug, info, warn};

use conduit_shared::{ChannelHandle, ChannelRegistry, ControlMessage, Payload, ScopeRegistry};

use crate::{
    transport::{MessageReceiver, MessageSender, ScopeSender},
    ConfigurationError, CoordinatorConfig, CoordinatorError, CoordinatorEvents, PeerKey,
};

/// The coordinating end of a conduit link. Keeps one isolated channel scope
/// per connected peer, answers each peer's handshake, and routes every
/// incoming control message to the scope of the peer that sent it.
pub struct Coordinator<P: Payload> {
    default_peer: PeerKey,
    // Transport
    sender: Box<dyn MessageSender<P>>,
    receiver: Box<dyn MessageReceiver<P>>,
    // Scopes
    scopes: HashMap<PeerKey, ScopeRegistry<P>>,
    // Events
    incoming_events: CoordinatorEvents,
}

impl<P: Payload> Coordinator<P> {
    /// Create a new Coordinator. Fails if the configuration names no default
    /// peer.
    pub fn new(
        config: CoordinatorConfig,
        sender: Box<dyn MessageSender<P>>,
        receiver: Box<dyn MessageReceiver<P>>,
    ) -> Result<Self, CoordinatorError> {
        let Some(default_peer) = config.default_peer else {
            return Err(ConfigurationError::MissingPeerHandle.into());
        };

        info!("Coordinator started, default peer {}", default_peer);

        Ok(Self {
            default_peer,
            sender,
            receiver,
            scopes: HashMap::new(),
            incoming_events: CoordinatorEvents::new(),
        })
    }

    pub fn default_peer(&self) -> PeerKey {
        self.default_peer
    }

    /// Changes which peer's scope is used when a call does not name one
    pub fn set_default_peer(&mut self, peer: PeerKey) {
        self.default_peer = peer;
    }

    /// Must be called regularly, processes every control message waiting in
    /// the transport and returns the resulting scope events
    pub fn receive(&mut self) -> CoordinatorEvents {
        loop {
            match self.receiver.receive() {
                Ok(Some((peer, message))) => {
                    self.process_message(&peer, message);
                }
                Ok(None) => break,
                Err(_) => {
                    warn!("Coordinator Error: Cannot receive control messages");
                    break;
                }
            }
        }

        std::mem::take(&mut self.incoming_events)
    }

    /// Processes a single control message from `peer`, synchronously and to
    /// completion. Only that peer's scope is read or written.
    pub fn process_message(&mut self, peer: &PeerKey, message: ControlMessage<P>) {
        debug!("Coordinator received {} from peer {}", message.kind(), peer);

        let scope = self.scope_mut(peer);
        let event = match message {
            ControlMessage::Init => {
                info!("Peer {} started handshake", peer);
                Some(scope.initialize(true))
            }
            ControlMessage::Create(signal) => scope.receive_create(signal),
            ControlMessage::Data(signal) => scope.receive_data(signal),
            ControlMessage::Close { channel } => scope.receive_close(&channel),
            ControlMessage::Quit => {
                info!("Peer {} quit", peer);
                Some(scope.receive_quit())
            }
            ControlMessage::Reload => {
                info!("Peer {} is reloading", peer);
                Some(scope.receive_reload())
            }
        };

        if let Some(event) = event {
            self.incoming_events.push(*peer, event);
        }
    }

    // Scopes

    fn scope_mut(&mut self, peer: &PeerKey) -> &mut ScopeRegistry<P> {
        let sender = &self.sender;
        self.scopes.entry(*peer).or_insert_with(|| {
            debug!("Creating scope for peer {}", peer);
            ScopeRegistry::new(
                peer.scope_key(),
                Box::new(ScopeSender::new(*peer, sender.box_clone())),
            )
        })
    }

    /// The scope of a peer, if any traffic from or to it has happened
    pub fn scope(&self, peer: &PeerKey) -> Option<&ScopeRegistry<P>> {
        self.scopes.get(peer)
    }

    pub fn scope_keys(&self) -> impl Iterator<Item = &PeerKey> {
        self.scopes.keys()
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Returns true if the peer's handshake has completed
    pub fn is_initialized(&self, peer: &PeerKey) -> bool {
        self.scopes
            .get(peer)
            .map(ScopeRegistry::is_initialized)
            .unwrap_or(false)
    }

    /// Names of the open channels in a peer's scope, sorted
    pub fn channels_for(&self, peer: &PeerKey) -> Vec<String> {
        let Some(scope) = self.scopes.get(peer) else {
            return Vec::new();
        };
        let mut names: Vec<String> = scope.channel_names().map(str::to_string).collect();
        names.sort();
        names
    }

    // Channels

    /// Declares a channel in a peer's scope
    pub fn add_channel_for<T: Into<P>>(
        &mut self,
        peer: &PeerKey,
        name: &str,
        initial: T,
    ) -> ChannelHandle<T, P> {
        let channel = self.scope_mut(peer).add_channel(name, initial.into());
        ChannelHandle::new(channel)
    }

    /// Returns a channel of a peer's scope
    pub fn get_for<T>(&self, peer: &PeerKey, name: &str) -> Option<ChannelHandle<T, P>> {
        self.scopes
            .get(peer)?
            .get(name)
            .map(ChannelHandle::new)
    }

    /// Closes a channel of a peer's scope and notifies the peer
    pub fn close_for(&mut self, peer: &PeerKey, name: &str) -> bool {
        let Some(scope) = self.scopes.get_mut(peer) else {
            return false;
        };
        scope.close(name)
    }

    /// Tells a peer its scope is being torn down. The scope is reset exactly
    /// as if the peer had quit, so its next handshake resends every local
    /// channel.
    pub fn disconnect(&mut self, peer: &PeerKey) {
        let Some(scope) = self.scopes.get_mut(peer) else {
            warn!("Cannot disconnect unknown peer {}", peer);
            return;
        };
        info!("Disconnecting peer {}", peer);
        scope.send(ControlMessage::Quit);
        scope.receive_quit();
    }
}

impl<P: Payload> ChannelRegistry<P> for Coordinator<P> {
    fn add_channel<T: Into<P>>(&mut self, name: &str, initial: T) -> ChannelHandle<T, P> {
        let peer = self.default_peer;
        self.add_channel_for(&peer, name, initial)
    }

    fn get<T>(&self, name: &str) -> Option<ChannelHandle<T, P>> {
        self.get_for(&self.default_peer, name)
    }

    fn close(&mut self, name: &str) -> bool {
        let peer = self.default_peer;
        self.close_for(&peer, name)
    }
}
