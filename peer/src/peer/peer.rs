use log::{debug, error, info, warn};

use conduit_shared::{
    ChannelHandle, ChannelRegistry, ControlMessage, LinkGate, Payload, ScopeRegistry,
    PEER_SCOPE_KEY,
};

use crate::{
    handshake::{HandshakeAction, HandshakeState, HandshakeSupervisor},
    transport::{MessageReceiver, MessageSender},
    ExposedPeer, HandshakeError, PeerConfig, PeerError, PeerEvents,
};

/// The dependent end of a conduit link. Owns exactly one channel scope and
/// handshakes with the Coordinator on construction, resending INIT on a
/// fixed interval until it is acknowledged. If the retry bound is exceeded
/// the Peer's channel subsystem is terminated: nothing more is sent, and
/// `receive` keeps returning the handshake error.
pub struct Peer<P: Payload> {
    receiver: Box<dyn MessageReceiver<P>>,
    scope: ScopeRegistry<P>,
    gate: LinkGate,
    supervisor: HandshakeSupervisor,
    failure: Option<HandshakeError>,
    incoming_events: PeerEvents,
}

impl<P: Payload> Peer<P> {
    /// Create a new Peer and send the first INIT
    pub fn new(
        config: PeerConfig,
        sender: Box<dyn MessageSender<P>>,
        receiver: Box<dyn MessageReceiver<P>>,
    ) -> Self {
        let gate = LinkGate::new();
        let scope = ScopeRegistry::new(PEER_SCOPE_KEY, gate.guard(sender));

        let mut peer = Self {
            receiver,
            scope,
            gate,
            supervisor: HandshakeSupervisor::new(
                config.handshake_resend_interval,
                config.handshake_max_retries,
            ),
            failure: None,
            incoming_events: PeerEvents::new(),
        };
        peer.start_handshake();
        peer
    }

    /// Must be called regularly, processes every control message waiting in
    /// the transport, then advances the handshake supervisor
    pub fn receive(&mut self) -> Result<PeerEvents, PeerError> {
        if let Some(error) = &self.failure {
            return Err(error.clone().into());
        }

        loop {
            match self.receiver.receive() {
                Ok(Some(message)) => {
                    self.process_message(message);
                }
                Ok(None) => break,
                Err(_) => {
                    warn!("Peer Error: Cannot receive control messages");
                    break;
                }
            }
        }

        self.supervise()?;

        Ok(std::mem::take(&mut self.incoming_events))
    }

    /// Processes a single control message from the Coordinator
    pub fn process_message(&mut self, message: ControlMessage<P>) {
        if self.failure.is_some() {
            debug!("Peer terminated, dropping {} message", message.kind());
            return;
        }
        debug!("Peer received {}", message.kind());

        let event = match message {
            ControlMessage::Init => {
                if self.scope.is_initialized() {
                    debug!("Ignoring duplicate INIT acknowledgement");
                    None
                } else {
                    info!("Handshake with coordinator complete");
                    Some(self.scope.initialize(false))
                }
            }
            ControlMessage::Create(signal) => self.scope.receive_create(signal),
            ControlMessage::Data(signal) => self.scope.receive_data(signal),
            ControlMessage::Close { channel } => self.scope.receive_close(&channel),
            ControlMessage::Quit => {
                info!("Coordinator quit");
                Some(self.scope.receive_quit())
            }
            ControlMessage::Reload => {
                warn!("Peer received RELOAD, which only a coordinator handles");
                None
            }
        };

        if let Some(event) = event {
            self.incoming_events.push(event);
        }
    }

    // Handshake

    fn start_handshake(&mut self) {
        if let HandshakeAction::SendInit = self.supervisor.start() {
            self.scope.send(ControlMessage::Init);
        }
    }

    fn supervise(&mut self) -> Result<(), HandshakeError> {
        match self.supervisor.tick(self.scope.is_initialized()) {
            HandshakeAction::None => Ok(()),
            HandshakeAction::Complete => {
                debug!(
                    "Handshake acknowledged after {} attempts",
                    self.supervisor.attempts()
                );
                Ok(())
            }
            HandshakeAction::SendInit => {
                info!(
                    "No response from coordinator, reconnecting. Attempt: {}",
                    self.supervisor.attempts()
                );
                self.scope.send(ControlMessage::Init);
                Ok(())
            }
            HandshakeAction::Fail(error) => {
                self.terminate(&error);
                Err(error)
            }
        }
    }

    fn terminate(&mut self, error: &HandshakeError) {
        error!("{}", error);
        self.gate.sever();
        self.failure = Some(error.clone());
    }

    pub fn is_initialized(&self) -> bool {
        self.scope.is_initialized()
    }

    /// Returns true once the handshake has failed for good
    pub fn is_terminated(&self) -> bool {
        self.failure.is_some()
    }

    pub fn handshake_state(&self) -> HandshakeState {
        self.supervisor.state()
    }

    /// Starts a new handshake after the Coordinator quit. Does nothing while
    /// initialized; fails if the Peer was terminated.
    pub fn reconnect(&mut self) -> Result<(), PeerError> {
        if let Some(error) = &self.failure {
            return Err(error.clone().into());
        }
        if self.scope.is_initialized() {
            debug!("Peer already initialized, not reconnecting");
            return Ok(());
        }
        self.start_handshake();
        Ok(())
    }

    /// Tells the Coordinator this context is about to be recreated. It keeps
    /// what it holds for this Peer and resends everything on the next
    /// handshake.
    pub fn reload(&mut self) {
        info!("Peer reloading");
        self.scope.send(ControlMessage::Reload);
    }

    /// Tells the Coordinator this Peer is going away, and resets the scope
    /// the same way receiving QUIT would
    pub fn quit(&mut self) {
        info!("Peer quitting");
        self.scope.send(ControlMessage::Quit);
        self.scope.receive_quit();
    }

    /// The Peer's one and only scope
    pub fn scope(&self) -> &ScopeRegistry<P> {
        &self.scope
    }

    /// Returns the restricted surface to hand to sandboxed contexts
    pub fn as_exposed(&mut self) -> ExposedPeer<'_, P> {
        ExposedPeer::new(self)
    }
}

impl<P: Payload> ChannelRegistry<P> for Peer<P> {
    fn add_channel<T: Into<P>>(&mut self, name: &str, initial: T) -> ChannelHandle<T, P> {
        ChannelHandle::new(self.scope.add_channel(name, initial.into()))
    }

    fn get<T>(&self, name: &str) -> Option<ChannelHandle<T, P>> {
        self.scope.get(name).map(ChannelHandle::new)
    }

    fn close(&mut self, name: &str) -> bool {
        self.scope.close(name)
    }
}
