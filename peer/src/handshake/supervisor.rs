use std::time::Duration;

use conduit_shared::Timer;

use crate::HandshakeError;

/// Where the Peer stands in its handshake with the Coordinator
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HandshakeState {
    /// No handshake has been started
    Idle,
    /// INIT was sent, waiting for the acknowledgement
    AwaitingAck,
    /// The Coordinator acknowledged; the retry timer is cancelled
    Complete,
    /// The retry bound was exceeded; the channel subsystem is terminated
    Failed,
}

pub(crate) enum HandshakeAction {
    None,
    SendInit,
    Complete,
    Fail(HandshakeError),
}

// Resends INIT on a fixed interval until the Coordinator acknowledges it.
// Polled: the timer only advances when `tick` is called.
pub(crate) struct HandshakeSupervisor {
    timer: Timer,
    max_retries: u8,
    retries: u8,
    state: HandshakeState,
}

impl HandshakeSupervisor {
    pub(crate) fn new(resend_interval: Duration, max_retries: u8) -> Self {
        Self {
            timer: Timer::new(resend_interval),
            max_retries,
            retries: 0,
            state: HandshakeState::Idle,
        }
    }

    pub(crate) fn state(&self) -> HandshakeState {
        self.state
    }

    /// INIT messages sent since the handshake was last started
    pub(crate) fn attempts(&self) -> u8 {
        match self.state {
            HandshakeState::Idle => 0,
            _ => self.retries + 1,
        }
    }

    /// Starts a fresh handshake; the caller sends the first INIT
    pub(crate) fn start(&mut self) -> HandshakeAction {
        self.retries = 0;
        self.state = HandshakeState::AwaitingAck;
        self.timer.reset();
        HandshakeAction::SendInit
    }

    pub(crate) fn tick(&mut self, initialized: bool) -> HandshakeAction {
        if self.state != HandshakeState::AwaitingAck {
            return HandshakeAction::None;
        }

        if initialized {
            self.state = HandshakeState::Complete;
            return HandshakeAction::Complete;
        }

        if !self.timer.ringing() {
            return HandshakeAction::None;
        }
        self.timer.reset();

        if self.retries >= self.max_retries {
            self.state = HandshakeState::Failed;
            return HandshakeAction::Fail(HandshakeError::Timeout {
                attempts: self.attempts(),
            });
        }

        self.retries += 1;
        HandshakeAction::SendInit
    }
}
