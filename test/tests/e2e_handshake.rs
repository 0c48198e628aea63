//! Handshake, crash recovery and reload over the in-memory transport.

use std::time::Duration;

use conduit_coordinator::shared::{ChannelRegistry, ControlMessage, ScopeEvent};
use conduit_peer::{HandshakeError, HandshakeState, PeerConfig, PeerError};
use conduit_test::{peer_key, TestLink};

fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

// ========== Handshake Bound Tests ==========

#[test]
fn unacknowledged_peer_sends_exactly_four_inits() {
    init_logging();
    let one = peer_key(1);
    let mut link = TestLink::<u32>::with_peer_config(
        one,
        PeerConfig {
            handshake_resend_interval: Duration::ZERO,
            handshake_max_retries: 3,
        },
    );
    // the coordinator never hears from this peer
    link.transport.sever(one);
    link.connect(one);

    let mut error = None;
    for _ in 0..10 {
        if let Err(failure) = link.poll_peer(one) {
            error = Some(failure);
            break;
        }
    }

    assert_eq!(
        error,
        Some(PeerError::Handshake(HandshakeError::Timeout { attempts: 4 }))
    );
    assert_eq!(link.peer(one).handshake_state(), HandshakeState::Failed);

    // restoring the link changes nothing: the peer stays terminated
    link.transport.restore(one);
    for _ in 0..5 {
        assert!(link.poll_peer(one).is_err());
    }
    link.coordinator.receive();
    assert!(!link.coordinator.is_initialized(&one));
    assert!(link.transport.take_sent_by(one).is_empty());
}

#[test]
fn late_acknowledgement_within_bound_succeeds() {
    init_logging();
    let one = peer_key(1);
    let mut link = TestLink::<u32>::with_peer_config(
        one,
        PeerConfig {
            handshake_resend_interval: Duration::ZERO,
            handshake_max_retries: 3,
        },
    );
    link.transport.sever(one);
    link.connect(one);
    link.poll_peer(one).expect("first retry");
    link.poll_peer(one).expect("second retry");

    link.transport.restore(one);
    link.poll_peer(one).expect("third retry reaches the coordinator");
    link.pump();

    assert!(link.peer(one).is_initialized());
    assert_eq!(link.peer(one).handshake_state(), HandshakeState::Complete);
    assert!(link.coordinator.is_initialized(&one));
}

// ========== Crash Recovery Tests ==========

#[test]
fn quit_then_new_handshake_resends_everything() {
    init_logging();
    let one = peer_key(1);
    let mut link = TestLink::<u32>::new(one);
    link.coordinator.add_channel("a", 1u32);
    link.coordinator.add_channel("b", 2u32);
    link.connect(one);
    link.pump();
    assert!(link.peer(one).get::<u32>("a").is_some());

    // the peer's context goes away after announcing it
    link.peer(one).quit();
    link.pump();
    link.crash(one);
    assert!(!link.coordinator.is_initialized(&one));

    link.connect(one);
    link.pump();

    let peer = link.peer(one);
    let a = peer.get::<u32>("a").expect("a is resent");
    let b = peer.get::<u32>("b").expect("b is resent");
    assert_eq!(a.remote_value(), Some(1));
    assert_eq!(b.remote_value(), Some(2));
}

#[test]
fn resync_carries_values_sent_before_the_crash() {
    init_logging();
    let one = peer_key(1);
    let mut link = TestLink::<u32>::new(one);
    let a = link.coordinator.add_channel("a", 1u32);
    link.connect(one);
    link.pump();
    a.send(10);
    link.pump();

    link.peer(one).quit();
    link.pump();
    link.crash(one);
    link.connect(one);
    link.pump();

    let resent = link.peer(one).get::<u32>("a").expect("a is resent");
    assert_eq!(resent.remote_value(), Some(10));
}

#[test]
fn coordinator_disconnect_and_peer_reconnect() {
    init_logging();
    let one = peer_key(1);
    let mut link = TestLink::<u32>::new(one);
    link.coordinator.add_channel("a", 1u32);
    let volume = link.connect(one).add_channel("volume", 5u32);
    link.pump();

    link.coordinator.disconnect(&one);
    let (_, peer_events) = link.pump();
    assert!(peer_events[&one].contains(&ScopeEvent::Quit));
    assert!(!link.peer(one).is_initialized());
    assert!(link.peer(one).get::<u32>("a").is_none());
    assert!(link.coordinator.get::<u32>("volume").is_none());

    volume.send(6);
    link.peer(one).reconnect().expect("peer is not terminated");
    link.pump();

    assert!(link.peer(one).is_initialized());
    let a = link.peer(one).get::<u32>("a").expect("a is resent");
    assert_eq!(a.remote_value(), Some(1));
    let remote_volume = link
        .coordinator
        .get::<u32>("volume")
        .expect("volume is resent");
    assert_eq!(remote_volume.remote_value(), Some(6));
}

// ========== Reload Tests ==========

#[test]
fn reload_keeps_remote_values_and_primes_resend() {
    init_logging();
    let one = peer_key(1);
    let mut link = TestLink::<u32>::new(one);
    link.coordinator.add_channel("a", 1u32);
    link.connect(one).add_channel("volume", 5u32);
    link.pump();
    link.transport.take_sent_to(one);

    link.peer(one).reload();
    let (coordinator_events, _) = link.pump();
    assert!(coordinator_events.contains(&(one, ScopeEvent::Reload)));

    let volume = link
        .coordinator
        .get::<u32>("volume")
        .expect("reload keeps remote channels");
    assert_eq!(volume.remote_value(), Some(5));
    assert!(link.transport.take_sent_to(one).is_empty());

    // the recreated context handshakes again
    link.crash(one);
    link.connect(one);
    link.pump();

    assert_eq!(
        link.transport.take_sent_to(one),
        vec![ControlMessage::Init, ControlMessage::create("a", 1)]
    );
}
