/// PROPERTY-BASED TESTS: Channel synchronization invariants
///
/// Uses proptest to verify synchronization properties hold across random inputs.
///
/// Key invariants:
/// 1. Every channel declared before the handshake is observed by the peer
/// 2. The last value sent is the value the peer ends up holding
/// 3. Values cross the wire codec unchanged
use std::collections::BTreeMap;

use proptest::prelude::*;

use conduit_coordinator::shared::{ChannelRegistry, ControlMessage};
use conduit_shared::wire::{decode, encode};
use conduit_test::{peer_key, TestLink};

fn channel_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

proptest! {
    #[test]
    fn prop_declared_channels_reach_peer(
        channels in prop::collection::btree_map(channel_name_strategy(), any::<u32>(), 1..8),
    ) {
        let one = peer_key(1);
        let mut link = TestLink::<u32>::new(one);
        for (name, value) in channels.iter() {
            link.coordinator.add_channel(name, *value);
        }

        link.connect(one);
        link.pump();

        let peer = link.peer(one);
        for (name, value) in channels.iter() {
            let channel = peer.get::<u32>(name);
            prop_assert!(channel.is_some(), "peer never learned about {}", name);
            prop_assert_eq!(channel.and_then(|channel| channel.remote_value()), Some(*value));
        }
    }

    #[test]
    fn prop_last_write_wins(
        values in prop::collection::vec(any::<u32>(), 1..32),
    ) {
        let one = peer_key(1);
        let mut link = TestLink::<u32>::new(one);
        let counter = link.coordinator.add_channel("counter", 0u32);
        link.connect(one);
        link.pump();

        for value in values.iter() {
            counter.send(*value);
        }
        link.pump();

        let remote = link.peer(one).get::<u32>("counter").and_then(|channel| channel.remote_value());
        prop_assert_eq!(remote, values.last().copied());
    }

    #[test]
    fn prop_latest_values_resent_after_quit(
        updates in prop::collection::vec((0usize..4, any::<u32>()), 0..16),
    ) {
        let one = peer_key(1);
        let mut link = TestLink::<u32>::new(one);
        let names = ["a", "b", "c", "d"];
        let mut expected: BTreeMap<&str, u32> = BTreeMap::new();
        let mut handles = Vec::new();
        for (index, name) in names.iter().enumerate() {
            handles.push(link.coordinator.add_channel(name, index as u32));
            expected.insert(*name, index as u32);
        }
        link.connect(one);
        link.pump();

        for (index, value) in updates.iter() {
            handles[*index].send(*value);
            expected.insert(names[*index], *value);
        }

        link.peer(one).quit();
        link.pump();
        link.crash(one);
        link.connect(one);
        link.pump();

        let peer = link.peer(one);
        for (name, value) in expected.iter() {
            let remote = peer.get::<u32>(name).and_then(|channel| channel.remote_value());
            prop_assert_eq!(remote, Some(*value));
        }
    }

    #[test]
    fn prop_data_survives_codec(
        name in channel_name_strategy(),
        value in ".{0,64}",
    ) {
        let message = ControlMessage::data(&name, value);
        let bytes = encode(&message).expect("small messages fit in one buffer");
        let decoded: ControlMessage<String> = decode(&bytes).expect("encoded messages decode");
        prop_assert_eq!(decoded, message);
    }
}
