use std::default::Default;

use crate::PeerKey;

/// Contains Config properties which will be used by the Coordinator
#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// The peer whose scope is used when a call does not name one
    /// explicitly. Required: construction fails without it.
    pub default_peer: Option<PeerKey>,
}

impl CoordinatorConfig {
    pub fn new(default_peer: PeerKey) -> Self {
        Self {
            default_peer: Some(default_peer),
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self { default_peer: None }
    }
}
