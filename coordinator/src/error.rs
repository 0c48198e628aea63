use thiserror::Error;

/// Errors raised while constructing a Coordinator from its configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No default peer was supplied
    #[error("Coordinator requires a default peer handle. Set `CoordinatorConfig::default_peer` to the connection the Coordinator starts with")]
    MissingPeerHandle,
}

/// General Coordinator errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}
