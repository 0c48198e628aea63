mod coordinator;
pub use coordinator::Coordinator;

mod coordinator_config;
pub use coordinator_config::CoordinatorConfig;
