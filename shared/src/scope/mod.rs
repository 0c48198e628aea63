pub mod scope_event;
pub mod scope_registry;
