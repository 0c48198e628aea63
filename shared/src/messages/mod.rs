pub mod control_kind;
pub mod control_message;
