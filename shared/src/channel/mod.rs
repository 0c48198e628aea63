pub mod channel_handle;
pub mod channel_receiver;
pub mod duplex_channel;
pub mod value_cell;
