pub mod client;
pub mod error;
pub mod listener;
pub mod probe;
pub mod server;
pub mod trace;
