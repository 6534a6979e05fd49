mod transport;
mod types;

pub use self::transport::Transport;
