//! Threaded TCP transport for scenecast frames.
//!
//! [`ConnectionManager`] listens and dials at the same time, keeps any
//! number of connections, and moves length-prefixed frames between sockets
//! and the owning thread. Every socket is served by a reader thread and a
//! writer thread; the owner only sees [`NetEvent`]s.

mod config;
mod connection;
mod error;
mod event;
mod manager;

pub use config::NetConfig;
pub use error::{NetError, NetResult};
pub use event::{ConnectionId, NetEvent};
pub use manager::ConnectionManager;
