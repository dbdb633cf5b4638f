//! Scene synchronization between a host and its observers.
//!
//! The host side walks a [`SceneProvider`] every tick, tracks each
//! component with a [`Broadcaster`] and sends each connection its messages,
//! split into frames at message boundaries: complete snapshots for connections on their first tick, deltas after
//! that, tombstones for vanished entities. The observer side applies frames
//! to a [`MirrorScene`], optionally interpolating the newest one.
//!
//! Both managers are driven from a single owning thread; network I/O stays
//! behind the [`SyncTransport`] seam.
//!
//! # Design Principles
//!
//! - **Dependency order** - Services run in [`schema::ComponentKind::ALL`] order, so
//!   transforms exist before the skinned meshes that reference them.
//! - **Retry, don't block** - A component whose references are not broadcast yet
//!   is skipped and re-evaluated next tick.
//! - **Fail the connection, not the process** - Malformed input drops the
//!   offending connection and nothing else.

mod broadcaster;
mod config;
mod dispatcher;
mod error;
mod host;
mod mapping;
mod mirror;
mod observer;
mod provider;
mod service;
mod transport;

pub use broadcaster::{Broadcaster, BroadcasterState, ConnectionOutputs};
pub use config::SyncConfig;
pub use dispatcher::{DispatcherHandle, MainThreadDispatcher};
pub use error::{SyncError, SyncResult};
pub use host::{HostSyncManager, HostTick};
pub use mapping::EntityMap;
pub use mirror::{MirrorEntity, MirrorListener, MirrorScene};
pub use observer::{apply_frame, ObserverSyncManager, ObserverTick};
pub use provider::{MemoryScene, SceneProvider, SourceId, SourceNode};
pub use service::{ComponentService, ServiceRegistry, ServiceTick, TickContext};
pub use transport::SyncTransport;
