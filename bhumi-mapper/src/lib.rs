//! Bhumi mapper runtime.
//!
//! Wires the `bhumi-grid` engine to its streams: a latest-pose cell fed by
//! the pose stream, a scan channel drained by the mapping thread, and a
//! publisher thread pushing map updates to a [`MapSink`].
//!
//! ```text
//!  poses ──▶ SharedState.latest_pose ─────────┐
//!  scans ──▶ channel ──▶ MappingThread ──▶ Arc<Mutex<MapLayers>> ──▶ PublisherThread ──▶ MapSink
//!                        gate + integrate                             take_update
//! ```

pub mod config;
pub mod error;
pub mod replay;
pub mod shared;
pub mod sink;
pub mod source;
pub mod threads;

pub use config::NodeConfig;
pub use error::{MapperError, Result};
pub use replay::Scenario;
pub use shared::{SharedMap, SharedState};
pub use sink::{LogSink, MapSink};
pub use source::{MapSource, StaticMapSource};
pub use threads::{ThreadHandles, spawn_replay, spawn_threads};
