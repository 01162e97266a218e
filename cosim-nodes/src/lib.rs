//! Reference nodes for the co-simulation adapter.
//!
//! - [`playback`]: replays a reference [`TimeSeriesTable`] at the node's
//!   current timestamp.
//! - [`gas_grid`]: owns a gas network, accepts load and feeder set points,
//!   and publishes a fresh steady-state solution on every step.

pub mod gas_grid;
pub mod playback;

pub use gas_grid::{
    GasAddress, GasField, GasGridBinding, GasGridFactory, InMemoryTopology, JsonDirectoryStore,
    TopologyStore,
};
pub use playback::{
    JsonReferenceFile, PlaybackBinding, PlaybackFactory, ReferenceSource, TableError,
    TimeSeriesTable,
};
