//! Time-series playback: a node that replays reference values.

mod source;
mod table;

pub use source::{DATA_PATH_KEY, JsonReferenceFile, ReferenceSource};
pub use table::{TableError, TimeSeriesTable};

use cosim_core::{
    AttributeName, BindingFactory, ConfigError, InitValues, ModelBinding, NodeError, Outputs,
};
use jiff::civil::DateTime;
use log::info;

/// Builds [`PlaybackBinding`]s from an injected [`ReferenceSource`].
#[derive(Debug, Clone, Default)]
pub struct PlaybackFactory<S> {
    source: S,
}

impl<S: ReferenceSource> PlaybackFactory<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: ReferenceSource> BindingFactory for PlaybackFactory<S> {
    type Binding = PlaybackBinding;

    fn build(&self, init: &InitValues) -> Result<Self::Binding, ConfigError> {
        let table = self.source.load(init)?;
        info!(
            "loaded reference table: {} rows, {} columns",
            table.len(),
            table.column_names().count()
        );
        Ok(PlaybackBinding::new(table))
    }
}

/// Binding that answers reads from a reference table.
///
/// Attributes are plain column names. Every attribute is read-only and is
/// looked up at exactly the node's current timestamp. Nothing is recomputed
/// on a step.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackBinding {
    table: TimeSeriesTable,
}

impl PlaybackBinding {
    #[must_use]
    pub fn new(table: TimeSeriesTable) -> Self {
        Self { table }
    }

    #[must_use]
    pub fn table(&self) -> &TimeSeriesTable {
        &self.table
    }
}

impl ModelBinding for PlaybackBinding {
    type Address = String;

    fn kind(&self) -> &'static str {
        "playback"
    }

    fn resolve(&self, name: &AttributeName) -> Result<String, NodeError> {
        match name {
            AttributeName::Simple(column) if self.table.has_column(column) => Ok(column.clone()),
            _ => Err(NodeError::unknown(name)),
        }
    }

    fn write(&mut self, address: &String, _value: f64) -> Result<(), NodeError> {
        Err(NodeError::ReadOnly {
            name: address.clone(),
        })
    }

    fn read(&self, address: &String, now: DateTime) -> Result<f64, NodeError> {
        self.table
            .value_at(address, now)
            .ok_or_else(|| NodeError::MissingReference {
                name: address.clone(),
                timestamp: now.to_string(),
            })
    }

    fn advance(&mut self, _now: DateTime) -> Result<Outputs, NodeError> {
        Ok(Outputs::new())
    }
}
