use std::collections::BTreeMap;

use cosim_core::ConfigError;
use jiff::civil::DateTime;
use serde::Deserialize;
use thiserror::Error;

/// Threshold below which [`TimeSeriesTable::position`] uses linear search.
///
/// For tables with fewer than this many rows, a linear scan is used.
/// Otherwise, binary search is performed on the sorted index.
const LINEAR_SEARCH_THRESHOLD: usize = 32;

/// Reference values indexed by timestamp, one column per attribute.
///
/// The index is strictly increasing and every column holds one finite value
/// per index entry. Lookups match timestamps exactly; there is no
/// interpolation between rows.
///
/// # Examples
///
/// ```
/// use cosim_nodes::TimeSeriesTable;
/// use jiff::civil::date;
///
/// let t0 = date(2019, 1, 1).at(0, 0, 0, 0);
/// let t1 = date(2019, 1, 1).at(0, 1, 0, 0);
/// let table = TimeSeriesTable::new(
///     vec![t0, t1],
///     [("heat_demand".to_owned(), vec![42.0, 43.5])].into_iter().collect(),
/// )
/// .unwrap();
///
/// assert_eq!(table.value_at("heat_demand", t1), Some(43.5));
/// assert_eq!(table.value_at("heat_demand", date(2019, 1, 1).at(0, 0, 30, 0)), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeriesTable {
    index: Vec<DateTime>,
    columns: BTreeMap<String, Vec<f64>>,
}

/// Error returned when table data violates the table's invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// `row` is the first row whose timestamp does not follow the one before it.
    #[error("index is not strictly increasing at row {row}")]
    UnorderedIndex { row: usize },

    #[error("column `{column}` has {len} values but the index has {expected}")]
    LengthMismatch {
        column: String,
        len: usize,
        expected: usize,
    },

    #[error("column `{column}` has non-finite value {value} at row {row}")]
    NonFinite {
        column: String,
        row: usize,
        value: f64,
    },
}

/// The JSON "split" layout: `{ "index": [...], "columns": { name: [...] } }`.
#[derive(Debug, Deserialize)]
struct SplitRecord {
    index: Vec<DateTime>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl TimeSeriesTable {
    /// Creates a table from its index and columns.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] if the index is not strictly increasing, a
    /// column length differs from the index length, or a value is not finite.
    pub fn new(
        index: Vec<DateTime>,
        columns: BTreeMap<String, Vec<f64>>,
    ) -> Result<Self, TableError> {
        if let Some(row) = index.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(TableError::UnorderedIndex { row: row + 1 });
        }

        for (column, values) in &columns {
            if values.len() != index.len() {
                return Err(TableError::LengthMismatch {
                    column: column.clone(),
                    len: values.len(),
                    expected: index.len(),
                });
            }
            if let Some(row) = values.iter().position(|value| !value.is_finite()) {
                return Err(TableError::NonFinite {
                    column: column.clone(),
                    row,
                    value: values[row],
                });
            }
        }

        Ok(Self { index, columns })
    }

    /// Parses a table from its JSON split layout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not a valid split table.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let record: SplitRecord =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        Self::new(record.index, record.columns).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// The timestamps of the table's rows, in increasing order.
    #[must_use]
    pub fn index(&self) -> &[DateTime] {
        &self.index
    }

    /// Column names, in sorted order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the row whose timestamp equals `timestamp`, if any.
    #[must_use]
    pub fn position(&self, timestamp: DateTime) -> Option<usize> {
        if self.index.len() < LINEAR_SEARCH_THRESHOLD {
            self.index.iter().position(|&t| t == timestamp)
        } else {
            self.index.binary_search(&timestamp).ok()
        }
    }

    /// Returns the value of `column` at exactly `timestamp`.
    ///
    /// Returns `None` if the column is unknown or no row has that timestamp.
    #[must_use]
    pub fn value_at(&self, column: &str, timestamp: DateTime) -> Option<f64> {
        let values = self.columns.get(column)?;
        self.position(timestamp).map(|row| values[row])
    }
}
