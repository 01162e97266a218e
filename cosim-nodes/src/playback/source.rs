use std::fs;

use cosim_core::{ConfigError, InitValues};

use super::table::TimeSeriesTable;

/// Parameter naming the reference data file.
pub const DATA_PATH_KEY: &str = "data_path";

/// Supplies the reference table a playback node replays.
///
/// Sources are injected into [`PlaybackFactory`] so nodes never read fixed
/// paths.
///
/// [`PlaybackFactory`]: super::PlaybackFactory
pub trait ReferenceSource {
    /// Loads the table for a node initialized with `init`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the table cannot be found or parsed.
    fn load(&self, init: &InitValues) -> Result<TimeSeriesTable, ConfigError>;
}

/// A table is its own source.
impl ReferenceSource for TimeSeriesTable {
    fn load(&self, _init: &InitValues) -> Result<TimeSeriesTable, ConfigError> {
        Ok(self.clone())
    }
}

/// Reads a table in JSON split layout from the file named by `data_path`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReferenceFile;

impl ReferenceSource for JsonReferenceFile {
    fn load(&self, init: &InitValues) -> Result<TimeSeriesTable, ConfigError> {
        let path = init.require_text(DATA_PATH_KEY)?;
        let text = fs::read_to_string(path).map_err(|err| ConfigError::Unavailable {
            resource: path.to_owned(),
            reason: err.to_string(),
        })?;
        TimeSeriesTable::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{env, path::PathBuf};

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("cosim-nodes-{}-{name}", std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_table_from_data_path() {
        let path = temp_file(
            "reference.json",
            r#"{ "index": ["2019-01-01 00:00:00"], "columns": { "x": [1.5] } }"#,
        );
        let init: InitValues = [(DATA_PATH_KEY, path.to_string_lossy().into_owned())]
            .into_iter()
            .collect();

        let table = JsonReferenceFile.load(&init).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.has_column("x"));

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_data_path_is_reported() {
        assert_eq!(
            JsonReferenceFile.load(&InitValues::default()),
            Err(ConfigError::MissingParameter {
                key: DATA_PATH_KEY.to_owned()
            })
        );
    }

    #[test]
    fn unreadable_file_is_unavailable() {
        let init: InitValues = [(DATA_PATH_KEY, "/nonexistent/reference.json")]
            .into_iter()
            .collect();

        assert!(matches!(
            JsonReferenceFile.load(&init),
            Err(ConfigError::Unavailable { .. })
        ));
    }
}
