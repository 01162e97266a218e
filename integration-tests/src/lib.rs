//! Shared fixtures for the cross-crate scenarios in `tests/`.

use std::{env, fs, io, path::PathBuf};

use cosim_core::{InitValue, InitValues};
use cosim_gas::{FeederRecord, LoadRecord, NetworkRecord, NodeRecord, PipeRecord, PressureLevel};

/// Start date shared by every scenario.
pub const START_DATE: &str = "2019-01-01T00:00:00";

/// Installs a test logger once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Builds init values with the shared start date plus `extra` parameters.
pub fn init_values<'a, I>(extra: I) -> InitValues
where
    I: IntoIterator<Item = (&'a str, InitValue)>,
{
    std::iter::once(("start_date", InitValue::from(START_DATE)))
        .chain(extra)
        .collect()
}

/// A fresh scratch directory under the system temp dir.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn scratch_dir(name: &str) -> io::Result<PathBuf> {
    let dir = env::temp_dir().join(format!("cosim-it-{}-{name}", std::process::id()));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Two low pressure nodes joined by one pipe.
///
/// `gas_node_A` is held at 2500 Pa by `gas_feeder_1`; `gas_node_B` carries
/// `gas_load_1`, initially without demand.
pub fn two_node_network() -> NetworkRecord {
    NetworkRecord {
        nodes: vec![
            NodeRecord {
                name: "gas_node_A".into(),
                level: PressureLevel::Low,
            },
            NodeRecord {
                name: "gas_node_B".into(),
                level: PressureLevel::Low,
            },
        ],
        pipes: vec![PipeRecord {
            name: "gas_pipe_AB".into(),
            from: "gas_node_A".into(),
            to: "gas_node_B".into(),
            length_m: 100.0,
            diameter_m: 0.1,
        }],
        loads: vec![LoadRecord {
            name: "gas_load_1".into(),
            node: "gas_node_B".into(),
            demand_kw: 0.0,
            scaling: 1.0,
        }],
        feeders: vec![FeederRecord {
            name: "gas_feeder_1".into(),
            node: "gas_node_A".into(),
            pressure_pa: 2500.0,
        }],
    }
}
