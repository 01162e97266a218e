use serde::{Deserialize, Serialize};

use crate::level::PressureLevel;

/// The plain, serializable form of a network's element table.
///
/// Quantities are stored as raw numbers in the units named by each field.
/// Convert with [`GasNetwork::from_record`] to validate and attach units.
///
/// [`GasNetwork::from_record`]: crate::GasNetwork::from_record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub pipes: Vec<PipeRecord>,
    #[serde(default)]
    pub loads: Vec<LoadRecord>,
    #[serde(default)]
    pub feeders: Vec<FeederRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    #[serde(default)]
    pub level: PressureLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeRecord {
    pub name: String,
    pub from: String,
    pub to: String,
    pub length_m: f64,
    pub diameter_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadRecord {
    pub name: String,
    pub node: String,
    pub demand_kw: f64,
    #[serde(default = "unit_scaling")]
    pub scaling: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeederRecord {
    pub name: String,
    pub node: String,
    pub pressure_pa: f64,
}

fn unit_scaling() -> f64 {
    1.0
}
