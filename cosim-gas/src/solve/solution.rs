use std::collections::BTreeMap;

use uom::si::f64::{MassRate, Pressure};

use crate::level::PressureLevel;

/// Convergence details of a steady-state solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    /// Linearized sweeps performed.
    pub sweeps: usize,
    /// Largest mass imbalance left at a free node, kg/s.
    pub max_imbalance: MassRate,
}

/// The derived quantities of one network at one pressure level.
///
/// All maps are keyed by element name and ordered, so iterating a solution is
/// deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSolution {
    pub level: PressureLevel,
    /// Pressure at every node of the level.
    pub pressures: BTreeMap<String, Pressure>,
    /// Mass flow through every pipe, positive from its `from` node to its `to` node.
    pub pipe_flows: BTreeMap<String, MassRate>,
    /// Net mass flow leaving every node into its pipes.
    ///
    /// Positive at supply nodes and negative at consuming nodes.
    pub node_flows: BTreeMap<String, MassRate>,
    /// Mass flow drawn by every load on the level.
    pub load_flows: BTreeMap<String, MassRate>,
    /// Mass flow supplied by every feeder on the level.
    pub feeder_flows: BTreeMap<String, MassRate>,
    pub diagnostics: Diagnostics,
}
