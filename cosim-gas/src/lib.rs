//! Gas distribution networks and their steady state.
//!
//! A [`GasNetwork`] is the element table of nodes, pipes, loads, and feeders,
//! each named with its kind prefix (`gas_node`, `gas_pipe`, `gas_load`,
//! `gas_feed`). A [`FlowSolver`] turns the table into a [`FlowSolution`] for
//! one [`PressureLevel`] at a time.

mod level;
mod network;

pub mod law;
pub mod solve;

pub use level::{PressureLevel, UnknownLevelError};
pub use network::{
    ElementId, ElementKind, Feeder, FeederRecord, GasNetwork, Load, LoadRecord, NetworkError,
    NetworkRecord, Node, NodeRecord, Pipe, PipeRecord,
};
pub use solve::{Diagnostics, FlowSolution, FlowSolver, NodalSolver, SolveError, SolverConfig};
