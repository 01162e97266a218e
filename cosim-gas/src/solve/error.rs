use thiserror::Error;

use crate::level::PressureLevel;

/// Errors raised while solving a network's steady state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("invalid solver config: {reason}")]
    InvalidConfig { reason: &'static str },

    #[error("no feeder supplies the {level} level")]
    NoFeeder { level: PressureLevel },

    #[error("node `{node}` is not connected to any feeder")]
    Isolated { node: String },

    #[error("node `{node}` is held by more than one feeder")]
    ConflictingFeeders { node: String },

    #[error("feeder `{feeder}` pressure {pressure_pa} Pa is not valid at the {level} level")]
    InvalidFeederPressure {
        feeder: String,
        pressure_pa: f64,
        level: PressureLevel,
    },

    #[error("demand at node `{node}` cannot be met by the network")]
    Infeasible { node: String },

    #[error(
        "did not converge after {sweeps} sweeps (last pressure change {max_change_pa} Pa, \
         mass imbalance {max_imbalance_kg_s} kg/s)"
    )]
    NotConverged {
        sweeps: usize,
        max_change_pa: f64,
        max_imbalance_kg_s: f64,
    },

    #[error("nodal equations of the {level} level are singular")]
    Singular { level: PressureLevel },
}
