/// Configuration for the nodal steady-state solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Maximum number of linearized sweeps.
    pub max_sweeps: usize,
    /// Largest node pressure change, in Pa, allowed in the final sweep.
    pub pressure_tol_pa: f64,
    /// Largest mass imbalance allowed at a free node, relative to the total
    /// demand or the largest pipe flow, whichever is greater.
    pub imbalance_tol: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_sweeps: 200,
            pressure_tol_pa: 1e-6,
            imbalance_tol: 1e-8,
        }
    }
}

impl SolverConfig {
    /// Validates sweep limits and tolerances.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_sweeps` is zero or a tolerance is negative or
    /// non-finite.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_sweeps == 0 {
            return Err("max_sweeps must be at least 1");
        }
        if !self.pressure_tol_pa.is_finite() || self.pressure_tol_pa < 0.0 {
            return Err("pressure_tol_pa must be finite and non-negative");
        }
        if !self.imbalance_tol.is_finite() || self.imbalance_tol < 0.0 {
            return Err("imbalance_tol must be finite and non-negative");
        }
        Ok(())
    }
}
