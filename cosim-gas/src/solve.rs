//! Steady-state flow solving for one pressure level of a gas network.

mod config;
mod error;
mod solution;

pub use config::SolverConfig;
pub use error::SolveError;
pub use solution::{Diagnostics, FlowSolution};

use std::collections::{BTreeMap, HashMap};

use log::{debug, trace};
use nalgebra::{DMatrix, DVector};
use petgraph::{graph::UnGraph, visit::Bfs};
use uom::si::{
    f64::{MassRate, Pressure},
    mass_rate::kilogram_per_second,
    pressure::pascal,
};

use crate::{
    law::{Resistance, load_mass_flow, potential, pressure_from_potential},
    level::PressureLevel,
    network::GasNetwork,
};

/// Potential drop, relative to the feeder potential, used to linearize every
/// pipe on the first sweep.
const NOMINAL_DROP: f64 = 1e-2;

/// Rounding units of the largest potential offset below which a potential
/// difference is not resolved.
const ROUNDING_UNITS: f64 = 16.0;

/// Computes the steady state of a network at one pressure level.
///
/// A solver must be deterministic: solving the same network twice yields
/// identical solutions.
pub trait FlowSolver {
    /// Solves the flows and pressures of every element at `level`.
    ///
    /// # Errors
    ///
    /// Returns a [`SolveError`] if the level is not solvable as given or the
    /// iteration fails to converge.
    fn solve(&self, network: &GasNetwork, level: PressureLevel) -> Result<FlowSolution, SolveError>;
}

/// Nodal solver using successive linearization of the pipe law.
///
/// Feeder nodes are held at their set pressure. Each sweep replaces every pipe
/// by the conductance `flow / potential difference` seen at the current
/// potentials and solves the resulting linear nodal equations for all free
/// nodes at once. At a fixed point the linear flows equal the Renouard flows,
/// so the mass balance holds at every node.
///
/// A solve is accepted only when the last sweep moved no pressure by more
/// than [`SolverConfig::pressure_tol_pa`] and no free node is out of balance
/// by more than [`SolverConfig::imbalance_tol`]. Every solve starts from the
/// highest feeder pressure, so results do not depend on earlier solves.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodalSolver {
    config: SolverConfig,
}

impl NodalSolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

impl FlowSolver for NodalSolver {
    fn solve(&self, network: &GasNetwork, level: PressureLevel) -> Result<FlowSolution, SolveError> {
        self.config
            .validate()
            .map_err(|reason| SolveError::InvalidConfig { reason })?;

        let system = System::assemble(network, level)?;
        system.check_connected()?;

        let state = system.iterate(&self.config)?;
        let solution = system.solution(network, &state);

        debug!(
            "solved {level} level: {} nodes, {} pipes, {} sweeps, max imbalance {:e} kg/s",
            system.names.len(),
            system.branches.len(),
            state.sweeps,
            solution.diagnostics.max_imbalance.get::<kilogram_per_second>(),
        );

        Ok(solution)
    }
}

/// Smallest potential difference resolved between nodes at these offsets.
fn rounding_floor(offsets: &[f64], scale: f64) -> f64 {
    let magnitude = offsets
        .iter()
        .fold(scale * f64::EPSILON, |largest, offset| largest.max(offset.abs()));
    magnitude * f64::EPSILON * ROUNDING_UNITS
}

/// A pipe between two node positions of the system.
#[derive(Debug)]
struct Branch<'a> {
    name: &'a str,
    from: usize,
    to: usize,
    resistance: Resistance,
}

impl Branch<'_> {
    /// Secant conductance of the pipe at a potential difference, kg/s per unit potential.
    fn conductance(&self, difference: f64, floor: f64) -> f64 {
        let difference = difference.abs().max(floor);
        self.resistance.potential_flow_kg_s(difference) / difference
    }
}

/// The nodal equations of one level, with nodes numbered in name order.
#[derive(Debug)]
struct System<'a> {
    level: PressureLevel,
    names: Vec<&'a str>,
    positions: HashMap<&'a str, usize>,
    /// Held pressure in Pa, for feeder nodes.
    fixed: Vec<Option<f64>>,
    /// Mass flow drawn by loads, kg/s.
    demand: Vec<f64>,
    branches: Vec<Branch<'a>>,
}

/// Converged node potentials, as offsets from the highest feeder potential.
#[derive(Debug)]
struct State {
    reference: f64,
    offsets: Vec<f64>,
    sweeps: usize,
}

/// Convergence measures of one sweep.
#[derive(Debug, Clone, Copy)]
struct Progress {
    max_change_pa: f64,
    max_imbalance: f64,
    allowed_imbalance: f64,
}

impl<'a> System<'a> {
    fn assemble(network: &'a GasNetwork, level: PressureLevel) -> Result<Self, SolveError> {
        let mut names: Vec<&str> = network
            .nodes()
            .iter()
            .filter(|node| node.level == level)
            .map(|node| node.name.as_str())
            .collect();
        names.sort_unstable();
        let positions: HashMap<&str, usize> =
            names.iter().enumerate().map(|(i, &name)| (name, i)).collect();
        let position = |name: &str| positions.get(name).copied();

        let branches = network
            .pipes()
            .iter()
            .filter_map(|pipe| {
                Some(Branch {
                    name: &pipe.name,
                    from: position(&pipe.from)?,
                    to: position(&pipe.to)?,
                    resistance: Resistance::of_pipe(pipe.length, pipe.diameter, level),
                })
            })
            .collect();

        let mut demand = vec![0.0; names.len()];
        for load in network.loads() {
            if let Some(at) = position(&load.node) {
                demand[at] += load_mass_flow(load).get::<kilogram_per_second>();
            }
        }

        let mut fixed = vec![None; names.len()];
        for feeder in network.feeders() {
            let Some(at) = position(&feeder.node) else {
                continue;
            };
            let pressure_pa = feeder.pressure.get::<pascal>();
            if level.is_squared() && pressure_pa <= 0.0 {
                return Err(SolveError::InvalidFeederPressure {
                    feeder: feeder.name.clone(),
                    pressure_pa,
                    level,
                });
            }
            if fixed[at].replace(pressure_pa).is_some() {
                return Err(SolveError::ConflictingFeeders {
                    node: feeder.node.clone(),
                });
            }
        }

        if fixed.iter().all(Option::is_none) {
            return Err(SolveError::NoFeeder { level });
        }

        Ok(Self {
            level,
            names,
            positions,
            fixed,
            demand,
            branches,
        })
    }

    /// Checks that every node can be reached from a feeder.
    fn check_connected(&self) -> Result<(), SolveError> {
        let mut graph = UnGraph::<usize, ()>::with_capacity(self.names.len(), self.branches.len());
        let indices: Vec<_> = (0..self.names.len()).map(|i| graph.add_node(i)).collect();
        for branch in &self.branches {
            graph.add_edge(indices[branch.from], indices[branch.to], ());
        }

        let mut reached = vec![false; self.names.len()];
        for (i, fixed) in self.fixed.iter().enumerate() {
            if fixed.is_none() || reached[i] {
                continue;
            }
            let mut bfs = Bfs::new(&graph, indices[i]);
            while let Some(index) = bfs.next(&graph) {
                reached[graph[index]] = true;
            }
        }

        match reached.iter().position(|reached| !reached) {
            Some(i) => Err(SolveError::Isolated {
                node: self.names[i].to_owned(),
            }),
            None => Ok(()),
        }
    }

    /// Runs linearized sweeps until the potentials converge.
    ///
    /// Unknowns are potential offsets from the highest feeder potential, so a
    /// node that carries no flow stays exactly at its feeder's potential.
    fn iterate(&self, config: &SolverConfig) -> Result<State, SolveError> {
        let held: Vec<Option<f64>> = self
            .fixed
            .iter()
            .map(|fixed| fixed.map(|pressure| potential(self.level, pressure)))
            .collect();
        let reference = held
            .iter()
            .flatten()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let scale = held
            .iter()
            .flatten()
            .map(|value| value.abs())
            .fold(1.0, f64::max);

        let free: Vec<usize> = (0..self.names.len())
            .filter(|&i| self.fixed[i].is_none())
            .collect();
        let mut unknown = vec![None; self.names.len()];
        for (k, &i) in free.iter().enumerate() {
            unknown[i] = Some(k);
        }

        let mut offsets: Vec<f64> = held
            .iter()
            .map(|held| held.map_or(0.0, |held| held - reference))
            .collect();
        if free.is_empty() {
            return Ok(State {
                reference,
                offsets,
                sweeps: 0,
            });
        }

        let mut progress = None;
        for sweep in 1..=config.max_sweeps {
            let floor = rounding_floor(&offsets, scale);
            let mut matrix = DMatrix::<f64>::zeros(free.len(), free.len());
            let mut rhs = DVector::from_iterator(free.len(), free.iter().map(|&i| -self.demand[i]));

            for branch in &self.branches {
                let difference = if sweep == 1 {
                    scale * NOMINAL_DROP
                } else {
                    offsets[branch.from] - offsets[branch.to]
                };
                let g = branch.conductance(difference, floor);
                match (unknown[branch.from], unknown[branch.to]) {
                    (Some(a), Some(b)) => {
                        matrix[(a, a)] += g;
                        matrix[(b, b)] += g;
                        matrix[(a, b)] -= g;
                        matrix[(b, a)] -= g;
                    }
                    (Some(a), None) => {
                        matrix[(a, a)] += g;
                        rhs[a] += g * offsets[branch.to];
                    }
                    (None, Some(b)) => {
                        matrix[(b, b)] += g;
                        rhs[b] += g * offsets[branch.from];
                    }
                    (None, None) => {}
                }
            }

            // Conductances are positive and every free node reaches a feeder,
            // so the reduced nodal matrix is symmetric positive definite.
            let solved = matrix
                .cholesky()
                .map(|factor| factor.solve(&rhs))
                .filter(|solved| solved.iter().all(|offset| offset.is_finite()))
                .ok_or(SolveError::Singular { level: self.level })?;

            let mut max_change_pa: f64 = 0.0;
            for (&i, &offset) in free.iter().zip(solved.iter()) {
                let before = pressure_from_potential(self.level, reference + offsets[i]);
                let after = pressure_from_potential(self.level, reference + offset);
                max_change_pa = max_change_pa.max((after - before).abs());
                offsets[i] = offset;
            }

            let floor = rounding_floor(&offsets, scale);
            let current = self.progress(&offsets, max_change_pa, floor, config);
            trace!(
                "sweep {sweep}: pressure change {:e} Pa, imbalance {:e} of {:e} kg/s allowed",
                current.max_change_pa,
                current.max_imbalance,
                current.allowed_imbalance,
            );
            progress = Some(current);

            if current.max_change_pa <= config.pressure_tol_pa
                && current.max_imbalance <= current.allowed_imbalance
            {
                self.check_feasible(&offsets, reference)?;
                return Ok(State {
                    reference,
                    offsets,
                    sweeps: sweep,
                });
            }
        }

        let (max_change_pa, max_imbalance_kg_s) = progress
            .map_or((f64::INFINITY, f64::INFINITY), |last| {
                (last.max_change_pa, last.max_imbalance)
            });
        Err(SolveError::NotConverged {
            sweeps: config.max_sweeps,
            max_change_pa,
            max_imbalance_kg_s,
        })
    }

    /// Measures the mass balance of the free nodes under the Renouard law.
    ///
    /// The allowed imbalance is relative to the total demand or the largest
    /// pipe flow, plus the flow that an unresolved potential difference
    /// drives through the stiffest pipe.
    fn progress(
        &self,
        offsets: &[f64],
        max_change_pa: f64,
        floor: f64,
        config: &SolverConfig,
    ) -> Progress {
        let mut inflow = vec![0.0; self.names.len()];
        let mut largest_flow: f64 = 0.0;
        let mut rounding_flow: f64 = 0.0;
        for branch in &self.branches {
            let flow = branch
                .resistance
                .potential_flow_kg_s(offsets[branch.from] - offsets[branch.to]);
            inflow[branch.to] += flow;
            inflow[branch.from] -= flow;
            largest_flow = largest_flow.max(flow.abs());
            rounding_flow = rounding_flow.max(branch.resistance.potential_flow_kg_s(floor));
        }

        let max_imbalance = (0..self.names.len())
            .filter(|&i| self.fixed[i].is_none())
            .map(|i| (inflow[i] - self.demand[i]).abs())
            .fold(0.0, f64::max);
        let total_demand: f64 = self.demand.iter().sum();

        Progress {
            max_change_pa,
            max_imbalance,
            allowed_imbalance: config.imbalance_tol * total_demand.max(largest_flow)
                + rounding_flow,
        }
    }

    /// Rejects solutions that need a non-positive absolute pressure.
    fn check_feasible(&self, offsets: &[f64], reference: f64) -> Result<(), SolveError> {
        if !self.level.is_squared() {
            return Ok(());
        }
        let lowest = (0..self.names.len())
            .filter(|&i| self.fixed[i].is_none() && reference + offsets[i] <= 0.0)
            .min_by(|&a, &b| offsets[a].total_cmp(&offsets[b]));
        match lowest {
            Some(i) => Err(SolveError::Infeasible {
                node: self.names[i].to_owned(),
            }),
            None => Ok(()),
        }
    }

    fn solution(&self, network: &GasNetwork, state: &State) -> FlowSolution {
        let kg_s = MassRate::new::<kilogram_per_second>;
        let offsets = &state.offsets;

        let mut outflow = vec![0.0; self.names.len()];
        let mut pipe_flows = BTreeMap::new();
        for branch in &self.branches {
            let flow = branch
                .resistance
                .potential_flow_kg_s(offsets[branch.from] - offsets[branch.to]);
            outflow[branch.from] += flow;
            outflow[branch.to] -= flow;
            pipe_flows.insert(branch.name.to_owned(), kg_s(flow));
        }

        let mut load_flows = BTreeMap::new();
        let mut node_loads = vec![0.0; self.names.len()];
        for load in network.loads() {
            if let Some(&i) = self.positions.get(load.node.as_str()) {
                let flow = load_mass_flow(load);
                node_loads[i] += flow.get::<kilogram_per_second>();
                load_flows.insert(load.name.clone(), flow);
            }
        }

        let feeder_flows = network
            .feeders()
            .iter()
            .filter_map(|feeder| {
                let &i = self.positions.get(feeder.node.as_str())?;
                Some((feeder.name.clone(), kg_s(outflow[i] + node_loads[i])))
            })
            .collect();

        let max_imbalance = (0..self.names.len())
            .filter(|&i| self.fixed[i].is_none())
            .map(|i| (outflow[i] + self.demand[i]).abs())
            .fold(0.0, f64::max);

        FlowSolution {
            level: self.level,
            pressures: self
                .names
                .iter()
                .zip(offsets)
                .map(|(&name, &offset)| {
                    let pressure = pressure_from_potential(self.level, state.reference + offset);
                    (name.to_owned(), Pressure::new::<pascal>(pressure))
                })
                .collect(),
            pipe_flows,
            node_flows: self
                .names
                .iter()
                .zip(&outflow)
                .map(|(&name, &flow)| (name.to_owned(), kg_s(flow)))
                .collect(),
            load_flows,
            feeder_flows,
            diagnostics: Diagnostics {
                sweeps: state.sweeps,
                max_imbalance: kg_s(max_imbalance),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::{
        law::bar_to_pascal,
        network::{FeederRecord, LoadRecord, NetworkRecord, NodeRecord, PipeRecord},
    };

    fn node(name: &str, level: PressureLevel) -> NodeRecord {
        NodeRecord {
            name: name.into(),
            level,
        }
    }

    fn pipe(name: &str, from: &str, to: &str, length_m: f64) -> PipeRecord {
        PipeRecord {
            name: name.into(),
            from: from.into(),
            to: to.into(),
            length_m,
            diameter_m: 0.1,
        }
    }

    fn load(name: &str, node: &str, demand_kw: f64) -> LoadRecord {
        LoadRecord {
            name: name.into(),
            node: node.into(),
            demand_kw,
            scaling: 1.0,
        }
    }

    fn feeder(name: &str, node: &str, pressure_pa: f64) -> FeederRecord {
        FeederRecord {
            name: name.into(),
            node: node.into(),
            pressure_pa,
        }
    }

    fn two_node(demand_kw: f64) -> GasNetwork {
        GasNetwork::from_record(NetworkRecord {
            nodes: vec![
                node("gas_node_A", PressureLevel::Low),
                node("gas_node_B", PressureLevel::Low),
            ],
            pipes: vec![pipe("gas_pipe_AB", "gas_node_A", "gas_node_B", 100.0)],
            loads: vec![load("gas_load_1", "gas_node_B", demand_kw)],
            feeders: vec![feeder("gas_feeder_1", "gas_node_A", 2500.0)],
        })
        .unwrap()
    }

    fn kg_s(flow: MassRate) -> f64 {
        flow.get::<kilogram_per_second>()
    }

    #[test]
    fn gas_flows_from_feeder_to_load() {
        let solution = NodalSolver::new()
            .solve(&two_node(10.0), PressureLevel::Low)
            .unwrap();

        let drawn = 10.0e3 / 50.0e6;
        assert_relative_eq!(kg_s(solution.load_flows["gas_load_1"]), drawn);
        assert_relative_eq!(kg_s(solution.pipe_flows["gas_pipe_AB"]), drawn, max_relative = 1e-6);
        assert_relative_eq!(kg_s(solution.feeder_flows["gas_feeder_1"]), drawn, max_relative = 1e-6);
        assert_relative_eq!(kg_s(solution.node_flows["gas_node_A"]), drawn, max_relative = 1e-6);
        assert_relative_eq!(kg_s(solution.node_flows["gas_node_B"]), -drawn, max_relative = 1e-6);

        assert_relative_eq!(solution.pressures["gas_node_A"].get::<pascal>(), 2500.0);
        assert!(solution.pressures["gas_node_B"].get::<pascal>() < 2500.0);
        assert!(kg_s(solution.diagnostics.max_imbalance) < 1e-9);
    }

    #[test]
    fn zero_demand_leaves_network_at_feeder_pressure() {
        let solution = NodalSolver::new()
            .solve(&two_node(0.0), PressureLevel::Low)
            .unwrap();

        assert_relative_eq!(solution.pressures["gas_node_B"].get::<pascal>(), 2500.0);
        assert_eq!(kg_s(solution.pipe_flows["gas_pipe_AB"]), 0.0);
    }

    #[test]
    fn more_demand_means_more_flow_and_lower_pressure() {
        let solver = NodalSolver::new();
        let small = solver.solve(&two_node(5.0), PressureLevel::Low).unwrap();
        let large = solver.solve(&two_node(20.0), PressureLevel::Low).unwrap();

        assert!(kg_s(large.pipe_flows["gas_pipe_AB"]) > kg_s(small.pipe_flows["gas_pipe_AB"]));
        assert!(large.pressures["gas_node_B"] < small.pressures["gas_node_B"]);
    }

    #[test]
    fn repeated_solves_are_identical() {
        let network = two_node(12.5);
        let solver = NodalSolver::new();

        let first = solver.solve(&network, PressureLevel::Low).unwrap();
        let second = solver.solve(&network, PressureLevel::Low).unwrap();
        assert_eq!(first, second);
    }

    /// Asserts that feeders supply what loads draw and every free node balances.
    fn assert_conserves_mass(solution: &FlowSolution) {
        let supplied: f64 = solution.feeder_flows.values().copied().map(kg_s).sum();
        let drawn: f64 = solution.load_flows.values().copied().map(kg_s).sum();
        assert_relative_eq!(supplied, drawn, max_relative = 1e-6);
        assert!(kg_s(solution.diagnostics.max_imbalance) <= 1e-6 * drawn);
    }

    /// A radial chain of `len` nodes fed at its head, with one load per downstream node.
    fn chain(len: usize, level: PressureLevel, feeder_pa: f64, load_kw: f64, pipe_m: f64) -> GasNetwork {
        let name = |i: usize| format!("gas_node_{i:03}");
        GasNetwork::from_record(NetworkRecord {
            nodes: (0..len).map(|i| node(&name(i), level)).collect(),
            pipes: (1..len)
                .map(|i| pipe(&format!("gas_pipe_{i:03}"), &name(i - 1), &name(i), pipe_m))
                .collect(),
            loads: (1..len)
                .map(|i| load(&format!("gas_load_{i:03}"), &name(i), load_kw))
                .collect(),
            feeders: vec![feeder("gas_feeder_1", &name(0), feeder_pa)],
        })
        .unwrap()
    }

    fn assert_pressure_falls_along_chain(solution: &FlowSolution) {
        let pressures: Vec<f64> = solution
            .pressures
            .values()
            .map(|p| p.get::<pascal>())
            .collect();
        assert!(pressures.windows(2).all(|pair| pair[1] < pair[0]));
    }

    #[test]
    fn meshed_network_conserves_mass() {
        let level = PressureLevel::Low;
        let network = GasNetwork::from_record(NetworkRecord {
            nodes: vec![
                node("gas_node_A", level),
                node("gas_node_B", level),
                node("gas_node_C", level),
            ],
            pipes: vec![
                pipe("gas_pipe_AB", "gas_node_A", "gas_node_B", 100.0),
                pipe("gas_pipe_BC", "gas_node_B", "gas_node_C", 50.0),
                pipe("gas_pipe_CA", "gas_node_C", "gas_node_A", 200.0),
            ],
            loads: vec![
                load("gas_load_1", "gas_node_B", 30.0),
                load("gas_load_2", "gas_node_C", 15.0),
            ],
            feeders: vec![feeder("gas_feeder_1", "gas_node_A", 2500.0)],
        })
        .unwrap();

        let solution = NodalSolver::new().solve(&network, level).unwrap();

        assert_conserves_mass(&solution);
        assert!(solution.diagnostics.sweeps > 1);
    }

    #[test]
    fn long_low_pressure_chains_converge() {
        let solver = NodalSolver::new();
        for len in [20, 40, 80] {
            let network = chain(len, PressureLevel::Low, 2500.0, 5.0, 100.0);
            let solution = solver
                .solve(&network, PressureLevel::Low)
                .unwrap_or_else(|err| panic!("chain of {len} nodes: {err}"));

            assert_conserves_mass(&solution);
            assert_pressure_falls_along_chain(&solution);

            let drawn = (len - 1) as f64 * 5.0e3 / 50.0e6;
            assert_relative_eq!(
                kg_s(solution.pipe_flows["gas_pipe_001"]),
                drawn,
                max_relative = 1e-6
            );
        }
    }

    #[test]
    fn medium_pressure_chain_converges() {
        let level = PressureLevel::Medium;
        let network = chain(20, level, bar_to_pascal(4.0), 200.0, 500.0);

        let solution = NodalSolver::new().solve(&network, level).unwrap();

        assert_conserves_mass(&solution);
        assert_pressure_falls_along_chain(&solution);
        assert!(solution.pressures["gas_node_019"].get::<pascal>() > bar_to_pascal(3.0));
    }

    #[test]
    fn separate_feeders_supply_separate_branches() {
        let level = PressureLevel::Low;
        let network = GasNetwork::from_record(NetworkRecord {
            nodes: vec![
                node("gas_node_A", level),
                node("gas_node_B", level),
                node("gas_node_C", level),
                node("gas_node_D", level),
            ],
            pipes: vec![
                pipe("gas_pipe_AB", "gas_node_A", "gas_node_B", 100.0),
                pipe("gas_pipe_CD", "gas_node_C", "gas_node_D", 100.0),
            ],
            loads: vec![
                load("gas_load_1", "gas_node_B", 10.0),
                load("gas_load_2", "gas_node_D", 40.0),
            ],
            feeders: vec![
                feeder("gas_feeder_1", "gas_node_A", 2500.0),
                feeder("gas_feeder_2", "gas_node_C", 2300.0),
            ],
        })
        .unwrap();

        let solution = NodalSolver::new().solve(&network, level).unwrap();

        assert_conserves_mass(&solution);
        assert_relative_eq!(
            kg_s(solution.feeder_flows["gas_feeder_1"]),
            10.0e3 / 50.0e6,
            max_relative = 1e-6
        );
        assert_relative_eq!(
            kg_s(solution.feeder_flows["gas_feeder_2"]),
            40.0e3 / 50.0e6,
            max_relative = 1e-6
        );
        assert!(solution.pressures["gas_node_D"].get::<pascal>() < 2300.0);
    }

    #[test]
    fn grid_with_two_feeders_balances_every_node() {
        let level = PressureLevel::Low;
        let size = 4;
        let name = |row: usize, col: usize| format!("gas_node_{row}{col}");

        let mut record = NetworkRecord::default();
        for row in 0..size {
            for col in 0..size {
                record.nodes.push(node(&name(row, col), level));
                if row + 1 < size {
                    let pipe_name = format!("gas_pipe_v{row}{col}");
                    record.pipes.push(pipe(&pipe_name, &name(row, col), &name(row + 1, col), 80.0));
                }
                if col + 1 < size {
                    let pipe_name = format!("gas_pipe_h{row}{col}");
                    record.pipes.push(pipe(&pipe_name, &name(row, col), &name(row, col + 1), 120.0));
                }
                record
                    .loads
                    .push(load(&format!("gas_load_{row}{col}"), &name(row, col), 8.0));
            }
        }
        record.feeders = vec![
            feeder("gas_feeder_1", &name(0, 0), 2500.0),
            feeder("gas_feeder_2", &name(size - 1, size - 1), 2500.0),
        ];
        let network = GasNetwork::from_record(record).unwrap();

        let solution = NodalSolver::new().solve(&network, level).unwrap();

        assert_conserves_mass(&solution);
        for (name, flow) in &solution.node_flows {
            if name == "gas_node_00" || name == "gas_node_33" {
                assert!(kg_s(*flow) > 0.0, "{name} should supply gas");
            } else {
                assert_relative_eq!(kg_s(*flow), -8.0e3 / 50.0e6, max_relative = 1e-6);
            }
        }
        assert_relative_eq!(
            kg_s(solution.feeder_flows["gas_feeder_1"]),
            kg_s(solution.feeder_flows["gas_feeder_2"]),
            max_relative = 1e-6
        );
    }

    #[test]
    fn loose_pressure_tolerance_does_not_hide_imbalance() {
        let solver = NodalSolver::with_config(SolverConfig {
            max_sweeps: 2,
            pressure_tol_pa: 1.0e9,
            ..SolverConfig::default()
        });

        let network = chain(20, PressureLevel::Low, 2500.0, 5.0, 100.0);

        match solver.solve(&network, PressureLevel::Low) {
            Err(SolveError::NotConverged {
                sweeps,
                max_imbalance_kg_s,
                ..
            }) => {
                assert_eq!(sweeps, 2);
                assert!(max_imbalance_kg_s > 0.0);
            }
            other => panic!("expected an unbalanced solve to be rejected, got {other:?}"),
        }
    }

    #[test]
    fn medium_level_uses_absolute_pressures() {
        let level = PressureLevel::Medium;
        let network = GasNetwork::from_record(NetworkRecord {
            nodes: vec![node("gas_node_A", level), node("gas_node_B", level)],
            pipes: vec![pipe("gas_pipe_AB", "gas_node_A", "gas_node_B", 1000.0)],
            loads: vec![load("gas_load_1", "gas_node_B", 500.0)],
            feeders: vec![feeder("gas_feeder_1", "gas_node_A", bar_to_pascal(4.0))],
        })
        .unwrap();

        let solution = NodalSolver::new().solve(&network, level).unwrap();

        let p_b = solution.pressures["gas_node_B"].get::<pascal>();
        assert!(p_b > 0.0 && p_b < bar_to_pascal(4.0));
        assert_relative_eq!(kg_s(solution.pipe_flows["gas_pipe_AB"]), 500.0e3 / 50.0e6, max_relative = 1e-6);
    }

    #[test]
    fn solves_only_the_requested_level() {
        let mut record = NetworkRecord {
            nodes: vec![
                node("gas_node_A", PressureLevel::Low),
                node("gas_node_B", PressureLevel::Low),
                node("gas_node_M", PressureLevel::Medium),
            ],
            pipes: vec![pipe("gas_pipe_AB", "gas_node_A", "gas_node_B", 100.0)],
            loads: vec![load("gas_load_1", "gas_node_B", 10.0)],
            feeders: vec![feeder("gas_feeder_1", "gas_node_A", 2500.0)],
        };
        record.loads.push(load("gas_load_M", "gas_node_M", 10.0));

        let network = GasNetwork::from_record(record).unwrap();
        let solution = NodalSolver::new().solve(&network, PressureLevel::Low).unwrap();

        assert!(!solution.pressures.contains_key("gas_node_M"));
        assert!(!solution.load_flows.contains_key("gas_load_M"));
    }

    #[test]
    fn level_without_feeder_is_rejected() {
        assert_eq!(
            NodalSolver::new().solve(&two_node(10.0), PressureLevel::High),
            Err(SolveError::NoFeeder {
                level: PressureLevel::High
            })
        );
    }

    #[test]
    fn isolated_node_is_rejected() {
        let level = PressureLevel::Low;
        let network = GasNetwork::from_record(NetworkRecord {
            nodes: vec![
                node("gas_node_A", level),
                node("gas_node_B", level),
                node("gas_node_C", level),
            ],
            pipes: vec![pipe("gas_pipe_AB", "gas_node_A", "gas_node_B", 100.0)],
            loads: vec![load("gas_load_1", "gas_node_C", 1.0)],
            feeders: vec![feeder("gas_feeder_1", "gas_node_A", 2500.0)],
        })
        .unwrap();

        assert_eq!(
            NodalSolver::new().solve(&network, level),
            Err(SolveError::Isolated {
                node: "gas_node_C".into()
            })
        );
    }

    #[test]
    fn two_feeders_on_one_node_conflict() {
        let level = PressureLevel::Low;
        let network = GasNetwork::from_record(NetworkRecord {
            nodes: vec![node("gas_node_A", level)],
            feeders: vec![
                feeder("gas_feeder_1", "gas_node_A", 2500.0),
                feeder("gas_feeder_2", "gas_node_A", 2400.0),
            ],
            ..NetworkRecord::default()
        })
        .unwrap();

        assert!(matches!(
            NodalSolver::new().solve(&network, level),
            Err(SolveError::ConflictingFeeders { .. })
        ));
    }

    #[test]
    fn unreachable_demand_is_infeasible() {
        let level = PressureLevel::Medium;
        let network = GasNetwork::from_record(NetworkRecord {
            nodes: vec![node("gas_node_A", level), node("gas_node_B", level)],
            pipes: vec![pipe("gas_pipe_AB", "gas_node_A", "gas_node_B", 10_000.0)],
            loads: vec![load("gas_load_1", "gas_node_B", 1.0e5)],
            feeders: vec![feeder("gas_feeder_1", "gas_node_A", bar_to_pascal(1.1))],
        })
        .unwrap();

        assert_eq!(
            NodalSolver::new().solve(&network, level),
            Err(SolveError::Infeasible {
                node: "gas_node_B".into()
            })
        );
    }

    #[test]
    fn non_positive_feeder_pressure_is_rejected_at_squared_levels() {
        let level = PressureLevel::High;
        let network = GasNetwork::from_record(NetworkRecord {
            nodes: vec![node("gas_node_A", level)],
            feeders: vec![feeder("gas_feeder_1", "gas_node_A", 0.0)],
            ..NetworkRecord::default()
        })
        .unwrap();

        assert!(matches!(
            NodalSolver::new().solve(&network, level),
            Err(SolveError::InvalidFeederPressure { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let solver = NodalSolver::with_config(SolverConfig {
            max_sweeps: 0,
            ..SolverConfig::default()
        });

        assert!(matches!(
            solver.solve(&two_node(1.0), PressureLevel::Low),
            Err(SolveError::InvalidConfig { .. })
        ));
    }
}
