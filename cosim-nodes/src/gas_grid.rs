//! Gas grid: a node backed by a steady-state network solve.

mod address;
mod topology;

pub use address::{GasAddress, GasField};
pub use topology::{
    InMemoryTopology, JsonDirectoryStore, NETWORK_ID_KEY, TOPOLOGY_DIR_KEY, TopologyStore,
};

use cosim_core::{
    AttributeName, BindingFactory, ConfigError, InitValues, ModelBinding, NodeError, Outputs,
    SEPARATOR,
};
use cosim_gas::{
    ElementKind, FlowSolution, FlowSolver, GasNetwork, NodalSolver, PressureLevel, SolverConfig,
};
use jiff::civil::DateTime;
use log::{debug, info};
use uom::si::{
    f64::{MassRate, Power, Pressure},
    mass_rate::kilogram_per_second,
    power::kilowatt,
    pressure::pascal,
};

/// Parameter selecting the pressure level to solve.
pub const LEVEL_KEY: &str = "level";

/// Parameter overriding [`SolverConfig::max_sweeps`].
pub const MAX_SWEEPS_KEY: &str = "max_sweeps";

/// Parameter overriding [`SolverConfig::pressure_tol_pa`].
pub const PRESSURE_TOL_KEY: &str = "pressure_tol_pa";

/// Parameter overriding [`SolverConfig::imbalance_tol`].
pub const IMBALANCE_TOL_KEY: &str = "imbalance_tol";

/// Builds [`GasGridBinding`]s from an injected [`TopologyStore`].
///
/// Solver settings start from the factory's [`SolverConfig`] and may be
/// overridden per node through `max_sweeps`, `pressure_tol_pa`, and
/// `imbalance_tol`.
#[derive(Debug, Clone, Default)]
pub struct GasGridFactory<S> {
    store: S,
    config: SolverConfig,
}

impl<S: TopologyStore> GasGridFactory<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: SolverConfig::default(),
        }
    }

    #[must_use]
    pub fn with_solver_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    fn solver_config(&self, init: &InitValues) -> Result<SolverConfig, ConfigError> {
        let mut config = self.config;
        if let Some(max_sweeps) = init.optional_count(MAX_SWEEPS_KEY)? {
            config.max_sweeps = max_sweeps;
        }
        if let Some(tol) = init.optional_number(PRESSURE_TOL_KEY)? {
            config.pressure_tol_pa = tol;
        }
        if let Some(tol) = init.optional_number(IMBALANCE_TOL_KEY)? {
            config.imbalance_tol = tol;
        }
        config
            .validate()
            .map_err(|reason| ConfigError::InvalidParameter {
                key: "solver".to_owned(),
                reason: reason.to_owned(),
            })?;
        Ok(config)
    }
}

impl<S: TopologyStore> BindingFactory for GasGridFactory<S> {
    type Binding = GasGridBinding<NodalSolver>;

    fn build(&self, init: &InitValues) -> Result<Self::Binding, ConfigError> {
        let level = match init.optional_text(LEVEL_KEY)? {
            Some(text) => text
                .parse::<PressureLevel>()
                .map_err(|err| ConfigError::InvalidParameter {
                    key: LEVEL_KEY.to_owned(),
                    reason: err.to_string(),
                })?,
            None => PressureLevel::default(),
        };
        let config = self.solver_config(init)?;

        let record = self.store.network(init)?;
        let network =
            GasNetwork::from_record(record).map_err(|err| ConfigError::Parse(err.to_string()))?;

        info!(
            "loaded gas network: {} nodes, {} pipes, {} loads, {} feeders; solving the {level} level",
            network.nodes().len(),
            network.pipes().len(),
            network.loads().len(),
            network.feeders().len(),
        );

        Ok(GasGridBinding::new(
            network,
            level,
            NodalSolver::with_config(config),
        ))
    }
}

/// Binding that owns a gas network and its most recent solution.
///
/// Load demands, load scalings, and feeder pressures are set points and take
/// effect on the next step. Pressures and mass flows are derived from the
/// last successful solve; until one exists, or after a solve fails, reads of
/// derived fields fail with [`NodeError::StaleResult`].
///
/// Only elements on the binding's pressure level are addressable.
#[derive(Debug, Clone)]
pub struct GasGridBinding<F> {
    network: GasNetwork,
    level: PressureLevel,
    solver: F,
    solution: Option<FlowSolution>,
}

impl<F: FlowSolver> GasGridBinding<F> {
    #[must_use]
    pub fn new(network: GasNetwork, level: PressureLevel, solver: F) -> Self {
        Self {
            network,
            level,
            solver,
            solution: None,
        }
    }

    #[must_use]
    pub fn network(&self) -> &GasNetwork {
        &self.network
    }

    #[must_use]
    pub fn level(&self) -> PressureLevel {
        self.level
    }

    /// The last successful solution, if any.
    #[must_use]
    pub fn solution(&self) -> Option<&FlowSolution> {
        self.solution.as_ref()
    }

    /// Level of the node an element sits on.
    fn element_level(&self, address: &GasAddress) -> Option<PressureLevel> {
        let node = match address.id.kind {
            ElementKind::Node => &self.network.nodes().get(address.id.index)?.name,
            ElementKind::Pipe => &self.network.pipes().get(address.id.index)?.from,
            ElementKind::Load => &self.network.loads().get(address.id.index)?.node,
            ElementKind::Feeder => &self.network.feeders().get(address.id.index)?.node,
        };
        self.network.node_by_name(node).map(|node| node.level)
    }

    fn derived(&self, address: &GasAddress) -> Result<f64, NodeError> {
        let stale = || NodeError::StaleResult {
            name: address.to_string(),
        };
        let solution = self.solution.as_ref().ok_or_else(stale)?;
        let key = address.element.as_str();

        let value = match (address.id.kind, address.field) {
            (ElementKind::Node, GasField::Pressure) => solution.pressures.get(key).map(pa),
            (ElementKind::Node, GasField::MassFlow) => solution.node_flows.get(key).map(kg_s),
            (ElementKind::Pipe, GasField::MassFlow) => solution.pipe_flows.get(key).map(kg_s),
            (ElementKind::Load, GasField::MassFlow) => solution.load_flows.get(key).map(kg_s),
            (ElementKind::Feeder, GasField::MassFlow) => solution.feeder_flows.get(key).map(kg_s),
            _ => None,
        };
        value.ok_or_else(stale)
    }
}

impl<F: FlowSolver> ModelBinding for GasGridBinding<F> {
    type Address = GasAddress;

    fn kind(&self) -> &'static str {
        "gas_grid"
    }

    fn resolve(&self, name: &AttributeName) -> Result<GasAddress, NodeError> {
        let AttributeName::Composite { element, field } = name else {
            return Err(NodeError::unknown(name));
        };

        let address = self
            .network
            .find(element)
            .and_then(|id| {
                GasField::of(id.kind, field).map(|field| GasAddress {
                    element: element.clone(),
                    id,
                    field,
                })
            })
            .ok_or_else(|| NodeError::unknown(name))?;

        if self.element_level(&address) == Some(self.level) {
            Ok(address)
        } else {
            Err(NodeError::unknown(name))
        }
    }

    fn write(&mut self, address: &GasAddress, value: f64) -> Result<(), NodeError> {
        let invalid = |reason: &str| NodeError::InvalidValue {
            name: address.to_string(),
            value,
            reason: reason.to_owned(),
        };
        let missing = || NodeError::unknown(address);
        let index = address.id.index;

        match (address.id.kind, address.field) {
            (ElementKind::Load, GasField::Demand) => {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(invalid("demand must be non-negative"));
                }
                self.network.load_mut(index).ok_or_else(missing)?.demand =
                    Power::new::<kilowatt>(value);
            }
            (ElementKind::Load, GasField::Scaling) => {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(invalid("scaling must be non-negative"));
                }
                self.network.load_mut(index).ok_or_else(missing)?.scaling = value;
            }
            (ElementKind::Feeder, GasField::Pressure) => {
                if !value.is_finite() {
                    return Err(invalid("pressure must be finite"));
                }
                if self.level.is_squared() && value <= 0.0 {
                    return Err(invalid("absolute pressure must be positive"));
                }
                self.network.feeder_mut(index).ok_or_else(missing)?.pressure =
                    Pressure::new::<pascal>(value);
            }
            _ => {
                return Err(NodeError::ReadOnly {
                    name: address.to_string(),
                });
            }
        }
        Ok(())
    }

    fn read(&self, address: &GasAddress, _now: DateTime) -> Result<f64, NodeError> {
        let index = address.id.index;
        let set_point = match (address.id.kind, address.field) {
            (ElementKind::Load, GasField::Demand) => {
                self.network.loads().get(index).map(|load| load.demand.get::<kilowatt>())
            }
            (ElementKind::Load, GasField::Scaling) => {
                self.network.loads().get(index).map(|load| load.scaling)
            }
            (ElementKind::Feeder, GasField::Pressure) => self
                .network
                .feeders()
                .get(index)
                .map(|feeder| feeder.pressure.get::<pascal>()),
            _ => return self.derived(address),
        };
        set_point.ok_or_else(|| NodeError::unknown(address))
    }

    fn advance(&mut self, now: DateTime) -> Result<Outputs, NodeError> {
        let solution = match self.solver.solve(&self.network, self.level) {
            Ok(solution) => solution,
            Err(err) => {
                self.solution = None;
                return Err(NodeError::Solve(err.to_string()));
            }
        };

        let outputs: Outputs = solution
            .pressures
            .iter()
            .map(|(node, pressure)| (format!("{node}{SEPARATOR}P"), pa(pressure)))
            .chain(
                solution
                    .pipe_flows
                    .iter()
                    .map(|(pipe, flow)| (format!("{pipe}{SEPARATOR}m_dot"), kg_s(flow))),
            )
            .collect();

        debug!(
            "solved gas grid at {now} in {} sweeps",
            solution.diagnostics.sweeps
        );

        self.solution = Some(solution);
        Ok(outputs)
    }
}

fn pa(pressure: &Pressure) -> f64 {
    pressure.get::<pascal>()
}

fn kg_s(flow: &MassRate) -> f64 {
    flow.get::<kilogram_per_second>()
}
