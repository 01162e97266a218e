mod element;
mod error;
mod record;

pub use element::{ElementId, ElementKind, Feeder, Load, Node, Pipe};
pub use error::NetworkError;
pub use record::{FeederRecord, LoadRecord, NetworkRecord, NodeRecord, PipeRecord};

use std::collections::HashMap;

use uom::si::{
    f64::{Length, Power, Pressure},
    length::meter,
    power::kilowatt,
    pressure::pascal,
};

/// The in-memory element table of one gas network.
///
/// Holds the topology (nodes, pipes) and the operating set points (load
/// demands, feeder pressures). Every element name is unique across the whole
/// table and carries the prefix of its [`ElementKind`], so a name resolves to
/// exactly one element.
///
/// Only set points are mutable; topology is fixed once built.
#[derive(Debug, Clone, PartialEq)]
pub struct GasNetwork {
    nodes: Vec<Node>,
    pipes: Vec<Pipe>,
    loads: Vec<Load>,
    feeders: Vec<Feeder>,
    index: HashMap<String, ElementId>,
}

impl GasNetwork {
    /// Builds a network from its record, validating names, references, and quantities.
    ///
    /// # Errors
    ///
    /// Returns a [`NetworkError`] if names are duplicated or lack their kind
    /// prefix, a reference points to an unknown node, a pipe joins two levels
    /// or loops on one node, or a quantity is non-physical.
    pub fn from_record(record: NetworkRecord) -> Result<Self, NetworkError> {
        let mut network = Self {
            nodes: Vec::with_capacity(record.nodes.len()),
            pipes: Vec::with_capacity(record.pipes.len()),
            loads: Vec::with_capacity(record.loads.len()),
            feeders: Vec::with_capacity(record.feeders.len()),
            index: HashMap::new(),
        };

        for node in record.nodes {
            network.register(&node.name, ElementKind::Node, network.nodes.len())?;
            network.nodes.push(Node {
                name: node.name,
                level: node.level,
            });
        }

        for pipe in record.pipes {
            let from = network.node_named(&pipe.name, &pipe.from)?;
            let to = network.node_named(&pipe.name, &pipe.to)?;
            if pipe.from == pipe.to {
                return Err(NetworkError::SelfLoop {
                    pipe: pipe.name,
                    node: pipe.from,
                });
            }
            if from.level != to.level {
                return Err(NetworkError::MixedLevels { pipe: pipe.name });
            }
            strictly_positive(&pipe.name, "length", pipe.length_m)?;
            strictly_positive(&pipe.name, "diameter", pipe.diameter_m)?;

            network.register(&pipe.name, ElementKind::Pipe, network.pipes.len())?;
            network.pipes.push(Pipe {
                length: Length::new::<meter>(pipe.length_m),
                diameter: Length::new::<meter>(pipe.diameter_m),
                name: pipe.name,
                from: pipe.from,
                to: pipe.to,
            });
        }

        for load in record.loads {
            network.node_named(&load.name, &load.node)?;
            non_negative(&load.name, "demand", load.demand_kw)?;
            non_negative(&load.name, "scaling", load.scaling)?;

            network.register(&load.name, ElementKind::Load, network.loads.len())?;
            network.loads.push(Load {
                demand: Power::new::<kilowatt>(load.demand_kw),
                scaling: load.scaling,
                name: load.name,
                node: load.node,
            });
        }

        for feeder in record.feeders {
            network.node_named(&feeder.name, &feeder.node)?;
            if !feeder.pressure_pa.is_finite() {
                return Err(NetworkError::InvalidQuantity {
                    element: feeder.name,
                    quantity: "pressure",
                    value: feeder.pressure_pa,
                });
            }

            network.register(&feeder.name, ElementKind::Feeder, network.feeders.len())?;
            network.feeders.push(Feeder {
                pressure: Pressure::new::<pascal>(feeder.pressure_pa),
                name: feeder.name,
                node: feeder.node,
            });
        }

        Ok(network)
    }

    /// Parses and builds a network from its JSON record.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Parse`] for malformed JSON, or any error of
    /// [`GasNetwork::from_record`].
    pub fn from_json_str(text: &str) -> Result<Self, NetworkError> {
        let record: NetworkRecord =
            serde_json::from_str(text).map_err(|err| NetworkError::Parse(err.to_string()))?;
        Self::from_record(record)
    }

    /// Looks up an element by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<ElementId> {
        self.index.get(name).copied()
    }

    /// Looks up a node by name.
    #[must_use]
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        match self.find(name)? {
            ElementId {
                kind: ElementKind::Node,
                index,
            } => self.nodes.get(index),
            _ => None,
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    #[must_use]
    pub fn loads(&self) -> &[Load] {
        &self.loads
    }

    #[must_use]
    pub fn feeders(&self) -> &[Feeder] {
        &self.feeders
    }

    /// Mutable access to a load's set points.
    pub fn load_mut(&mut self, index: usize) -> Option<&mut Load> {
        self.loads.get_mut(index)
    }

    /// Mutable access to a feeder's set point.
    pub fn feeder_mut(&mut self, index: usize) -> Option<&mut Feeder> {
        self.feeders.get_mut(index)
    }

    /// Total number of elements of all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn register(&mut self, name: &str, kind: ElementKind, index: usize) -> Result<(), NetworkError> {
        if ElementKind::of(name) != Some(kind) {
            return Err(NetworkError::WrongPrefix {
                name: name.to_owned(),
                expected: kind.prefix(),
            });
        }
        if self.index.contains_key(name) {
            return Err(NetworkError::DuplicateName {
                name: name.to_owned(),
            });
        }
        self.index.insert(name.to_owned(), ElementId { kind, index });
        Ok(())
    }

    fn node_named(&self, element: &str, node: &str) -> Result<&Node, NetworkError> {
        self.node_by_name(node)
            .ok_or_else(|| NetworkError::UnknownNode {
                element: element.to_owned(),
                node: node.to_owned(),
            })
    }
}

fn strictly_positive(element: &str, quantity: &'static str, value: f64) -> Result<(), NetworkError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(NetworkError::InvalidQuantity {
            element: element.to_owned(),
            quantity,
            value,
        })
    }
}

fn non_negative(element: &str, quantity: &'static str, value: f64) -> Result<(), NetworkError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(NetworkError::InvalidQuantity {
            element: element.to_owned(),
            quantity,
            value,
        })
    }
}
