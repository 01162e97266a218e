use std::fmt;

use uom::si::f64::{Length, Power, Pressure};

use crate::level::PressureLevel;

/// The kinds of element a gas network contains.
///
/// Element names carry their kind as an eight-character prefix, so any name
/// can be classified without consulting the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    Node,
    Pipe,
    Load,
    Feeder,
}

impl ElementKind {
    /// Length of the kind prefix on element names.
    pub const PREFIX_LEN: usize = 8;

    /// All kinds, in a fixed order.
    pub const ALL: [Self; 4] = [Self::Node, Self::Pipe, Self::Load, Self::Feeder];

    /// The name prefix identifying this kind.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Node => "gas_node",
            Self::Pipe => "gas_pipe",
            Self::Load => "gas_load",
            Self::Feeder => "gas_feed",
        }
    }

    /// Classifies an element name by its prefix.
    ///
    /// ```
    /// use cosim_gas::ElementKind;
    ///
    /// assert_eq!(ElementKind::of("gas_pipe_AB"), Some(ElementKind::Pipe));
    /// assert_eq!(ElementKind::of("gas_feeder_1"), Some(ElementKind::Feeder));
    /// assert_eq!(ElementKind::of("heat_pump"), None);
    /// ```
    #[must_use]
    pub fn of(name: &str) -> Option<Self> {
        let prefix = name.get(..Self::PREFIX_LEN)?;
        Self::ALL.into_iter().find(|kind| kind.prefix() == prefix)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Node => "node",
            Self::Pipe => "pipe",
            Self::Load => "load",
            Self::Feeder => "feeder",
        };
        f.write_str(label)
    }
}

/// Position of an element in its network's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    pub kind: ElementKind,
    pub index: usize,
}

/// A junction where pipes meet.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub level: PressureLevel,
}

/// A pipe between two nodes of the same pressure level.
///
/// Flow is counted positive from `from` to `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub name: String,
    pub from: String,
    pub to: String,
    pub length: Length,
    pub diameter: Length,
}

/// A consumer drawing gas at a node.
///
/// The drawn power is `demand · scaling`.
#[derive(Debug, Clone, PartialEq)]
pub struct Load {
    pub name: String,
    pub node: String,
    pub demand: Power,
    pub scaling: f64,
}

/// A supply point holding its node at a fixed pressure.
#[derive(Debug, Clone, PartialEq)]
pub struct Feeder {
    pub name: String,
    pub node: String,
    pub pressure: Pressure,
}
