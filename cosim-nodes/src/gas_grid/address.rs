use std::fmt;

use cosim_core::SEPARATOR;
use cosim_gas::{ElementId, ElementKind};

/// The fields a gas network element exposes as attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GasField {
    /// Pressure in Pa. Derived at nodes, a set point at feeders.
    Pressure,
    /// Mass flow in kg/s. Always derived.
    MassFlow,
    /// Load demand in kW. Settable.
    Demand,
    /// Load scaling factor. Settable.
    Scaling,
}

impl GasField {
    /// Looks up a field by its attribute code for an element kind.
    #[must_use]
    pub fn of(kind: ElementKind, code: &str) -> Option<Self> {
        match (kind, code) {
            (ElementKind::Node | ElementKind::Feeder, "P") => Some(Self::Pressure),
            (_, "m_dot") => Some(Self::MassFlow),
            (ElementKind::Load, "demand") => Some(Self::Demand),
            (ElementKind::Load, "scaling") => Some(Self::Scaling),
            _ => None,
        }
    }

    /// The attribute code of this field.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Pressure => "P",
            Self::MassFlow => "m_dot",
            Self::Demand => "demand",
            Self::Scaling => "scaling",
        }
    }
}

/// A resolved `element/field` attribute of a gas network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GasAddress {
    pub element: String,
    pub id: ElementId,
    pub field: GasField,
}

impl fmt::Display for GasAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.element, self.field.code())
    }
}
