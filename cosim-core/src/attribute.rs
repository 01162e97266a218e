use std::fmt;

use thiserror::Error;

/// Separator between the element and field parts of a composite attribute name.
pub const SEPARATOR: char = '/';

/// A parsed attribute name.
///
/// Orchestrators address node attributes with plain strings. Two shapes occur:
///
/// - A *simple* name, such as `demand`, resolving to a node-level field.
/// - A *composite* name of the form `<element>/<field>`, such as
///   `gas_pipe_AB/m_dot`, addressing one field on one element of the bound model.
///
/// Names are parsed once at the boundary and bindings resolve the parsed form,
/// so the string is never split again on the hot path.
///
/// # Examples
///
/// ```
/// use cosim_core::AttributeName;
///
/// let name = AttributeName::parse("gas_node_A/P").unwrap();
/// assert_eq!(name.element(), Some("gas_node_A"));
/// assert_eq!(name.field(), "P");
///
/// let name = AttributeName::parse("demand").unwrap();
/// assert_eq!(name.element(), None);
/// assert_eq!(name.field(), "demand");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeName {
    Simple(String),
    Composite { element: String, field: String },
}

/// Errors that can occur when parsing an attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("attribute name is empty")]
    Empty,

    #[error("attribute `{name}` has more than one `/` separator")]
    TooManySeparators { name: String },

    #[error("attribute `{name}` has an empty element or field part")]
    EmptyPart { name: String },
}

impl AttributeName {
    /// Parses a raw attribute name.
    ///
    /// # Errors
    ///
    /// Returns an [`AttributeError`] if the name is empty, has an empty part
    /// around the separator, or contains more than one separator.
    pub fn parse(raw: &str) -> Result<Self, AttributeError> {
        if raw.is_empty() {
            return Err(AttributeError::Empty);
        }

        let mut parts = raw.split(SEPARATOR);
        let first = parts.next().unwrap_or_default();

        match (parts.next(), parts.next()) {
            (None, _) => Ok(Self::Simple(raw.to_owned())),
            (Some(_), Some(_)) => Err(AttributeError::TooManySeparators {
                name: raw.to_owned(),
            }),
            (Some(field), None) => {
                if first.is_empty() || field.is_empty() {
                    return Err(AttributeError::EmptyPart {
                        name: raw.to_owned(),
                    });
                }
                Ok(Self::Composite {
                    element: first.to_owned(),
                    field: field.to_owned(),
                })
            }
        }
    }

    /// Builds a composite name from an element and a field.
    #[must_use]
    pub fn composite(element: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Composite {
            element: element.into(),
            field: field.into(),
        }
    }

    /// Returns the element part, or `None` for simple names.
    #[must_use]
    pub fn element(&self) -> Option<&str> {
        match self {
            Self::Simple(_) => None,
            Self::Composite { element, .. } => Some(element),
        }
    }

    /// Returns the field part (the whole name for simple names).
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Simple(name) => name,
            Self::Composite { field, .. } => field,
        }
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(name) => f.write_str(name),
            Self::Composite { element, field } => write!(f, "{element}{SEPARATOR}{field}"),
        }
    }
}
