use thiserror::Error;

/// Errors raised while building a [`GasNetwork`] from a record.
///
/// [`GasNetwork`]: crate::GasNetwork
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error("element name `{name}` is used more than once")]
    DuplicateName { name: String },

    #[error("element `{name}` must start with `{expected}`")]
    WrongPrefix { name: String, expected: &'static str },

    #[error("element `{element}` references unknown node `{node}`")]
    UnknownNode { element: String, node: String },

    #[error("pipe `{pipe}` connects node `{node}` to itself")]
    SelfLoop { pipe: String, node: String },

    #[error("pipe `{pipe}` connects nodes at different pressure levels")]
    MixedLevels { pipe: String },

    #[error("element `{element}` has invalid {quantity}: {value}")]
    InvalidQuantity {
        element: String,
        quantity: &'static str,
        value: f64,
    },

    #[error("malformed network record: {0}")]
    Parse(String),
}
