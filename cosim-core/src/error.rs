use thiserror::Error;

use crate::attribute::AttributeError;

/// Errors raised while reading initialization parameters or acquiring the
/// resources a node binds to.
///
/// Configuration errors are always fatal: a node that cannot be configured
/// never reaches the `Ready` state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required initialization parameter is absent.
    #[error("missing required parameter `{key}`")]
    MissingParameter { key: String },

    /// A parameter is present but has the wrong type or an invalid value.
    #[error("invalid parameter `{key}`: {reason}")]
    InvalidParameter { key: String, reason: String },

    /// A bound resource (data file, topology store, network) could not be loaded.
    #[error("resource `{resource}` is unavailable: {reason}")]
    Unavailable { resource: String, reason: String },

    /// Loaded data could not be parsed or failed validation.
    #[error("parse error: {0}")]
    Parse(String),
}

/// The error taxonomy of a co-simulation node.
///
/// Every failure surfaces to the orchestrator; a node never substitutes a
/// default for a failed read. Use [`NodeError::is_fatal`] to tell errors
/// that end the node's run from errors scoped to a single call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NodeError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The attribute name does not resolve to any field of the node.
    #[error("unknown attribute `{name}`")]
    UnknownAttribute { name: String },

    /// The value is outside the domain of the addressed field.
    #[error("invalid value {value} for `{name}`: {reason}")]
    InvalidValue {
        name: String,
        value: f64,
        reason: String,
    },

    /// The attribute exists but cannot be written.
    #[error("attribute `{name}` is read-only")]
    ReadOnly { name: String },

    /// No result has been computed yet for the attribute.
    #[error("no computed result available for `{name}`")]
    StaleResult { name: String },

    /// The reference table has no entry at the current timestamp.
    #[error("no reference value for `{name}` at {timestamp}")]
    MissingReference { name: String, timestamp: String },

    /// A step requested an elapsed offset behind the node's current offset.
    #[error("cannot step to {requested}s when the node is already at {current}s")]
    TimeOrdering { requested: f64, current: f64 },

    /// An elapsed offset could not be turned into a timestamp.
    #[error("invalid simulated time: {reason}")]
    InvalidTime { reason: String },

    /// The bound model failed to compute its derived quantities.
    #[error("solve failed: {0}")]
    Solve(String),

    /// The node has terminated and no longer serves requests.
    #[error("node has terminated")]
    Terminated,

    /// The node answered a command with a reply that does not fit it.
    #[error("unexpected reply to {command}")]
    UnexpectedReply { command: String },
}

impl NodeError {
    /// Returns `true` if this error ends the node's run.
    ///
    /// Attribute-level errors are scoped to the triggering call and the node
    /// keeps serving other attributes. All other errors terminate the node.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::UnknownAttribute { .. } | Self::InvalidValue { .. } | Self::ReadOnly { .. }
        )
    }

    /// Convenience constructor for [`NodeError::UnknownAttribute`].
    pub fn unknown(name: impl ToString) -> Self {
        Self::UnknownAttribute {
            name: name.to_string(),
        }
    }
}

impl From<AttributeError> for NodeError {
    fn from(err: AttributeError) -> Self {
        let name = match err {
            AttributeError::Empty => String::new(),
            AttributeError::TooManySeparators { name } | AttributeError::EmptyPart { name } => {
                name
            }
        };
        Self::UnknownAttribute { name }
    }
}

/// Convenience alias for `Result<T, NodeError>`.
pub type NodeResult<T> = Result<T, NodeError>;
