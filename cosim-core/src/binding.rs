use std::{
    collections::BTreeMap,
    fmt::{Debug, Display},
};

use jiff::civil::DateTime;

use crate::{
    attribute::AttributeName,
    error::{ConfigError, NodeError},
    init::InitValues,
};

/// Attribute values produced by one recomputation, keyed by attribute name.
pub type Outputs = BTreeMap<String, f64>;

/// The domain-specific payload a [`NodeAdapter`] drives.
///
/// A binding wraps one model (a reference table, a network plus its solver)
/// and exposes the capabilities the adapter needs: resolving attribute names
/// to addresses, writing set points, reading values at a point in time, and
/// recomputing derived quantities.
///
/// # Contract
///
/// Implementations **must**:
/// - Resolve each name to at most one element; ambiguous lookups are errors.
/// - Stage writes: a written set point is reflected in derived values only
///   after the next [`ModelBinding::advance`].
/// - Replace derived values wholesale in `advance`, so reads never see a
///   partially updated result.
/// - Be deterministic: `advance` with unchanged inputs yields identical outputs.
///
/// [`NodeAdapter`]: crate::NodeAdapter
pub trait ModelBinding {
    /// A validated reference to one field of the bound model.
    type Address: Clone + Debug + Display;

    /// Short label used in logs.
    fn kind(&self) -> &'static str;

    /// Resolves a parsed attribute name to an address.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::UnknownAttribute`] if the name does not address
    /// any field of the bound model.
    fn resolve(&self, name: &AttributeName) -> Result<Self::Address, NodeError>;

    /// Writes a value into the addressed field.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::ReadOnly`] for fields that cannot be written and
    /// [`NodeError::InvalidValue`] for values outside the field's domain.
    fn write(&mut self, address: &Self::Address, value: f64) -> Result<(), NodeError>;

    /// Reads the addressed field at the simulated timestamp `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if no value exists for the field at `now`, or if a
    /// derived value is requested before anything has been computed.
    fn read(&self, address: &Self::Address, now: DateTime) -> Result<f64, NodeError>;

    /// Recomputes derived quantities for the current inputs at `now`.
    ///
    /// Returns the attributes to publish to the orchestrator. Bindings that
    /// do not compute anything return an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::Solve`] if the recomputation fails.
    fn advance(&mut self, now: DateTime) -> Result<Outputs, NodeError>;
}

/// Builds a [`ModelBinding`] from a node's initialization parameters.
///
/// Factories carry the injected resources a binding needs (reference data
/// source, topology store, solver) so bindings never read fixed paths.
///
/// Closures automatically implement `BindingFactory`.
pub trait BindingFactory {
    type Binding: ModelBinding;

    /// Builds the binding.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if required parameters are missing or the
    /// bound resource cannot be loaded.
    fn build(&self, init: &InitValues) -> Result<Self::Binding, ConfigError>;
}

/// Blanket implementation for factory closures.
impl<B, F> BindingFactory for F
where
    B: ModelBinding,
    F: Fn(&InitValues) -> Result<B, ConfigError>,
{
    type Binding = B;

    fn build(&self, init: &InitValues) -> Result<Self::Binding, ConfigError> {
        self(init)
    }
}
