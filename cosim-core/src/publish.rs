/// Receives attribute values a node proactively publishes after a step.
///
/// The orchestrator's "save" signal: after recomputing, a node surfaces each
/// newly computed attribute so downstream nodes can consume it without an
/// explicit pull.
///
/// Closures automatically implement `Publisher`, and the built-in impl for
/// `()` discards everything.
pub trait Publisher {
    /// Publishes the current value of `attribute`.
    fn save(&mut self, attribute: &str, value: f64);
}

/// Blanket implementation for publisher closures.
impl<F> Publisher for F
where
    F: FnMut(&str, f64),
{
    fn save(&mut self, attribute: &str, value: f64) {
        self(attribute, value);
    }
}

/// A no-op publisher.
impl Publisher for () {
    fn save(&mut self, _attribute: &str, _value: f64) {}
}
