use std::collections::{BTreeMap, HashMap};

/// Per-node key/value state.
///
/// Holds, keyed by raw attribute name:
///
/// - the binding address each name resolved to, so names are validated once,
/// - the last value the orchestrator set,
/// - the last value computed or read back.
///
/// Computed values are replaced wholesale by [`AttributeStore::replace_computed`],
/// never merged, so the store always reflects one consistent step.
#[derive(Debug, Clone)]
pub struct AttributeStore<A> {
    addresses: HashMap<String, A>,
    last_set: BTreeMap<String, f64>,
    computed: BTreeMap<String, f64>,
}

impl<A> Default for AttributeStore<A> {
    fn default() -> Self {
        Self {
            addresses: HashMap::new(),
            last_set: BTreeMap::new(),
            computed: BTreeMap::new(),
        }
    }
}

impl<A: Clone> AttributeStore<A> {
    /// Returns the cached address for `name`, if it was resolved before.
    #[must_use]
    pub fn address(&self, name: &str) -> Option<&A> {
        self.addresses.get(name)
    }

    /// Caches a resolved address and returns a copy of it.
    pub fn remember_address(&mut self, name: &str, address: A) -> A {
        self.addresses.insert(name.to_owned(), address.clone());
        address
    }

    /// Records a value accepted by `set_attribute`.
    pub fn record_set(&mut self, name: &str, value: f64) {
        self.last_set.insert(name.to_owned(), value);
    }

    /// The last value set for `name`.
    #[must_use]
    pub fn last_set(&self, name: &str) -> Option<f64> {
        self.last_set.get(name).copied()
    }

    /// Records a single value read back by `get_attribute`.
    pub fn record_read(&mut self, name: &str, value: f64) {
        self.computed.insert(name.to_owned(), value);
    }

    /// Replaces every computed value with the results of one step.
    pub fn replace_computed(&mut self, computed: BTreeMap<String, f64>) {
        self.computed = computed;
    }

    /// Drops all computed values.
    pub fn clear_computed(&mut self) {
        self.computed.clear();
    }

    /// The last computed or read value for `name`.
    #[must_use]
    pub fn computed(&self, name: &str) -> Option<f64> {
        self.computed.get(name).copied()
    }

    /// Number of attributes holding a computed value.
    #[must_use]
    pub fn computed_len(&self) -> usize {
        self.computed.len()
    }
}
