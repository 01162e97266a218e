use log::{debug, error, info};

use crate::{
    attribute::AttributeName,
    binding::{BindingFactory, ModelBinding},
    error::NodeError,
    init::InitValues,
    publish::Publisher,
    store::AttributeStore,
    time::TimeSource,
};

/// Lifecycle state of a [`NodeAdapter`].
///
/// `Uninitialized` has no runtime representation: an adapter only exists once
/// [`NodeAdapter::initialize`] succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Initialized, or inputs staged since the last step.
    Ready,
    /// A step completed and derived values are current.
    Stepped,
    /// Shut down by the orchestrator or by a fatal error.
    Terminated,
}

/// Makes a [`ModelBinding`] look like a uniform stepping unit.
///
/// The adapter owns the node's [`TimeSource`], [`AttributeStore`], and binding
/// for its whole lifetime and implements the contract the orchestrator drives:
///
/// ```text
/// initialize → { set_attribute*, step, get_attribute* }* → terminate
/// ```
///
/// Errors that [`NodeError::is_fatal`] classifies as fatal move the adapter to
/// [`NodeState::Terminated`]; every later call fails with
/// [`NodeError::Terminated`].
#[derive(Debug)]
pub struct NodeAdapter<B: ModelBinding> {
    init: InitValues,
    time: TimeSource,
    binding: B,
    store: AttributeStore<B::Address>,
    state: NodeState,
    steps: usize,
}

impl<B: ModelBinding> NodeAdapter<B> {
    /// Initializes a node from its parameters.
    ///
    /// Reads the required `start_date`, builds the binding through `factory`,
    /// and runs one initial recomputation so attribute reads are valid before
    /// the first step. Nothing is published for the initial recomputation.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::Configuration`] if parameters are missing or the
    /// bound resource cannot be loaded, or the binding's error if the initial
    /// recomputation fails.
    pub fn initialize<F>(init: InitValues, factory: &F) -> Result<Self, NodeError>
    where
        F: BindingFactory<Binding = B>,
    {
        let time = TimeSource::from_init(&init)?;
        let mut binding = factory.build(&init)?;
        let computed = binding.advance(time.now())?;

        info!(
            "initialized {} node at {} ({} computed attributes)",
            binding.kind(),
            time.origin(),
            computed.len()
        );

        let mut store = AttributeStore::default();
        store.replace_computed(computed);

        Ok(Self {
            init,
            time,
            binding,
            store,
            state: NodeState::Ready,
            steps: 0,
        })
    }

    /// The parameters this node was initialized with.
    #[must_use]
    pub fn init_values(&self) -> &InitValues {
        &self.init
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// The node's simulated clock.
    #[must_use]
    pub fn time(&self) -> &TimeSource {
        &self.time
    }

    /// The bound model.
    #[must_use]
    pub fn binding(&self) -> &B {
        &self.binding
    }

    /// The node's attribute state.
    #[must_use]
    pub fn store(&self) -> &AttributeStore<B::Address> {
        &self.store
    }

    /// Number of completed steps.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Stages a new value for an attribute.
    ///
    /// The write is reflected in derived outputs only after the next step.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::UnknownAttribute`] if the name does not resolve,
    /// [`NodeError::InvalidValue`] if the value is not finite or outside the
    /// field's domain, and [`NodeError::ReadOnly`] for output-only fields.
    pub fn set_attribute(&mut self, name: &str, value: f64) -> Result<(), NodeError> {
        self.ensure_live()?;

        let result = self.write(name, value);
        if result.is_ok() {
            self.state = NodeState::Ready;
        }
        self.guard(result)
    }

    /// Reads an attribute at the node's current simulated time.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::UnknownAttribute`] for unresolved names, or the
    /// binding's error if no value is available (for example
    /// [`NodeError::StaleResult`] or [`NodeError::MissingReference`]).
    pub fn get_attribute(&mut self, name: &str) -> Result<f64, NodeError> {
        self.ensure_live()?;

        let result = self.read(name);
        self.guard(result)
    }

    /// Advances the node to `elapsed_seconds` and recomputes derived values.
    ///
    /// Each recomputed attribute is handed to `publisher` before the new
    /// values replace the previous ones in the store.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::TimeOrdering`] if time would move backwards, or
    /// the binding's error if recomputation fails. Both are fatal.
    pub fn step(
        &mut self,
        elapsed_seconds: f64,
        publisher: &mut impl Publisher,
    ) -> Result<(), NodeError> {
        self.ensure_live()?;

        let result = self.advance(elapsed_seconds, publisher);
        if result.is_ok() {
            self.state = NodeState::Stepped;
            self.steps += 1;
        }
        self.guard(result)
    }

    /// Shuts the node down. Later calls fail with [`NodeError::Terminated`].
    pub fn terminate(&mut self) {
        if self.state != NodeState::Terminated {
            info!(
                "terminating {} node after {} steps",
                self.binding.kind(),
                self.steps
            );
            self.state = NodeState::Terminated;
        }
    }

    fn write(&mut self, name: &str, value: f64) -> Result<(), NodeError> {
        if !value.is_finite() {
            return Err(NodeError::InvalidValue {
                name: name.to_owned(),
                value,
                reason: "value must be finite".to_owned(),
            });
        }

        let address = self.address(name)?;
        self.binding.write(&address, value)?;
        self.store.record_set(name, value);
        Ok(())
    }

    fn read(&mut self, name: &str) -> Result<f64, NodeError> {
        let address = self.address(name)?;
        let value = self.binding.read(&address, self.time.now())?;
        self.store.record_read(name, value);
        Ok(value)
    }

    fn advance(
        &mut self,
        elapsed_seconds: f64,
        publisher: &mut impl Publisher,
    ) -> Result<(), NodeError> {
        let now = self.time.advance_to(elapsed_seconds)?;

        let computed = match self.binding.advance(now) {
            Ok(computed) => computed,
            Err(err) => {
                self.store.clear_computed();
                return Err(err);
            }
        };

        for (attribute, value) in &computed {
            publisher.save(attribute, *value);
        }

        debug!(
            "stepped {} node to {elapsed_seconds}s ({now}), published {} attributes",
            self.binding.kind(),
            computed.len()
        );

        self.store.replace_computed(computed);
        Ok(())
    }

    /// Resolves a raw name, reusing the cached address when available.
    fn address(&mut self, raw: &str) -> Result<B::Address, NodeError> {
        if let Some(address) = self.store.address(raw) {
            return Ok(address.clone());
        }

        let name = AttributeName::parse(raw)?;
        let address = self.binding.resolve(&name)?;
        Ok(self.store.remember_address(raw, address))
    }

    fn ensure_live(&self) -> Result<(), NodeError> {
        if self.state == NodeState::Terminated {
            Err(NodeError::Terminated)
        } else {
            Ok(())
        }
    }

    /// Terminates the node if `result` holds a fatal error.
    fn guard<T>(&mut self, result: Result<T, NodeError>) -> Result<T, NodeError> {
        if let Err(err) = &result {
            if err.is_fatal() {
                error!("{} node failed: {err}", self.binding.kind());
                self.terminate();
            }
        }
        result
    }
}
