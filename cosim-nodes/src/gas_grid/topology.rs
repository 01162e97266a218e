use std::{collections::BTreeMap, fs, path::Path};

use cosim_core::{ConfigError, InitValues};
use cosim_gas::NetworkRecord;

/// Parameter naming the network to load.
pub const NETWORK_ID_KEY: &str = "network_id";

/// Parameter naming the directory of JSON network records.
pub const TOPOLOGY_DIR_KEY: &str = "topology_dir";

/// Supplies the network record a gas grid node solves.
///
/// The record is read once when the node initializes and is never written
/// back.
pub trait TopologyStore {
    /// Loads the record of the network named by the node's `network_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the id is missing or the network cannot
    /// be found or parsed.
    fn network(&self, init: &InitValues) -> Result<NetworkRecord, ConfigError>;
}

/// Network records held in memory, keyed by network id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryTopology {
    networks: BTreeMap<String, NetworkRecord>,
}

impl InMemoryTopology {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the record stored under `id`.
    #[must_use]
    pub fn with_network(mut self, id: impl Into<String>, record: NetworkRecord) -> Self {
        self.networks.insert(id.into(), record);
        self
    }
}

impl TopologyStore for InMemoryTopology {
    fn network(&self, init: &InitValues) -> Result<NetworkRecord, ConfigError> {
        let id = init.require_id(NETWORK_ID_KEY)?;
        self.networks
            .get(&id)
            .cloned()
            .ok_or_else(|| ConfigError::Unavailable {
                resource: format!("network `{id}`"),
                reason: "not in the topology store".to_owned(),
            })
    }
}

/// Reads `<topology_dir>/<network_id>.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDirectoryStore;

impl TopologyStore for JsonDirectoryStore {
    fn network(&self, init: &InitValues) -> Result<NetworkRecord, ConfigError> {
        let dir = init.require_text(TOPOLOGY_DIR_KEY)?;
        let id = init.require_id(NETWORK_ID_KEY)?;
        let path = Path::new(dir).join(format!("{id}.json"));

        let text = fs::read_to_string(&path).map_err(|err| ConfigError::Unavailable {
            resource: path.display().to_string(),
            reason: err.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}
