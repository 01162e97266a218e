use std::fs;

use approx::assert_relative_eq;
use cosim_core::{InitValue, NodeAdapter, NodeError};
use cosim_gas::{GasNetwork, NodalSolver, PressureLevel};
use cosim_nodes::{GasGridBinding, GasGridFactory, InMemoryTopology, JsonDirectoryStore};
use integration_tests::{init_logging, init_values, scratch_dir, two_node_network};

fn gas_node() -> NodeAdapter<GasGridBinding<NodalSolver>> {
    let store = InMemoryTopology::new().with_network("grid", two_node_network());
    let init = init_values([("network_id", InitValue::from("grid"))]);
    NodeAdapter::initialize(init, &GasGridFactory::new(store)).unwrap()
}

#[test]
fn load_demand_produces_pipe_flow() {
    init_logging();
    let mut node = gas_node();

    node.set_attribute("gas_load_1/demand", 10.0).unwrap();
    node.step(60.0, &mut ()).unwrap();

    let flow = node.get_attribute("gas_pipe_AB/m_dot").unwrap();
    assert!(flow > 0.0);
    assert_relative_eq!(flow, 10.0e3 / 50.0e6, max_relative = 1e-6);
}

#[test]
fn flow_rises_monotonically_with_demand() {
    init_logging();
    let mut node = gas_node();

    let mut last_flow = 0.0;
    let mut last_pressure = f64::INFINITY;
    for (i, demand) in [5.0, 10.0, 20.0, 40.0].into_iter().enumerate() {
        node.set_attribute("gas_load_1/demand", demand).unwrap();
        node.step(60.0 * (i + 1) as f64, &mut ()).unwrap();

        let flow = node.get_attribute("gas_pipe_AB/m_dot").unwrap();
        let pressure = node.get_attribute("gas_node_B/P").unwrap();
        assert!(flow > last_flow);
        assert!(pressure < last_pressure);
        last_flow = flow;
        last_pressure = pressure;
    }
}

#[test]
fn unchanged_inputs_give_identical_outputs() {
    init_logging();
    let mut node = gas_node();
    node.set_attribute("gas_load_1/demand", 15.0).unwrap();

    let mut runs = Vec::new();
    for elapsed in [60.0, 120.0, 180.0] {
        let mut saved = Vec::new();
        node.step(elapsed, &mut |attribute: &str, value: f64| {
            saved.push((attribute.to_owned(), value.to_bits()));
        })
        .unwrap();
        runs.push(saved);
    }

    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[1], runs[2]);
}

#[test]
fn scaling_halves_the_drawn_flow() {
    init_logging();
    let mut node = gas_node();

    node.set_attribute("gas_load_1/demand", 20.0).unwrap();
    node.set_attribute("gas_load_1/scaling", 0.5).unwrap();
    node.step(60.0, &mut ()).unwrap();

    assert_relative_eq!(node.get_attribute("gas_load_1/m_dot").unwrap(), 2.0e-4);
}

#[test]
fn bad_set_points_are_recoverable() {
    init_logging();
    let mut node = gas_node();

    assert!(matches!(
        node.set_attribute("gas_load_1/demand", f64::NAN),
        Err(NodeError::InvalidValue { .. })
    ));
    assert!(matches!(
        node.set_attribute("gas_pipe_ZZ/m_dot", 1.0),
        Err(NodeError::UnknownAttribute { .. })
    ));

    node.set_attribute("gas_load_1/demand", 10.0).unwrap();
    node.step(60.0, &mut ()).unwrap();
    assert!(node.get_attribute("gas_pipe_AB/m_dot").unwrap() > 0.0);
}

#[test]
fn network_is_read_from_topology_directory() {
    init_logging();
    let dir = scratch_dir("topology").unwrap();
    fs::write(
        dir.join("42.json"),
        serde_json::to_string_pretty(&two_node_network()).unwrap(),
    )
    .unwrap();

    let init = init_values([
        ("network_id", InitValue::from(42_i64)),
        (
            "topology_dir",
            InitValue::from(dir.to_string_lossy().into_owned()),
        ),
        ("level", InitValue::from("BP")),
    ]);
    let mut node = NodeAdapter::initialize(init, &GasGridFactory::new(JsonDirectoryStore)).unwrap();

    node.set_attribute("gas_load_1/demand", 10.0).unwrap();
    node.step(900.0, &mut ()).unwrap();
    assert!(node.get_attribute("gas_pipe_AB/m_dot").unwrap() > 0.0);
    assert_eq!(node.binding().level(), PressureLevel::Low);
}

#[test]
fn network_without_feeder_fails_to_initialize() {
    init_logging();
    let mut record = two_node_network();
    record.feeders.clear();
    assert!(GasNetwork::from_record(record.clone()).is_ok());

    let store = InMemoryTopology::new().with_network("grid", record);
    let init = init_values([("network_id", InitValue::from("grid"))]);

    assert!(matches!(
        NodeAdapter::initialize(init, &GasGridFactory::new(store)),
        Err(NodeError::Solve(_))
    ));
}
