use std::fs;

use cosim_core::{InitValue, NodeAdapter, NodeError, NodeState};
use cosim_nodes::{JsonReferenceFile, PlaybackFactory};
use integration_tests::{init_logging, init_values, scratch_dir};

const REFERENCE: &str = r#"{
    "index": ["2019-01-01T00:00:00", "2019-01-01T00:01:00", "2019-01-01T00:02:00"],
    "columns": {
        "demand": [42.0, 43.5, 41.0],
        "outdoor_temperature": [-2.0, -2.5, -3.0]
    }
}"#;

fn playback_node(dir_name: &str) -> NodeAdapter<cosim_nodes::PlaybackBinding> {
    let dir = scratch_dir(dir_name).unwrap();
    let path = dir.join("reference.json");
    fs::write(&path, REFERENCE).unwrap();

    let init = init_values([(
        "data_path",
        InitValue::from(path.to_string_lossy().into_owned()),
    )]);
    NodeAdapter::initialize(init, &PlaybackFactory::new(JsonReferenceFile)).unwrap()
}

#[test]
fn lookup_follows_simulated_time() {
    init_logging();
    let mut node = playback_node("lookup");

    assert_eq!(node.get_attribute("demand"), Ok(42.0));
    node.step(60.0, &mut ()).unwrap();
    assert_eq!(node.get_attribute("demand"), Ok(43.5));
    assert_eq!(node.get_attribute("outdoor_temperature"), Ok(-2.5));
    assert_eq!(node.state(), NodeState::Stepped);
}

#[test]
fn stepping_to_the_same_offset_is_allowed() {
    init_logging();
    let mut node = playback_node("same-offset");

    node.step(120.0, &mut ()).unwrap();
    node.step(120.0, &mut ()).unwrap();
    assert_eq!(node.get_attribute("demand"), Ok(41.0));
    assert_eq!(node.steps(), 2);
}

#[test]
fn stepping_backwards_terminates_the_node() {
    init_logging();
    let mut node = playback_node("backwards");

    node.step(120.0, &mut ()).unwrap();
    assert_eq!(
        node.step(60.0, &mut ()),
        Err(NodeError::TimeOrdering {
            requested: 60.0,
            current: 120.0
        })
    );
    assert_eq!(node.state(), NodeState::Terminated);
    assert_eq!(node.get_attribute("demand"), Err(NodeError::Terminated));
}

#[test]
fn past_the_end_of_the_table_is_missing() {
    init_logging();
    let mut node = playback_node("past-end");

    node.step(600.0, &mut ()).unwrap();
    assert!(matches!(
        node.get_attribute("demand"),
        Err(NodeError::MissingReference { .. })
    ));
}

#[test]
fn unknown_attribute_keeps_the_node_serving() {
    init_logging();
    let mut node = playback_node("unknown");

    assert_eq!(
        node.get_attribute("cooling_demand"),
        Err(NodeError::UnknownAttribute {
            name: "cooling_demand".into()
        })
    );
    assert_eq!(node.state(), NodeState::Ready);
    assert_eq!(node.get_attribute("demand"), Ok(42.0));
}

#[test]
fn missing_start_date_fails_initialization() {
    init_logging();
    let init = [("data_path", "/unused.json")].into_iter().collect();

    assert!(matches!(
        NodeAdapter::initialize(init, &PlaybackFactory::new(JsonReferenceFile)),
        Err(NodeError::Configuration(_))
    ));
}
