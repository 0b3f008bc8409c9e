//! End-to-end tests on a complete harness description

use harness_compiler::bom::{to_tsv, BomCategory};
use harness_compiler::model::{Quantity, Side};
use harness_compiler::{compile, compile_with_config, BomOptions, CompileConfig, Harness};
use pretty_assertions::assert_eq;

const SENSOR: &str = include_str!("fixtures/sensor.yml");

fn sensor() -> Harness {
    compile(SENSOR).expect("Should compile sensor harness")
}

#[test]
fn test_instances_in_registration_order() {
    let harness = sensor();
    let connectors: Vec<&str> = harness.connectors.keys().map(String::as_str).collect();
    assert_eq!(
        connectors,
        vec!["X1", "X2", "X3", "AUTOGENERATED_F_1", "AUTOGENERATED_F_2"]
    );
    let cables: Vec<&str> = harness.cables.keys().map(String::as_str).collect();
    assert_eq!(cables, vec!["W1", "W2"]);
    // F is only a template, never an instance of its own
    assert!(harness.connector("F").is_none());
}

#[test]
fn test_pins_match_pincount() {
    let harness = sensor();
    for connector in harness.connectors.values() {
        let mut ids: Vec<&str> = connector.pins.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), connector.pincount());
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), connector.pincount(), "{}", connector.designator);
    }
}

#[test]
fn test_connection_sets_expand() {
    let harness = sensor();
    assert_eq!(harness.connections.len(), 7);

    let first: Vec<(&str, &str)> = harness.connections[0]
        .endpoints
        .iter()
        .map(|e| (e.designator.as_str(), e.id.as_str()))
        .collect();
    assert_eq!(first, vec![("X1", "1"), ("W1", "1"), ("X2", "1")]);

    let shield = &harness.connections[4];
    assert_eq!(shield.set, 2);
    assert_eq!(shield.endpoints[1].id, "s");

    let ferrules: Vec<&str> = harness.connections[5..]
        .iter()
        .map(|c| c.endpoints[2].designator.as_str())
        .collect();
    assert_eq!(ferrules, vec!["AUTOGENERATED_F_1", "AUTOGENERATED_F_2"]);
    assert_eq!(harness.connections_of("X1").count(), 5);
}

#[test]
fn test_pins_and_ports_are_activated() {
    let harness = sensor();
    let x1 = harness.connector("X1").expect("Should have X1");
    let counts: Vec<usize> = x1.pins.iter().map(|p| p.connection_count).collect();
    assert_eq!(counts, vec![2, 1, 1, 1]);
    assert!(x1.ports_right);
    assert!(!x1.ports_left);

    let x2 = harness.connector("X2").expect("Should have X2");
    assert!(x2.ports_left);
    assert!(!x2.ports_right);

    let x3 = harness.connector("X3").expect("Should have X3");
    assert_eq!(x3.populated_pins(), 2);
    assert_eq!(x3.pins[1].connection_count, 0);
}

#[test]
fn test_wire_links() {
    let harness = sensor();
    let w1 = harness.cable("W1").expect("Should have W1");
    assert_eq!(w1.links.len(), 5);
    let shield = &w1.links[4];
    assert_eq!(shield.wire, 4);
    assert_eq!(shield.from.as_ref().map(|p| p.id.as_str()), Some("1"));
    assert!(shield.to.is_none());
    assert_eq!(w1.terminations(), 9);

    let w2 = harness.cable("W2").expect("Should have W2");
    let ends: Vec<(String, String)> = w2
        .links
        .iter()
        .map(|l| {
            let from = l.from.as_ref().map(|p| format!("{}:{}", p.designator, p.id));
            let to = l.to.as_ref().map(|p| p.designator.clone());
            (from.unwrap_or_default(), to.unwrap_or_default())
        })
        .collect();
    assert_eq!(
        ends,
        vec![
            ("X3:1".to_string(), "AUTOGENERATED_F_1".to_string()),
            ("X3:3".to_string(), "AUTOGENERATED_F_2".to_string()),
        ]
    );
}

#[test]
fn test_colors_from_code_and_list() {
    let harness = sensor();
    let w1 = harness.cable("W1").expect("Should have W1");
    let colors: Vec<Option<&str>> = w1.wires.iter().map(|w| w.color.as_deref()).collect();
    assert_eq!(colors, vec![Some("WH"), Some("BN"), Some("GN"), Some("YE"), None]);
    assert_eq!(w1.wirecount(), 4);
    assert_eq!(w1.wires[4].label, "Shield");
}

#[test]
fn test_autogenerated_instances_hide_names() {
    let harness = sensor();
    let ferrule = harness
        .connector("AUTOGENERATED_F_1")
        .expect("Should have a ferrule");
    assert!(ferrule.autogenerated);
    assert!(!ferrule.show_name);
    assert!(!ferrule.autogenerate);
    assert_eq!(ferrule.template, "F");
    assert!(harness.connector("X1").is_some_and(|c| c.show_name));
}

#[test]
fn test_bom_consolidates_identical_parts() {
    let harness = sensor();
    let bom = &harness.bom;
    assert_eq!(bom.len(), 9);

    let kk = bom.get(3).expect("Should have item 3");
    assert_eq!(kk.description, "Connector, Molex KK 254, female, 4 pins");
    assert_eq!(kk.qty, Quantity::count(2.0));
    assert_eq!(kk.designator_list(), vec!["X1", "X2"]);
    assert_eq!(bom.id_of("X1"), Some(3));
    assert_eq!(bom.id_of("X2"), Some(3));

    let crimps = bom.get(8).expect("Should have item 8");
    assert_eq!(crimps.category, BomCategory::Additional);
    assert_eq!(crimps.qty, Quantity::count(8.0));

    let shrink = bom.get(9).expect("Should have item 9");
    assert_eq!(shrink.qty, Quantity::new(0.05, Some("m".to_string())));
}

#[test]
fn test_bom_tsv() {
    let harness = sensor();
    let options = BomOptions::new().with_empty_columns_filtered(true);
    assert_eq!(
        to_tsv(&harness.bom, &options),
        include_str!("fixtures/sensor.tsv")
    );
}

#[test]
fn test_metadata_and_options_pass_through() {
    let harness = sensor();
    assert_eq!(harness.metadata["title"].as_str(), Some("Sensor breakout"));
    assert_eq!(harness.options["bgcolor"].as_str(), Some("WH"));
}

#[test]
fn test_compile_is_idempotent() {
    let first = sensor().to_json().expect("Should serialize");
    let second = sensor().to_json().expect("Should serialize");
    assert_eq!(first, second);
}

#[test]
fn test_color_mode_changes_descriptions() {
    let config = CompileConfig::new().with_color_mode(harness_compiler::color::ColorMode::Full);
    let harness = compile_with_config(SENSOR, &config).expect("Should compile");
    let wires: Vec<&str> = harness
        .bom
        .items
        .iter()
        .filter(|i| i.category == BomCategory::Wire)
        .map(|i| i.description.as_str())
        .collect();
    assert_eq!(wires, vec!["Wire, 0.25 mm², black", "Wire, 0.25 mm², red"]);
}

#[test]
fn test_loops_take_the_wired_side() {
    let harness = compile(
        r#"
connectors:
  X1:
    pincount: 4
    loops:
      - [3, 4]
  X2:
    pincount: 4
    loops:
      - {first: 1, second: 2, side: LEFT, label: bridge}
      - [3, 4]
cables:
  W1: {wirecount: 1}
connections:
  - [{X1: 1}, {W1: 1}, {X2: 4}]
"#,
    )
    .expect("Should compile");
    let x1 = harness.connector("X1").expect("Should have X1");
    assert_eq!(x1.loops[0].side, Some(Side::Right));
    assert_eq!(x1.populated_pins(), 3);

    let x2 = harness.connector("X2").expect("Should have X2");
    assert_eq!(x2.loops[0].side, Some(Side::Left));
    assert_eq!(x2.loops[0].label.as_deref(), Some("bridge"));
    assert_eq!(x2.loops[1].side, Some(Side::Left));
    assert_eq!(x2.pins[3].connection_count, 2);
}

#[test]
fn test_demo_compiles_with_demo_config() {
    let config = CompileConfig::from_str(include_str!("../demos/compiler.toml"))
        .expect("Should load config");
    let harness = compile_with_config(include_str!("../demos/power_distribution.yml"), &config)
        .expect("Should compile demo");

    let connectors: Vec<&str> = harness.connectors.keys().map(String::as_str).collect();
    assert_eq!(
        connectors,
        vec!["PSU", "L1", "L2", "AUTOGENERATED_FERRULE_1", "AUTOGENERATED_FERRULE_2"]
    );
    let psu = harness.connector("PSU").expect("Should have PSU");
    assert_eq!(psu.populated_pins(), 6);

    let wires: Vec<&str> = harness
        .bom
        .items
        .iter()
        .filter(|i| i.category == BomCategory::Wire)
        .map(|i| i.description.as_str())
        .collect();
    assert_eq!(wires, vec!["Wire, 20 AWG, black", "Wire, 20 AWG, red"]);
    assert_eq!(
        harness.cable("W1").and_then(|c| c.gauge_display()).as_deref(),
        Some("20 AWG (0.75 mm²)")
    );
}
