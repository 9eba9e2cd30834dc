mod support;

use std::collections::BTreeSet;

use modenet_network::prelude::*;
use modenet_snapping::prelude::*;

use support::{init_tracing, street};

/// `street(3)` with OSM provenance: l0 and l1 share way 1001, l2 carries it
/// as a float.
fn tagged() -> Network {
    let mut network = street(3);
    network
        .modify_links(vec![
            ("l0".into(), LinkPatch::default().attribute("osm:way:id", 1001i64)),
            ("l1".into(), LinkPatch::default().attribute("osm:way:id", 1001i64)),
            ("l2".into(), LinkPatch::default().attribute("osm:way:id", 1001.0f64)),
        ])
        .unwrap();
    network
}

#[test]
fn test_found_flags_and_mapping() {
    init_tracing();
    let network = tagged();
    let ids = [ExternalId::Integer(1001), ExternalId::Integer(1002)];

    let report = correlate(network.graph(), &ids, &CorrelationConfig::default());

    assert!(report.found(&ids[0]));
    assert!(!report.found(&ids[1]));
    assert_eq!(
        report.links_for(&ids[0]),
        Some(&BTreeSet::from([LinkId::new("l0"), LinkId::new("l1")]))
    );
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].link, LinkId::new("l2"));
    assert!(report.to_string().contains("Correlated 1/2 external ids"));
}

#[test]
fn test_correlation_does_not_touch_the_network() {
    let network = tagged();
    let log_len = network.change_log().len();

    let _ = correlate(
        network.graph(),
        &[ExternalId::Integer(1001)],
        &CorrelationConfig::default(),
    );

    assert_eq!(network.change_log().len(), log_len);
}

#[test]
fn test_custom_attribute_key() {
    let mut network = street(1);
    network
        .modify_link_attributes(
            &"l0".into(),
            LinkPatch::default().attribute("source_id", "way/77"),
        )
        .unwrap();
    let config = CorrelationConfig {
        attribute_key: "source_id".to_owned(),
    };

    let report = correlate(network.graph(), &["way/77".into()], &config);

    assert!(report.is_complete());
}

#[test]
fn test_output_files() {
    let network = tagged();
    let report = correlate(
        network.graph(),
        &[ExternalId::Integer(1002), ExternalId::Integer(1001)],
        &CorrelationConfig::default(),
    );

    let mut records = Vec::new();
    write_report_json(&report, &mut records).unwrap();
    let records: serde_json::Value = serde_json::from_slice(&records).unwrap();
    assert_eq!(
        records,
        serde_json::json!([
            { "external_id": 1002, "found": false },
            { "external_id": 1001, "found": true },
        ])
    );

    let mut mapping = Vec::new();
    write_mapping_json(&report, &mut mapping).unwrap();
    let mapping: serde_json::Value = serde_json::from_slice(&mapping).unwrap();
    assert_eq!(
        mapping,
        serde_json::json!([
            { "external_id": 1001, "links": ["l0", "l1"] },
            { "external_id": 1002, "links": [] },
        ])
    );
}

#[test]
fn test_integer_and_text_ids_stay_apart_in_output() {
    let mut network = street(2);
    network
        .modify_links(vec![
            ("l0".into(), LinkPatch::default().attribute("osm:way:id", 1001i64)),
            ("l1".into(), LinkPatch::default().attribute("osm:way:id", "1001")),
        ])
        .unwrap();
    let ids = [ExternalId::Integer(1001), ExternalId::from("1001")];

    let report = correlate(network.graph(), &ids, &CorrelationConfig::default());
    assert!(report.is_complete());
    assert_eq!(report.warnings.len(), 2);

    let mut mapping = Vec::new();
    write_mapping_json(&report, &mut mapping).unwrap();
    let mapping: serde_json::Value = serde_json::from_slice(&mapping).unwrap();
    assert_eq!(
        mapping,
        serde_json::json!([
            { "external_id": 1001, "links": ["l0"] },
            { "external_id": "1001", "links": ["l1"] },
        ])
    );
}
