//! JSON files handed to downstream tooling.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use modenet_network::LinkId;
use serde::{Serialize, Serializer};

use super::{CorrelationRecord, CorrelationReport, ExternalId};

/// Write one record per requested id with its found flag.
pub fn write_report_json<W: Write>(report: &CorrelationReport, writer: W) -> serde_json::Result<()> {
    let records: &[CorrelationRecord] = &report.records;
    serde_json::to_writer_pretty(writer, records)
}

/// Write the id → ordered link ids mapping as a JSON array of
/// `{"external_id", "links"}` records, in id order. Ids keep their JSON
/// type, so `1001` and `"1001"` stay distinct entries.
pub fn write_mapping_json<W: Write>(report: &CorrelationReport, writer: W) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, &Mapping(&report.mapping))
}

#[derive(Serialize)]
struct MappingEntry<'a> {
    external_id: &'a ExternalId,
    links: &'a BTreeSet<LinkId>,
}

struct Mapping<'a>(&'a BTreeMap<ExternalId, BTreeSet<LinkId>>);

impl Serialize for Mapping<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.0
                .iter()
                .map(|(external_id, links)| MappingEntry { external_id, links }),
        )
    }
}

pub(super) fn serialize_mapping<S: Serializer>(
    mapping: &BTreeMap<ExternalId, BTreeSet<LinkId>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    Mapping(mapping).serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report() -> CorrelationReport {
        let mut report = CorrelationReport::default();
        for (id, links) in [
            (ExternalId::Integer(1001), vec!["b", "a"]),
            (ExternalId::Integer(1002), vec![]),
            (ExternalId::Text("1001".into()), vec!["t"]),
        ] {
            report.records.push(CorrelationRecord {
                external_id: id.clone(),
                found: !links.is_empty(),
            });
            report
                .mapping
                .insert(id, links.into_iter().map(LinkId::new).collect());
        }
        report
    }

    #[test]
    fn test_report_json_has_found_flags() {
        let mut buffer = Vec::new();
        write_report_json(&report(), &mut buffer).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(json[0]["external_id"], 1001);
        assert_eq!(json[0]["found"], true);
        assert_eq!(json[1]["found"], false);
        assert_eq!(json[2]["external_id"], "1001");
    }

    #[test]
    fn test_mapping_json_keeps_id_types_apart() {
        let mut buffer = Vec::new();
        write_mapping_json(&report(), &mut buffer).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(
            json,
            json!([
                { "external_id": 1001, "links": ["a", "b"] },
                { "external_id": 1002, "links": [] },
                { "external_id": "1001", "links": ["t"] },
            ])
        );
    }

    #[test]
    fn test_report_serialises_float_ids() {
        let mut report = CorrelationReport::default();
        report
            .mapping
            .insert(ExternalId::Float(1001.5), BTreeSet::from([LinkId::new("f")]));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mapping"][0]["external_id"], 1001.5);
    }
}
