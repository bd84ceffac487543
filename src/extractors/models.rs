// src/extractors/models.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Year key, always four digits ("2024").
pub type Year = String;

/// Everything extracted from one download of the page.
///
/// Ordered maps keep the JSON key order stable between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub yearly_totals: BTreeMap<Year, u64>,
    /// At most 12 values per year, in document order.
    pub monthly_totals: BTreeMap<Year, Vec<u64>>,
    pub category_totals: BTreeMap<String, u64>,
    pub category_breakdowns: BTreeMap<String, BTreeMap<Year, u64>>,
    pub segments: BTreeMap<String, BTreeMap<Year, Vec<u64>>>,
    pub scraped_at: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub incidents: Vec<Incident>,
}

/// One row of the violations table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub date: String,
    pub location: String,
    pub summary: String,
}

impl Record {
    pub fn empty(scraped_at: impl Into<String>) -> Self {
        Self {
            yearly_totals: BTreeMap::new(),
            monthly_totals: BTreeMap::new(),
            category_totals: BTreeMap::new(),
            category_breakdowns: BTreeMap::new(),
            segments: BTreeMap::new(),
            scraped_at: scraped_at.into(),
            incidents: Vec::new(),
        }
    }

    /// Names of the sections that came back empty. A gap is not an error:
    /// the page simply had no markup for that section.
    pub fn gaps(&self) -> Vec<&'static str> {
        let mut gaps = Vec::new();
        if self.yearly_totals.is_empty() { gaps.push("yearly_totals"); }
        if self.monthly_totals.is_empty() { gaps.push("monthly_totals"); }
        if self.category_totals.is_empty() { gaps.push("category_totals"); }
        if self.category_breakdowns.is_empty() { gaps.push("category_breakdowns"); }
        if self.segments.is_empty() { gaps.push("segments"); }
        gaps
    }

    /// One-line count summary, e.g. "3 yearly totals, 2 monthly series, ...".
    pub fn summary(&self) -> String {
        format!(
            "{} yearly totals, {} monthly series, {} categories, {} segments, {} incidents",
            self.yearly_totals.len(),
            self.monthly_totals.len(),
            self.category_totals.len(),
            self.segments.len(),
            self.incidents.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        let mut record = Record::empty("2025-01-02T03:04:05+00:00");
        record.yearly_totals.insert("2024".into(), 2_000_000);
        record.monthly_totals.insert("2024".into(), vec![100, 101, 102]);
        record.category_totals.insert("FAA 400 ft.".into(), 412_658);
        record.category_breakdowns.insert(
            "FAA 400 ft.".into(),
            BTreeMap::from([("2024".to_string(), 808_648)]),
        );
        record.segments.insert(
            "airports".into(),
            BTreeMap::from([("2023".to_string(), vec![7, 9_007_199_254_740_993])]),
        );
        record
    }

    #[test]
    fn test_json_round_trip_preserves_values() {
        let record = sample();
        let json = serde_json::to_string_pretty(&record).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        // Above 2^53, so a float-based round trip would lose it.
        assert_eq!(back.segments["airports"]["2023"][1], 9_007_199_254_740_993);
    }

    #[test]
    fn test_top_level_keys_in_fixed_order() {
        let json = serde_json::to_string(&Record::empty("t")).unwrap();
        assert_eq!(
            json,
            r#"{"yearly_totals":{},"monthly_totals":{},"category_totals":{},"category_breakdowns":{},"segments":{},"scraped_at":"t"}"#
        );
    }

    #[test]
    fn test_incidents_serialized_only_when_present() {
        let mut record = Record::empty("t");
        record.incidents.push(Incident {
            date: "2024-05-01".into(),
            location: "Newark".into(),
            summary: "Drone near runway".into(),
        });
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["incidents"][0]["location"], "Newark");
    }

    #[test]
    fn test_gaps_and_summary() {
        assert_eq!(Record::empty("t").gaps().len(), 5);

        let record = sample();
        assert!(record.gaps().is_empty());
        assert_eq!(
            record.summary(),
            "1 yearly totals, 1 monthly series, 1 categories, 1 segments, 0 incidents"
        );
    }
}
