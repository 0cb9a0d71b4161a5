//! Domain data structures for waste categories, scans, and disposal facilities.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Number of scan records exposed by a statistics snapshot.
pub const RECENT_SCANS_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
/// Static disposal metadata for a single waste category.
pub struct WasteCategoryInfo {
    /// Canonical upper-case label, e.g. `GLASS`.
    pub label: &'static str,
    /// Whether the material goes into a recycling stream.
    pub recyclable: bool,
    /// Human-friendly bin description.
    pub disposal_bin: &'static str,
    /// Display color used by clients (hex).
    pub color: &'static str,
    /// Display icon used by clients.
    pub icon: &'static str,
    /// Material group, e.g. "Paper Products".
    pub category: &'static str,
    /// Ordered disposal steps.
    pub instructions: &'static [&'static str],
    /// Short fact shown alongside the instructions.
    pub environmental_tip: &'static str,
    /// Kilograms of CO2 saved per scanned item.
    pub co2_saved: f64,
    /// Kilowatt hours saved per scanned item.
    pub energy_saved: f64,
    /// Litres of water saved per scanned item.
    pub water_saved: f64,
    /// Fraction of a tree saved per scanned item.
    pub trees_equivalent: f64,
    /// Safety warnings, empty for most categories.
    pub warnings: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq)]
/// Best detection returned by a classifier.
pub struct Detection {
    /// Raw label as reported by the classifier.
    pub label: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Detection {
    /// Build a detection, clamping the confidence into `[0, 1]`.
    #[must_use]
    pub fn new<S: Into<String>>(label: S, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Confidence as a percentage rounded to two decimals.
    #[must_use]
    pub fn confidence_percent(&self) -> f64 {
        round_to(self.confidence * 100.0, 2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A single recorded scan. Never modified after it is appended.
pub struct ScanRecord {
    /// Canonical category label.
    pub waste_type: String,
    /// Confidence percentage in `[0, 100]`.
    #[serde(rename = "confidence")]
    pub confidence_percent: f64,
    /// When the scan was recorded.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Accepts RFC 3339 timestamps and offset-less ISO 8601 ones, the latter read as UTC.
fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(D::Error::custom)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Durable all-time scan statistics.
///
/// Owned by [`crate::stats::StatisticsStore`]; nothing else writes it.
pub struct StatisticsAggregate {
    /// Number of successful scans.
    pub total_scans: u64,
    /// Scans of recyclable categories.
    pub recyclable_count: u64,
    /// Scans of non-recyclable categories.
    pub non_recyclable_count: u64,
    /// Accumulated CO2 impact.
    pub total_co2_saved: f64,
    /// Accumulated energy impact.
    pub total_energy_saved: f64,
    /// Accumulated water impact.
    pub total_water_saved: f64,
    /// Accumulated tree equivalent.
    pub total_trees_saved: f64,
    /// Scan count per category label.
    pub category_counts: BTreeMap<String, u64>,
    /// Scan history in insertion order.
    pub scan_history: Vec<ScanRecord>,
}

impl StatisticsAggregate {
    /// Apply one scan of `info` to the counters and history.
    ///
    /// History beyond `history_limit` records is dropped from the front.
    pub fn apply_scan(
        &mut self,
        info: &WasteCategoryInfo,
        record: ScanRecord,
        history_limit: usize,
    ) {
        self.total_scans += 1;
        if info.recyclable {
            self.recyclable_count += 1;
        } else {
            self.non_recyclable_count += 1;
        }

        self.total_co2_saved += info.co2_saved;
        self.total_energy_saved += info.energy_saved;
        self.total_water_saved += info.water_saved;
        self.total_trees_saved += info.trees_equivalent;

        *self
            .category_counts
            .entry(info.label.to_owned())
            .or_insert(0) += 1;

        self.scan_history.push(record);
        let excess = self.scan_history.len().saturating_sub(history_limit);
        if excess > 0 {
            self.scan_history.drain(..excess);
        }
    }

    /// Percentage of recyclable scans rounded to one decimal, `0.0` without scans.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "scan counters stay far below 2^52"
    )]
    pub fn recycling_rate(&self) -> f64 {
        if self.total_scans == 0 {
            return 0.0;
        }
        round_to(
            self.recyclable_count as f64 / self.total_scans as f64 * 100.0,
            1,
        )
    }

    /// Read-only view with display rounding and the most recent scans.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        let skip = self.scan_history.len().saturating_sub(RECENT_SCANS_LIMIT);
        StatsSnapshot {
            items_detected: self.total_scans,
            recyclable: self.recyclable_count,
            non_recyclable: self.non_recyclable_count,
            recycling_rate: self.recycling_rate(),
            co2_saved: round_to(self.total_co2_saved, 2),
            energy_saved: round_to(self.total_energy_saved, 2),
            water_saved: round_to(self.total_water_saved, 2),
            trees_saved: round_to(self.total_trees_saved, 3),
            category_distribution: self.category_counts.clone(),
            recent_scans: self.scan_history.iter().skip(skip).cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Point-in-time statistics as exposed to clients.
pub struct StatsSnapshot {
    /// Total number of scans.
    pub items_detected: u64,
    /// Recyclable scans.
    pub recyclable: u64,
    /// Non-recyclable scans.
    pub non_recyclable: u64,
    /// Recyclable share in percent, one decimal.
    pub recycling_rate: f64,
    /// CO2 saved, two decimals.
    pub co2_saved: f64,
    /// Energy saved, two decimals.
    pub energy_saved: f64,
    /// Water saved, two decimals.
    pub water_saved: f64,
    /// Trees saved, three decimals.
    pub trees_saved: f64,
    /// Scan count per category label.
    pub category_distribution: BTreeMap<String, u64>,
    /// Up to [`RECENT_SCANS_LIMIT`] most recent scans, oldest first.
    pub recent_scans: Vec<ScanRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// WGS84 latitude/longitude pair in degrees.
pub struct Coordinate {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Coordinate {
    /// Construct a coordinate without validation.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite and within their geographic ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Provider identifier for a facility.
pub struct FacilityId(pub String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Facility returned by a search provider, before ranking.
pub struct FacilityCandidate {
    /// Provider identifier.
    pub id: FacilityId,
    /// Display name.
    pub name: String,
    /// Street address or vicinity.
    pub address: String,
    /// Location of the facility.
    pub coordinate: Coordinate,
    /// Average user rating, if the provider has one.
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Facility annotated with its distance from the user.
pub struct RankedFacility {
    /// The underlying candidate.
    pub facility: FacilityCandidate,
    /// Distance in kilometres, rounded to two decimals.
    pub distance_km: f64,
    /// Link opening the facility on a map.
    pub map_link: String,
}

#[derive(Debug, Clone)]
/// Parameters for a facility search.
pub struct FacilitySearch {
    /// Centre of the search.
    pub origin: Coordinate,
    /// Search radius in kilometres.
    pub radius_km: f64,
    /// Provider keyword, e.g. "glass recycling".
    pub keyword: &'static str,
}

/// Round `value` to `decimals` decimal places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::WasteCatalog;

    fn record(label: &str) -> ScanRecord {
        ScanRecord {
            waste_type: label.to_owned(),
            confidence_percent: 90.0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn recycling_rate_is_zero_without_scans() {
        let aggregate = StatisticsAggregate::default();
        assert!(
            aggregate.recycling_rate().abs() < f64::EPSILON,
            "empty aggregate must report a zero rate"
        );
    }

    #[test]
    fn recycling_rate_rounds_to_one_decimal() {
        let catalog = WasteCatalog::builtin();
        let glass = catalog.lookup("GLASS").expect("glass is built in");
        let organic = catalog.lookup("ORGANIC").expect("organic is built in");

        let mut aggregate = StatisticsAggregate::default();
        aggregate.apply_scan(glass, record("GLASS"), 100);
        aggregate.apply_scan(glass, record("GLASS"), 100);
        aggregate.apply_scan(organic, record("ORGANIC"), 100);

        assert!(
            (aggregate.recycling_rate() - 66.7).abs() < 1e-9,
            "2 of 3 recyclable should be 66.7%"
        );
        assert_eq!(aggregate.recyclable_count, 2, "recyclable count");
        assert_eq!(aggregate.non_recyclable_count, 1, "non-recyclable count");
    }

    #[test]
    fn apply_scan_keeps_counters_consistent() {
        let catalog = WasteCatalog::builtin();
        let mut aggregate = StatisticsAggregate::default();
        for label in ["METAL", "PAPER", "METAL", "ORGANIC"] {
            let info = catalog.lookup(label).expect("label is built in");
            aggregate.apply_scan(info, record(label), 100);
        }

        assert_eq!(aggregate.total_scans, 4, "total scans");
        assert_eq!(
            aggregate.recyclable_count + aggregate.non_recyclable_count,
            aggregate.total_scans,
            "recyclable split must add up"
        );
        assert_eq!(
            aggregate.category_counts.values().sum::<u64>(),
            aggregate.total_scans,
            "category counts must add up"
        );
        assert_eq!(aggregate.category_counts.get("METAL"), Some(&2), "metal count");
        assert!(
            (aggregate.total_co2_saved - 3.3).abs() < 1e-9,
            "co2 is the sum of the unit impacts"
        );
    }

    #[test]
    fn history_is_trimmed_to_the_retention_limit() {
        let catalog = WasteCatalog::builtin();
        let paper = catalog.lookup("PAPER").expect("paper is built in");
        let mut aggregate = StatisticsAggregate::default();
        for index in 0..15 {
            let mut scan = record("PAPER");
            scan.confidence_percent = f64::from(index);
            aggregate.apply_scan(paper, scan, 12);
        }

        assert_eq!(aggregate.scan_history.len(), 12, "retention limit");
        assert_eq!(aggregate.total_scans, 15, "counters are not trimmed");
        let first = aggregate.scan_history.first().expect("history is not empty");
        assert!(
            (first.confidence_percent - 3.0).abs() < f64::EPSILON,
            "oldest records are dropped first"
        );
    }

    #[test]
    fn snapshot_exposes_most_recent_ten_in_order() {
        let catalog = WasteCatalog::builtin();
        let paper = catalog.lookup("PAPER").expect("paper is built in");
        let mut aggregate = StatisticsAggregate::default();
        for index in 0..13 {
            let mut scan = record("PAPER");
            scan.confidence_percent = f64::from(index);
            aggregate.apply_scan(paper, scan, 1000);
        }

        let snapshot = aggregate.snapshot();
        let confidences: Vec<f64> = snapshot
            .recent_scans
            .iter()
            .map(|scan| scan.confidence_percent)
            .collect();
        let expected: Vec<f64> = (3..13).map(f64::from).collect();
        assert_eq!(confidences, expected, "last ten scans, oldest first");
    }

    #[test]
    fn detection_clamps_confidence() {
        assert!(
            (Detection::new("GLASS", 1.7).confidence - 1.0).abs() < f64::EPSILON,
            "upper clamp"
        );
        assert!(
            Detection::new("GLASS", f64::NAN).confidence.abs() < f64::EPSILON,
            "nan becomes zero"
        );
        assert!(
            (Detection::new("GLASS", 0.876_54).confidence_percent() - 87.65).abs() < 1e-9,
            "percent is rounded to two decimals"
        );
    }

    #[test]
    fn coordinate_validation() {
        assert!(Coordinate::new(52.5, 13.4).is_valid(), "berlin is valid");
        assert!(!Coordinate::new(91.0, 0.0).is_valid(), "latitude out of range");
        assert!(!Coordinate::new(0.0, f64::INFINITY).is_valid(), "non-finite");
    }

    #[test]
    fn scan_timestamps_accept_missing_offset() {
        let naive: ScanRecord = serde_json::from_str(
            r#"{ "waste_type": "GLASS", "confidence": 91.2, "timestamp": "2025-01-04T10:11:12.123456" }"#,
        )
        .expect("naive timestamp parses");
        assert_eq!(
            naive.timestamp.to_rfc3339(),
            "2025-01-04T10:11:12.123456+00:00",
            "read as utc"
        );

        let offset: ScanRecord = serde_json::from_str(
            r#"{ "waste_type": "GLASS", "confidence": 91.2, "timestamp": "2025-01-04T12:11:12+02:00" }"#,
        )
        .expect("rfc 3339 timestamp parses");
        assert_eq!(
            offset.timestamp.to_rfc3339(),
            "2025-01-04T10:11:12+00:00",
            "converted to utc"
        );

        let garbage = serde_json::from_str::<ScanRecord>(
            r#"{ "waste_type": "GLASS", "confidence": 91.2, "timestamp": "yesterday" }"#,
        );
        assert!(garbage.is_err(), "unparseable timestamp is rejected");
    }
}
