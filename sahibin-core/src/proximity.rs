//! Distance ranking of disposal facilities and category search keywords.

use std::cmp::Ordering;

use geo::{Distance as _, Haversine, Point};

use crate::model::{Coordinate, FacilityCandidate, RankedFacility, round_to};

/// Default number of facilities returned by [`rank`].
pub const DEFAULT_RANK_LIMIT: usize = 10;

/// Keyword used when a category has no dedicated facility type.
pub const FALLBACK_KEYWORD: &str = "recycling center";

const CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("CARDBOARD", "recycling center"),
    ("GLASS", "glass recycling"),
    ("METAL", "metal recycling"),
    ("PAPER", "paper recycling"),
    ("PLASTIC", "plastic recycling"),
    ("BATTERY", "battery disposal"),
    ("CLOTHES", "clothing donation"),
    ("ORGANIC", "composting facility"),
    ("SHOES", "shoe donation"),
];

/// Facility search keyword for an optional category label. Always yields a keyword.
#[must_use]
pub fn search_keyword(label: Option<&str>) -> &'static str {
    let Some(label) = label.map(str::trim).filter(|label| !label.is_empty()) else {
        return FALLBACK_KEYWORD;
    };
    CATEGORY_KEYWORDS
        .iter()
        .find(|(category, _)| category.eq_ignore_ascii_case(label))
        .map_or(FALLBACK_KEYWORD, |(_, keyword)| keyword)
}

/// Great-circle distance between two coordinates in kilometres.
#[must_use]
pub fn distance_km(from: Coordinate, to: Coordinate) -> f64 {
    let origin = Point::new(from.lng, from.lat);
    let target = Point::new(to.lng, to.lat);
    Haversine.distance(origin, target) / 1000.0
}

/// Map link for a facility identifier.
#[must_use]
pub fn map_link(facility: &FacilityCandidate) -> String {
    format!(
        "https://www.google.com/maps/place/?q=place_id:{}",
        facility.id.0
    )
}

/// Take the first `limit` candidates and order them by distance from `origin`.
///
/// The sort is stable and uses unrounded distances; only the reported
/// `distance_km` is rounded to two decimals.
#[must_use]
pub fn rank(
    origin: Coordinate,
    candidates: Vec<FacilityCandidate>,
    limit: usize,
) -> Vec<RankedFacility> {
    let mut measured: Vec<(f64, FacilityCandidate)> = candidates
        .into_iter()
        .take(limit)
        .map(|candidate| (distance_km(origin, candidate.coordinate), candidate))
        .collect();

    measured.sort_by(|(left, _), (right, _)| left.partial_cmp(right).unwrap_or(Ordering::Equal));

    measured
        .into_iter()
        .map(|(distance, facility)| RankedFacility {
            distance_km: round_to(distance, 2),
            map_link: map_link(&facility),
            facility,
        })
        .collect()
}
