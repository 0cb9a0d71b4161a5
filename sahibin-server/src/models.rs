//! API request and response types.
//!
//! Field names follow the JSON contract consumed by the web frontend and
//! are kept separate from the core types.

use chrono::{DateTime, Utc};
use sahibin_core::{CentersReport, Coordinate, DetectionReport, RankedFacility, StatsSnapshot};
use serde::{Deserialize, Serialize};

/// Message shown when the classifier finds nothing.
pub(crate) const NO_DETECTION_MESSAGE: &str =
    "No waste detected. Please try again with a clearer image.";

/// Unsuccessful outcome with a human-readable reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub(crate) fn failure<S: Into<String>>(message: S) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// `GET /` and `GET /api/health`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ApiHealth {
    pub message: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    pub model_loaded: bool,
    pub google_maps: bool,
    /// Always `false`; kept for frontends that read the flag.
    pub gemini_ai: bool,
    pub endpoints: &'static [&'static str],
}

/// Successful `POST /api/detect`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ApiDetection {
    pub success: bool,
    pub waste_type: &'static str,
    pub confidence: f64,
    pub recyclable: bool,
    pub disposal_bin: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    pub category: &'static str,
    pub instructions: &'static [&'static str],
    pub environmental_tip: &'static str,
    pub co2_saved: f64,
    pub energy_saved: f64,
    pub water_saved: f64,
    pub trees_saved: f64,
    pub warnings: &'static [&'static str],
    pub timestamp: DateTime<Utc>,
}

impl From<DetectionReport> for ApiDetection {
    fn from(report: DetectionReport) -> Self {
        let info = report.info;
        Self {
            success: true,
            waste_type: info.label,
            confidence: report.confidence_percent,
            recyclable: info.recyclable,
            disposal_bin: info.disposal_bin,
            color: info.color,
            icon: info.icon,
            category: info.category,
            instructions: info.instructions,
            environmental_tip: info.environmental_tip,
            co2_saved: info.co2_saved,
            energy_saved: info.energy_saved,
            water_saved: info.water_saved,
            trees_saved: info.trees_equivalent,
            warnings: info.warnings,
            timestamp: report.timestamp,
        }
    }
}

/// `GET /api/stats`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ApiStats {
    pub success: bool,
    #[serde(flatten)]
    pub snapshot: StatsSnapshot,
}

/// Query parameters for `GET /api/collection-centers`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CentersParams {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Search radius in kilometres.
    #[serde(alias = "radius_km")]
    pub radius: Option<f64>,
    pub waste_type: Option<String>,
}

/// `GET /api/collection-centers`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ApiCenters {
    pub success: bool,
    pub user_location: Coordinate,
    pub search_radius: f64,
    pub total_found: usize,
    pub centers: Vec<ApiCenter>,
}

impl From<CentersReport> for ApiCenters {
    fn from(report: CentersReport) -> Self {
        let centers: Vec<ApiCenter> = report
            .centers
            .into_iter()
            .map(ApiCenter::from)
            .collect();
        Self {
            success: true,
            user_location: report.origin,
            search_radius: report.radius_km,
            total_found: centers.len(),
            centers,
        }
    }
}

/// A ranked disposal facility.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ApiCenter {
    pub id: String,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    /// Distance in kilometres, two decimals.
    pub distance: f64,
    pub rating: Option<f64>,
    pub google_maps_url: String,
}

impl From<RankedFacility> for ApiCenter {
    fn from(ranked: RankedFacility) -> Self {
        let facility = ranked.facility;
        Self {
            id: facility.id.0,
            name: facility.name,
            address: facility.address,
            lat: facility.coordinate.lat,
            lng: facility.coordinate.lng,
            distance: ranked.distance_km,
            rating: facility.rating,
            google_maps_url: ranked.map_link,
        }
    }
}
