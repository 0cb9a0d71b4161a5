//! Facility search implementation using the Google Places nearby search API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use sahibin_core::{
    model::{Coordinate, FacilityCandidate, FacilityId, FacilitySearch},
    ports::{FacilitySearchPort, PortError},
};

const NEARBY_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

/// Maximum number of places taken from one response.
pub const MAX_RESULTS: usize = 10;

/// Response from /nearbysearch/json
#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,

    #[serde(default)]
    results: Vec<PlaceEntry>,

    #[serde(default)]
    error_message: Option<String>,
}

/// Single place from /nearbysearch/json
#[derive(Debug, Deserialize)]
struct PlaceEntry {
    place_id: String,

    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    vicinity: Option<String>,

    geometry: Geometry,

    #[serde(default)]
    rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Nearby facility search against Google Places.
pub struct PlacesSearchPort {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl PlacesSearchPort {
    /// Create a port bound to the given HTTP client. Without an API key the
    /// port reports itself as not configured.
    #[must_use]
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self::with_base_url(client, api_key, NEARBY_SEARCH_URL)
    }

    /// Create a port that sends requests to a custom endpoint.
    #[must_use]
    pub fn with_base_url<S: Into<String>>(
        client: Client,
        api_key: Option<String>,
        base_url: S,
    ) -> Self {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        Self {
            client,
            api_key,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl FacilitySearchPort for PlacesSearchPort {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &FacilitySearch) -> Result<Vec<FacilityCandidate>, PortError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(PortError::NotConfigured);
        };

        let location = query.origin.to_string();
        let radius_m = format!("{:.0}", query.radius_km * 1000.0);

        let req = self.client.get(&self.base_url).query(&[
            ("location", location.as_str()),
            ("radius", radius_m.as_str()),
            ("keyword", query.keyword),
            ("key", api_key),
        ]);

        let resp = fetch_json::<NearbyResponse>(req).await?;
        let candidates = into_candidates(resp)?;

        log::debug!(
            "Places returned {} candidates for {:?} around {}",
            candidates.len(),
            query.keyword,
            query.origin
        );

        Ok(candidates)
    }
}

/// Build the facility search port for Google Places.
#[must_use]
pub fn plugin(client: Client, api_key: Option<String>) -> Arc<dyn FacilitySearchPort> {
    Arc::new(PlacesSearchPort::new(client, api_key))
}

/// Check the response status and map the first [`MAX_RESULTS`] places.
fn into_candidates(resp: NearbyResponse) -> Result<Vec<FacilityCandidate>, PortError> {
    match resp.status.as_str() {
        "OK" | "ZERO_RESULTS" => {}
        status => {
            let detail = resp
                .error_message
                .map_or_else(|| status.to_owned(), |message| format!("{status}: {message}"));
            return Err(PortError::Provider(detail));
        }
    }

    Ok(resp
        .results
        .into_iter()
        .take(MAX_RESULTS)
        .map(|place| FacilityCandidate {
            id: FacilityId(place.place_id),
            name: place.name.unwrap_or_else(|| "Unknown Center".to_owned()),
            address: place
                .vicinity
                .unwrap_or_else(|| "Address not available".to_owned()),
            coordinate: Coordinate::new(place.geometry.location.lat, place.geometry.location.lng),
            rating: place.rating,
        })
        .collect())
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map_err(PortError::from)
}

#[cfg(test)]
mod tests {
    use sahibin_core::proximity::FALLBACK_KEYWORD;

    use super::*;

    fn parse(json: &str) -> NearbyResponse {
        serde_json::from_str(json).expect("valid response")
    }

    #[test]
    fn maps_places_to_candidates() {
        let resp = parse(
            r#"{
                "status": "OK",
                "results": [
                    {
                        "place_id": "ChIJ1",
                        "name": "Green Depot",
                        "vicinity": "12 Ring Rd",
                        "geometry": { "location": { "lat": 28.61, "lng": 77.21 } },
                        "rating": 4.2
                    },
                    {
                        "place_id": "ChIJ2",
                        "geometry": { "location": { "lat": 28.62, "lng": 77.22 } }
                    }
                ]
            }"#,
        );

        let candidates = into_candidates(resp).expect("ok status");
        assert_eq!(candidates.len(), 2, "both places");

        let first = candidates.first().expect("first");
        assert_eq!(first.id.0, "ChIJ1", "place id");
        assert_eq!(first.address, "12 Ring Rd", "vicinity is the address");
        assert_eq!(first.rating, Some(4.2), "rating");

        let second = candidates.get(1).expect("second");
        assert_eq!(second.name, "Unknown Center", "name default");
        assert_eq!(second.address, "Address not available", "address default");
        assert_eq!(second.rating, None, "no rating");
    }

    #[test]
    fn zero_results_is_empty() {
        let resp = parse(r#"{ "status": "ZERO_RESULTS", "results": [] }"#);
        assert!(into_candidates(resp).expect("ok status").is_empty(), "empty");
    }

    #[test]
    fn error_status_carries_message() {
        let resp = parse(
            r#"{ "status": "REQUEST_DENIED", "error_message": "The provided API key is invalid." }"#,
        );
        let err = into_candidates(resp).expect_err("denied");
        assert!(
            matches!(&err, PortError::Provider(detail) if detail.starts_with("REQUEST_DENIED")),
            "{err}"
        );
    }

    #[test]
    fn results_are_capped() {
        let places: Vec<String> = (0..15)
            .map(|index| {
                format!(
                    r#"{{ "place_id": "p{index}", "geometry": {{ "location": {{ "lat": 0.0, "lng": 0.0 }} }} }}"#
                )
            })
            .collect();
        let json = format!(r#"{{ "status": "OK", "results": [{}] }}"#, places.join(","));

        let candidates = into_candidates(parse(&json)).expect("ok status");
        assert_eq!(candidates.len(), MAX_RESULTS, "capped upstream");
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let port = PlacesSearchPort::new(Client::new(), Some("  ".to_owned()));
        assert!(!port.is_configured(), "blank key");

        let query = FacilitySearch {
            origin: Coordinate::new(0.0, 0.0),
            radius_km: 5.0,
            keyword: FALLBACK_KEYWORD,
        };
        let err = port.search(&query).await.expect_err("not configured");
        assert!(matches!(err, PortError::NotConfigured), "{err}");
    }
}
