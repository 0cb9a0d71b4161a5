//! HTTP handler functions for the SahiBin API.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, error, web};
use sahibin_core::{
    CenterQuery, Coordinate, DetectOutcome, ServiceError, service::DEFAULT_SEARCH_RADIUS_KM,
};

use crate::AppState;
use crate::models::{
    ApiCenters, ApiDetection, ApiHealth, ApiMessage, ApiStats, CentersParams, NO_DETECTION_MESSAGE,
};

const ENDPOINTS: &[&str] = &[
    "POST /api/detect - Upload image for detection",
    "GET /api/stats - Get statistics",
    "GET /api/collection-centers - Find nearby centers",
    "GET /api/categories - List waste categories",
];

/// `GET /` and `GET /api/health`
pub(crate) async fn health(state: web::Data<AppState>) -> HttpResponse {
    let status = state.service.capability_status();
    HttpResponse::Ok().json(ApiHealth {
        message: "SahiBin API is running",
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: status.classifier,
        google_maps: status.facility_search,
        gemini_ai: false,
        endpoints: ENDPOINTS,
    })
}

/// `GET /api/categories`
///
/// Returns every catalog entry with its disposal guidance.
pub(crate) async fn categories(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.service.catalog().entries())
}

/// `POST /api/detect`
///
/// Classifies the image in the request body and records the scan.
pub(crate) async fn detect(
    state: web::Data<AppState>,
    body: Result<web::Bytes, error::Error>,
) -> HttpResponse {
    let body = match body {
        Ok(body) => body,
        Err(err) => return upload_error(&err),
    };

    match state.service.detect(&body).await {
        Ok(DetectOutcome::Detected(report)) => HttpResponse::Ok().json(ApiDetection::from(report)),
        Ok(DetectOutcome::NoDetection) => {
            HttpResponse::Ok().json(ApiMessage::failure(NO_DETECTION_MESSAGE))
        }
        Ok(DetectOutcome::UnknownCategory { label }) => {
            HttpResponse::Ok().json(ApiMessage::failure(format!("Unknown category: {label}")))
        }
        Err(err) => error_response("detect", &err),
    }
}

/// `GET /api/stats`
pub(crate) async fn stats(state: web::Data<AppState>) -> HttpResponse {
    match state.service.stats().await {
        Ok(snapshot) => HttpResponse::Ok().json(ApiStats {
            success: true,
            snapshot,
        }),
        Err(err) => error_response("load statistics", &err),
    }
}

/// `GET /api/collection-centers`
///
/// Finds disposal facilities around `lat`/`lng`, closest first.
pub(crate) async fn collection_centers(
    state: web::Data<AppState>,
    params: web::Query<CentersParams>,
) -> HttpResponse {
    let params = params.into_inner();
    let (Some(lat), Some(lng)) = (params.lat, params.lng) else {
        return error_response(
            "find collection centers",
            &ServiceError::InvalidInput("lat and lng are required".to_owned()),
        );
    };

    let query = CenterQuery {
        origin: Coordinate::new(lat, lng),
        radius_km: params.radius.unwrap_or(DEFAULT_SEARCH_RADIUS_KM),
        waste_type: params.waste_type,
    };

    match state.service.find_centers(query).await {
        Ok(report) => HttpResponse::Ok().json(ApiCenters::from(report)),
        Err(err) => error_response("find collection centers", &err),
    }
}

/// Renders a rejected request body, such as an oversized image, as `{success: false, message}`.
fn upload_error(err: &error::Error) -> HttpResponse {
    let status = err.as_response_error().status_code();
    log::warn!("Rejected detect upload ({status}): {err}");
    let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "Image is larger than the upload limit".to_owned()
    } else {
        err.to_string()
    };
    HttpResponse::build(status).json(ApiMessage::failure(message))
}

/// Renders a service failure as `{success: false, message}` with a matching status.
///
/// Storage and upstream details are logged, not returned.
fn error_response(action: &str, err: &ServiceError) -> HttpResponse {
    let (mut builder, message) = match err {
        ServiceError::InvalidInput(_) => {
            log::warn!("Rejected request to {action}: {err}");
            (HttpResponse::BadRequest(), err.to_string())
        }
        ServiceError::AdapterUnavailable => {
            log::warn!("Cannot {action}: {err}");
            (
                HttpResponse::ServiceUnavailable(),
                "Waste detection model not loaded. Configure SAHIBIN_CLASSIFIER_URL".to_owned(),
            )
        }
        ServiceError::UpstreamUnavailable(_) => {
            log::warn!("Cannot {action}: {err}");
            (
                HttpResponse::ServiceUnavailable(),
                "Google Maps not configured. Add GOOGLE_MAPS_API_KEY to the environment"
                    .to_owned(),
            )
        }
        ServiceError::Upstream(_) => {
            log::error!("Failed to {action}: {err}");
            (
                HttpResponse::BadGateway(),
                "External service request failed".to_owned(),
            )
        }
        ServiceError::Persistence(_) => {
            log::error!("Failed to {action}: {err}");
            (
                HttpResponse::InternalServerError(),
                format!("Statistics storage unavailable, could not {action}"),
            )
        }
    };
    builder.json(ApiMessage::failure(message))
}
