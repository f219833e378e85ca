use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::modules::grading::{self, BoundingBox, Selection};
use crate::modules::integrations::prediction::{ImageUpload, PredictionOutcome};

const HEALTH_DETAILS: &str = "The prediction service is currently starting up or unavailable. Please try again in a few moments.";

fn no_file() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "No file received or invalid file" })),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/api/proxy",
    responses(
        (status = 200, description = "Prediction passed through from the service"),
        (status = 400, description = "No file received"),
        (status = 500, description = "Prediction service unreachable or still starting up")
    )
)]
pub async fn predict(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut upload = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Invalid multipart body: {}", e);
                return no_file();
            }
        };

        if field.name() != Some("file") || field.file_name().is_none() {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        match field.bytes().await {
            Ok(bytes) => {
                upload = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
                break;
            }
            Err(e) => {
                tracing::error!("Failed to read uploaded file: {}", e);
                return no_file();
            }
        }
    }

    let Some(upload) = upload else {
        tracing::error!("No file received or invalid file");
        return no_file();
    };

    match state.prediction.predict(&upload).await {
        Ok(PredictionOutcome::Success(body)) => Json(body).into_response(),
        Ok(PredictionOutcome::Upstream {
            status,
            message,
            details,
        }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(json!({ "error": message, "details": details }))).into_response()
        }
        Err(details) => {
            tracing::error!("Proxy error: {}", details);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to process image", "details": details })),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/proxy",
    responses(
        (status = 200, description = "Prediction service is up"),
        (status = 503, description = "Prediction service unavailable")
    )
)]
pub async fn prediction_health(State(state): State<AppState>) -> Response {
    match state.prediction.health().await {
        Ok(()) => Json(json!({ "status": "ok" })).into_response(),
        Err(e) => {
            tracing::error!("Health check error: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "Service unavailable", "details": HEALTH_DETAILS })),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/grade/routes",
    responses(
        (status = 200, description = "Normalized routes and their colors"),
        (status = 400, description = "Invalid route file")
    )
)]
/// Validate and normalize an uploaded route map.
pub async fn load_routes(Json(payload): Json<Value>) -> Result<impl IntoResponse, DomainError> {
    let routes = grading::parse_routes(&payload).map_err(|e| {
        DomainError::Validation(format!("Invalid route file format: {}", e))
    })?;

    tracing::debug!("Loaded route map with {} routes", routes.len());

    Ok(Json(json!({
        "routes": grading::routes_to_json(&routes),
        "colors": grading::assign_colors(&routes),
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    routes: Value,
    #[serde(default)]
    route_zero: Vec<BoundingBox>,
    #[serde(default = "default_first_click")]
    is_first_click: bool,
    route_name: String,
    box_index: usize,
}

fn default_first_click() -> bool {
    true
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectResponse {
    route_zero: Vec<BoundingBox>,
    is_first_click: bool,
}

#[utoipa::path(
    post,
    path = "/api/grade/select",
    responses(
        (status = 200, description = "Updated Route Zero selection"),
        (status = 400, description = "Unknown route or box")
    )
)]
/// One click on the grade page's Route Zero selection.
pub async fn select_box(
    Json(payload): Json<SelectRequest>,
) -> Result<Json<SelectResponse>, DomainError> {
    let routes = grading::parse_routes(&payload.routes)
        .map_err(|e| DomainError::Validation(format!("Invalid route map: {}", e)))?;

    let selection = grading::apply_click(
        &routes,
        Selection {
            route_zero: payload.route_zero,
            first_click: payload.is_first_click,
        },
        &payload.route_name,
        payload.box_index,
    )
    .map_err(DomainError::Validation)?;

    Ok(Json(SelectResponse {
        route_zero: selection.route_zero,
        is_first_click: selection.first_click,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    routes: Value,
    #[serde(default)]
    route_zero: Vec<BoundingBox>,
}

#[utoipa::path(
    post,
    path = "/api/grade/export",
    responses(
        (status = 200, description = "Route document with Route Zero first"),
        (status = 400, description = "Invalid route map")
    )
)]
/// Saved route document: Route Zero first, then the segmentation.
pub async fn export_routes(
    Json(payload): Json<ExportRequest>,
) -> Result<Json<Map<String, Value>>, DomainError> {
    let routes = grading::parse_routes(&payload.routes)
        .map_err(|e| DomainError::Validation(format!("Invalid route map: {}", e)))?;

    let mut doc = Map::new();
    doc.insert(
        grading::ROUTE_ZERO.to_string(),
        serde_json::to_value(&payload.route_zero).unwrap_or(Value::Array(Vec::new())),
    );
    doc.extend(grading::routes_to_json(&routes));
    Ok(Json(doc))
}
