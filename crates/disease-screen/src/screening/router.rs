use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Duration;
use serde::Deserialize;
use serde_json::json;

use super::domain::{PredictionId, RawInput, ScreeningType, UserId};
use super::repository::{PredictionArchive, PredictionRepository, RepositoryError};
use super::service::{ScreeningOutcome, ScreeningService, ScreeningServiceError};
use super::validation::schema_for;

const DEFAULT_WINDOW_HOURS: i64 = 24;

/// JSON body accepted by the screening endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScreeningRequest {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub fields: RawInput,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OverviewQuery {
    pub hours: Option<i64>,
}

/// Router builder exposing screening intake and prediction history.
pub fn screening_router<R, D>(service: Arc<ScreeningService<R, D>>) -> Router
where
    R: PredictionRepository + 'static,
    D: PredictionArchive + 'static,
{
    Router::new()
        .route(
            "/api/v1/screenings/:screening_type",
            post(screen_handler::<R, D>),
        )
        .route(
            "/api/v1/screenings/:screening_type/fields",
            get(fields_handler),
        )
        .route(
            "/api/v1/predictions/:prediction_id",
            get(prediction_handler::<R, D>),
        )
        .route(
            "/api/v1/users/:user_id/predictions",
            get(history_handler::<R, D>),
        )
        .route("/api/v1/admin/predictions", get(overview_handler::<R, D>))
        .with_state(service)
}

pub(crate) async fn screen_handler<R, D>(
    State(service): State<Arc<ScreeningService<R, D>>>,
    Path(screening_type): Path<String>,
    Json(request): Json<ScreeningRequest>,
) -> Response
where
    R: PredictionRepository + 'static,
    D: PredictionArchive + 'static,
{
    let screening_type = match screening_type.parse::<ScreeningType>() {
        Ok(screening_type) => screening_type,
        Err(err) => return not_found(err.to_string()),
    };

    match service.screen(screening_type, &request.fields, request.user_id) {
        Ok(ScreeningOutcome::Scored(record)) => {
            let payload = json!({
                "id": record.id,
                "type": record.screening_type,
                "result": record.result,
                "created_at": record.created_at,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Ok(ScreeningOutcome::Rejected(validation)) => {
            let payload = json!({
                "errors": validation.errors(),
                "cleaned": validation.cleaned(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn fields_handler(Path(screening_type): Path<String>) -> Response {
    match screening_type.parse::<ScreeningType>() {
        Ok(screening_type) => {
            let payload = json!({
                "type": screening_type,
                "label": screening_type.label(),
                "fields": schema_for(screening_type),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => not_found(err.to_string()),
    }
}

pub(crate) async fn prediction_handler<R, D>(
    State(service): State<Arc<ScreeningService<R, D>>>,
    Path(prediction_id): Path<u64>,
) -> Response
where
    R: PredictionRepository + 'static,
    D: PredictionArchive + 'static,
{
    let id = PredictionId(prediction_id);
    match service.get(id) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(ScreeningServiceError::Repository(RepositoryError::NotFound)) => {
            not_found(format!("prediction {id} not found"))
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn history_handler<R, D>(
    State(service): State<Arc<ScreeningService<R, D>>>,
    Path(user_id): Path<i64>,
) -> Response
where
    R: PredictionRepository + 'static,
    D: PredictionArchive + 'static,
{
    let user_id = UserId(user_id);
    match service.history(user_id) {
        Ok(predictions) => {
            let payload = json!({
                "user_id": user_id,
                "count": predictions.len(),
                "predictions": predictions,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn overview_handler<R, D>(
    State(service): State<Arc<ScreeningService<R, D>>>,
    Query(query): Query<OverviewQuery>,
) -> Response
where
    R: PredictionRepository + 'static,
    D: PredictionArchive + 'static,
{
    let hours = query.hours.unwrap_or(DEFAULT_WINDOW_HOURS);
    let window = match Duration::try_hours(hours) {
        Some(window) if hours > 0 => window,
        _ => {
            let payload = json!({
                "error": "hours must be a positive integer",
            });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    match service.overview(window) {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(other) => internal_error(other),
    }
}

fn not_found(message: String) -> Response {
    let payload = json!({
        "error": message,
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

fn internal_error(error: ScreeningServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
