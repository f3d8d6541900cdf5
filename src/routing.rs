//! Application router configuration.

use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use time::OffsetDateTime;
use tower_http::cors::CorsLayer;

use crate::{
    AppState, cronjob_endpoint::post_cronjob, endpoints, expense_endpoint::post_expense,
    health_endpoint::get_health, store::SheetStore,
};

/// Return a router with all the app's routes.
///
/// The permissive CORS layer mirrors the service's intended audience:
/// personal automation clients calling from arbitrary origins.
pub fn build_router<S>(state: AppState<S>) -> Router
where
    S: SheetStore + Clone + 'static,
{
    Router::new()
        .route(endpoints::ROOT, get(get_api_index))
        .route(endpoints::EXPENSE, post(post_expense::<S>))
        .route(endpoints::HEALTH, get(get_health::<S>))
        .route(endpoints::CRONJOB, post(post_cronjob::<S>))
        .fallback(get_not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// A route handler listing the API's endpoints.
async fn get_api_index() -> Json<Value> {
    Json(json!({
        "message": "Expense Tracker API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": endpoints::HEALTH,
            "add_expense": format!("{} (POST)", endpoints::EXPENSE),
            "cronjob": format!("{} (POST)", endpoints::CRONJOB),
        },
    }))
}

#[derive(Debug, Serialize)]
struct NotFoundBody {
    status: &'static str,
    message: &'static str,
    path: String,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
}

/// The fallback handler: unknown routes get the JSON error envelope rather
/// than an empty 404.
async fn get_not_found(uri: Uri) -> Response {
    let body = NotFoundBody {
        status: "error",
        message: "Endpoint not found",
        path: uri.path().to_owned(),
        timestamp: OffsetDateTime::now_utc(),
    };

    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
