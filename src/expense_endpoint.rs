//! Defines the endpoint for submitting a transaction entry.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    ingest::{Confirmation, IngestionError, IngestionService},
    record::{RawTransaction, TransactionRecord},
    responses::error_response,
    store::SheetStore,
};

/// The body of a successful expense submission: the normalized record plus
/// the server-generated timestamp.
#[derive(Debug, Serialize)]
struct ExpenseResponse {
    status: &'static str,
    message: &'static str,
    data: TransactionRecord,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
}

/// A route handler for recording a transaction entry in the spreadsheet
/// store.
///
/// The body is read as raw bytes rather than through the `Json` extractor
/// so that malformed JSON also gets the standard error envelope instead of
/// the framework's plain-text rejection.
pub async fn post_expense<S>(
    State(service): State<IngestionService<S>>,
    body: Bytes,
) -> Response
where
    S: SheetStore + Clone,
{
    let raw: RawTransaction = match serde_json::from_slice(&body) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!("could not parse expense payload: {error}");
            return error_response(
                StatusCode::BAD_REQUEST,
                "request body must be a JSON object with the fields \
                line_item, amount, date_of_txn, type, and category",
            );
        }
    };

    match service.submit(raw).await {
        Ok(confirmation) => success_response(confirmation),
        Err(error) => error.into_response(),
    }
}

fn success_response(confirmation: Confirmation) -> Response {
    let body = ExpenseResponse {
        status: "success",
        message: "Expense added successfully",
        data: confirmation.record,
        timestamp: confirmation.recorded_at,
    };

    (StatusCode::OK, Json(body)).into_response()
}

impl IntoResponse for IngestionError {
    fn into_response(self) -> Response {
        match &self {
            IngestionError::BadRequest(validation) => {
                tracing::warn!(
                    field = validation.field(),
                    "rejected expense payload: {validation}"
                );
                error_response(StatusCode::BAD_REQUEST, &self.to_string())
            }
            IngestionError::StoreMisconfigured(error) => {
                tracing::error!("spreadsheet store misconfigured: {error}");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "the spreadsheet store is misconfigured; contact the operator",
                )
            }
            IngestionError::StoreUnavailable(error) => {
                tracing::error!("spreadsheet store unavailable: {error}");
                error_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "the spreadsheet store is temporarily unavailable; try again later",
                )
            }
            // The detail is for server logs only; the caller gets a generic
            // message.
            IngestionError::Internal(error) => {
                tracing::error!("unexpected store error: {error}");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}
