//! The Google Sheets implementation of [SheetStore].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};
use time::{OffsetDateTime, macros::format_description};

use crate::{
    record::TransactionRecord,
    store::{RowReference, SheetStore, StoreError},
};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [GoogleSheetsStore].
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// The ID of the spreadsheet document.
    pub spreadsheet_id: String,
    /// The name of the sheet tab rows are appended to.
    pub sheet_name: String,
    /// An OAuth bearer token with spreadsheet scope. Acquiring and
    /// refreshing the token is the caller's concern.
    pub access_token: String,
    /// The API origin. Overridable so tests can point at a local server.
    pub base_url: String,
    /// Upper bound on the wall time of a single API call. Expiry surfaces
    /// as [StoreError::Transient].
    pub request_timeout: Duration,
}

impl SheetsConfig {
    /// Create a config with the production API origin and default timeout.
    pub fn new(spreadsheet_id: String, sheet_name: String, access_token: String) -> Self {
        Self {
            spreadsheet_id,
            sheet_name,
            access_token,
            base_url: DEFAULT_BASE_URL.to_owned(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// A [SheetStore] backed by the Google Sheets REST API.
///
/// Each appended row is `[recorded timestamp, line_item, amount,
/// date_of_txn, type, category]` in columns A through F.
#[derive(Debug, Clone)]
pub struct GoogleSheetsStore {
    client: reqwest::Client,
    config: SheetsConfig,
}

impl GoogleSheetsStore {
    /// Create a store from `config`.
    ///
    /// # Errors
    /// Returns [StoreError::Unknown] if the HTTP client cannot be built.
    pub fn new(config: SheetsConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|error| StoreError::Unknown(error.to_string()))?;

        Ok(Self { client, config })
    }

    fn append_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}!A:F:append",
            self.config.base_url, self.config.spreadsheet_id, self.config.sheet_name
        )
    }

    fn metadata_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}",
            self.config.base_url, self.config.spreadsheet_id
        )
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsStore {
    async fn append(&self, record: &TransactionRecord) -> Result<RowReference, StoreError> {
        let body = json!({
            "values": [row_values(record, OffsetDateTime::now_utc())?]
        });

        let response = self
            .client
            .post(self.append_url())
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &detail));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|error| StoreError::Unknown(error.to_string()))?;
        let range = payload
            .pointer("/updates/updatedRange")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        Ok(RowReference { range })
    }

    async fn probe(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .get(self.metadata_url())
            // Limiting the metadata read keeps the probe cheap.
            .query(&[("fields", "spreadsheetId")])
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            let detail = response.text().await.unwrap_or_default();
            Err(classify_status(status, &detail))
        }
    }
}

/// Build the columns A through F of the appended row. The date is rendered
/// as `YYYY-MM-DD` text; leaving it to its serde form would write a
/// `[year, ordinal]` tuple into the sheet.
fn row_values(record: &TransactionRecord, recorded_at: OffsetDateTime) -> Result<Value, StoreError> {
    let timestamp_format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let date_format = format_description!("[year]-[month]-[day]");

    let recorded_at = recorded_at
        .format(&timestamp_format)
        .map_err(|error| StoreError::Unknown(error.to_string()))?;
    let date_of_txn = record
        .date_of_txn
        .format(&date_format)
        .map_err(|error| StoreError::Unknown(error.to_string()))?;

    Ok(json!([
        recorded_at,
        record.line_item,
        record.amount,
        date_of_txn,
        record.txn_type.to_string(),
        record.category,
    ]))
}

/// Classify a transport-level failure. Timeouts and connection failures are
/// worth retrying; anything else is unexpected.
fn classify_request_error(error: reqwest::Error) -> StoreError {
    if error.is_timeout() || error.is_connect() {
        StoreError::Transient(error.to_string())
    } else {
        StoreError::Unknown(error.to_string())
    }
}

/// Classify a non-success HTTP status from the Sheets API.
fn classify_status(status: StatusCode, detail: &str) -> StoreError {
    let message = format!("{status}: {detail}");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Auth(message),
        StatusCode::NOT_FOUND => StoreError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => StoreError::Transient(message),
        status if status.is_server_error() => StoreError::Transient(message),
        _ => StoreError::Unknown(message),
    }
}


#[cfg(test)]
mod classification_tests {
    use reqwest::StatusCode;

    use crate::store::{StoreError, sheets::classify_status};

    #[test]
    fn auth_statuses_map_to_auth_errors() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let error = classify_status(status, "bad token");

            assert!(
                matches!(error, StoreError::Auth(_)),
                "want Auth for {status}, got {error:?}"
            );
        }
    }

    #[test]
    fn missing_spreadsheet_maps_to_not_found() {
        let error = classify_status(StatusCode::NOT_FOUND, "no such spreadsheet");

        assert!(matches!(error, StoreError::NotFound(_)));
    }

    #[test]
    fn rate_limits_and_server_errors_are_transient() {
        for status in [
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let error = classify_status(status, "try later");

            assert!(
                error.is_transient(),
                "want Transient for {status}, got {error:?}"
            );
        }
    }

    #[test]
    fn other_statuses_are_unknown() {
        let error = classify_status(StatusCode::BAD_REQUEST, "malformed range");

        assert!(matches!(error, StoreError::Unknown(_)));
    }
}
