//! The transaction record model and the validation boundary that produces it.
//!
//! Incoming webhook payloads are loosely typed ([RawTransaction]); the only
//! way to obtain a [TransactionRecord] is through [validate], so any record
//! held by the rest of the application is known to be well formed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, Duration, macros::format_description};

// `Date`'s derive-default serde representation is a [year, ordinal] tuple;
// this module renders and parses the ISO `YYYY-MM-DD` form instead.
time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// The maximum accepted length for `line_item` and `category`.
pub const MAX_TEXT_LENGTH: usize = 256;

/// How far ahead of the server's UTC date a transaction date may be.
///
/// One day of slack absorbs clients submitting from time zones that are
/// already on tomorrow's date.
const FUTURE_DATE_TOLERANCE: Duration = Duration::days(1);

/// The errors that can occur while validating a raw webhook payload.
///
/// Validation stops at the first failing check, so each error names exactly
/// one offending field (see [ValidationError::field]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was absent from the payload.
    #[error("{0} is required")]
    Missing(&'static str),

    /// A text field was present but empty or whitespace-only.
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// A text field exceeded [MAX_TEXT_LENGTH].
    #[error("{0} must be {MAX_TEXT_LENGTH} characters or fewer")]
    TooLong(&'static str),

    /// The amount could not be read as a decimal number.
    #[error("amount must be a number")]
    AmountNotNumeric,

    /// The amount was zero or negative. The sign of a transaction is carried
    /// by its type, so magnitudes must be strictly positive.
    #[error("amount must be greater than 0")]
    AmountNotPositive,

    /// The date did not parse as a `YYYY-MM-DD` calendar date.
    #[error("date_of_txn must be a valid date in YYYY-MM-DD format")]
    InvalidDate,

    /// The date was further in the future than the allowed tolerance.
    #[error("date_of_txn must not be in the future")]
    FutureDate,

    /// The type was something other than "Expense" or "Income".
    #[error("type must be either \"Expense\" or \"Income\"")]
    InvalidType,
}

impl ValidationError {
    /// The name of the payload field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing(field)
            | ValidationError::Empty(field)
            | ValidationError::TooLong(field) => field,
            ValidationError::AmountNotNumeric | ValidationError::AmountNotPositive => "amount",
            ValidationError::InvalidDate | ValidationError::FutureDate => "date_of_txn",
            ValidationError::InvalidType => "type",
        }
    }
}

/// Whether a transaction took money out or brought money in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money spent.
    Expense,
    /// Money earned.
    Income,
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    /// Parse a transaction type, ignoring case ("expense" and "EXPENSE" are
    /// both accepted).
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();

        if text.eq_ignore_ascii_case("expense") {
            Ok(TransactionType::Expense)
        } else if text.eq_ignore_ascii_case("income") {
            Ok(TransactionType::Income)
        } else {
            Err(ValidationError::InvalidType)
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Expense => write!(f, "Expense"),
            TransactionType::Income => write!(f, "Income"),
        }
    }
}

/// The raw, untrusted webhook payload as it arrives over HTTP.
///
/// Every field is optional so that missing-field errors are reported with
/// this crate's field-level messages rather than a serde parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    /// Description of the transaction.
    #[serde(default)]
    pub line_item: Option<String>,
    /// The monetary amount, as a JSON number or a numeric string.
    #[serde(default)]
    pub amount: Option<RawAmount>,
    /// The transaction date as `YYYY-MM-DD` text.
    #[serde(default)]
    pub date_of_txn: Option<String>,
    /// "Expense" or "Income", any casing.
    #[serde(default, rename = "type")]
    pub txn_type: Option<String>,
    /// Free-form category label.
    #[serde(default)]
    pub category: Option<String>,
}

/// An amount field before coercion. Clients such as voice shortcuts often
/// send numbers as strings, so both representations are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    /// A JSON number, e.g. `3.5`.
    Number(f64),
    /// A numeric string, e.g. `"3.5"`.
    Text(String),
}

/// A validated, normalized ledger entry.
///
/// Records are only ever built by [validate] and are not modified after
/// construction; they live for the duration of one request and are consumed
/// by a single append attempt against the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    /// Description of the transaction, trimmed.
    pub line_item: String,
    /// Positive amount rounded to 2 decimal places; the sign is conveyed by
    /// `txn_type`.
    pub amount: f64,
    /// The calendar date the transaction occurred, rendered as `YYYY-MM-DD`.
    #[serde(with = "iso_date")]
    pub date_of_txn: Date,
    /// Whether this is an expense or income entry.
    #[serde(rename = "type")]
    pub txn_type: TransactionType,
    /// User-defined category label, trimmed.
    pub category: String,
}

/// Validate and normalize a raw payload into a [TransactionRecord].
///
/// Checks run in order: field presence, type coercion, then range checks.
/// The first failing check wins and no partially constructed record ever
/// escapes. `today` is the server's current UTC date, passed in so the
/// function stays a pure function of its inputs.
///
/// # Errors
/// Returns a [ValidationError] naming the offending field and reason.
pub fn validate(raw: RawTransaction, today: Date) -> Result<TransactionRecord, ValidationError> {
    let line_item = required_text("line_item", raw.line_item)?;
    let raw_amount = raw
        .amount
        .ok_or(ValidationError::Missing("amount"))?;
    let date_text = raw
        .date_of_txn
        .ok_or(ValidationError::Missing("date_of_txn"))?;
    let type_text = required_text("type", raw.txn_type)?;
    let category = required_text("category", raw.category)?;

    let amount = parse_amount(raw_amount)?;
    let date_of_txn = parse_date(&date_text)?;
    let txn_type = type_text.parse::<TransactionType>()?;

    if amount <= 0.0 {
        return Err(ValidationError::AmountNotPositive);
    }

    if date_of_txn > today.saturating_add(FUTURE_DATE_TOLERANCE) {
        return Err(ValidationError::FutureDate);
    }

    Ok(TransactionRecord {
        line_item,
        amount: round_to_cents(amount),
        date_of_txn,
        txn_type,
        category,
    })
}

/// Check that a text field is present, non-empty after trimming, and within
/// the length bound. Returns the trimmed text.
fn required_text(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    let text = value.ok_or(ValidationError::Missing(field))?;
    let text = text.trim();

    if text.is_empty() {
        return Err(ValidationError::Empty(field));
    }

    if text.chars().count() > MAX_TEXT_LENGTH {
        return Err(ValidationError::TooLong(field));
    }

    Ok(text.to_owned())
}

fn parse_amount(raw: RawAmount) -> Result<f64, ValidationError> {
    let amount = match raw {
        RawAmount::Number(number) => number,
        RawAmount::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::AmountNotNumeric)?,
    };

    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(ValidationError::AmountNotNumeric)
    }
}

fn parse_date(text: &str) -> Result<Date, ValidationError> {
    let format = format_description!("[year]-[month]-[day]");

    Date::parse(text.trim(), &format).map_err(|_| ValidationError::InvalidDate)
}

fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod validate_tests {
    use time::macros::date;

    use crate::record::{
        RawAmount, RawTransaction, TransactionType, ValidationError, validate,
    };

    const TODAY: time::Date = date!(2025 - 09 - 14);

    fn coffee_payload() -> RawTransaction {
        RawTransaction {
            line_item: Some("Coffee".to_owned()),
            amount: Some(RawAmount::Number(3.5)),
            date_of_txn: Some("2025-09-13".to_owned()),
            txn_type: Some("Expense".to_owned()),
            category: Some("Food".to_owned()),
        }
    }

    #[test]
    fn valid_payload_produces_normalized_record() {
        let record = validate(coffee_payload(), TODAY).expect("payload should be valid");

        assert_eq!(record.line_item, "Coffee");
        assert_eq!(record.amount, 3.5);
        assert_eq!(record.date_of_txn, date!(2025 - 09 - 13));
        assert_eq!(record.txn_type, TransactionType::Expense);
        assert_eq!(record.category, "Food");
    }

    #[test]
    fn validation_is_idempotent() {
        let first = validate(coffee_payload(), TODAY).expect("payload should be valid");
        let second = validate(coffee_payload(), TODAY).expect("payload should be valid");

        assert_eq!(first, second);
    }

    #[test]
    fn text_fields_are_trimmed() {
        let mut payload = coffee_payload();
        payload.line_item = Some("  Coffee  ".to_owned());
        payload.category = Some(" Food ".to_owned());

        let record = validate(payload, TODAY).expect("payload should be valid");

        assert_eq!(record.line_item, "Coffee");
        assert_eq!(record.category, "Food");
    }

    #[test]
    fn amount_is_rounded_to_two_decimal_places() {
        let mut payload = coffee_payload();
        payload.amount = Some(RawAmount::Number(3.456));

        let record = validate(payload, TODAY).expect("payload should be valid");

        assert_eq!(record.amount, 3.46);
    }

    #[test]
    fn amount_accepts_numeric_strings() {
        let mut payload = coffee_payload();
        payload.amount = Some(RawAmount::Text("12.30".to_owned()));

        let record = validate(payload, TODAY).expect("payload should be valid");

        assert_eq!(record.amount, 12.3);
    }

    #[test]
    fn type_parsing_ignores_case() {
        for (text, want) in [
            ("expense", TransactionType::Expense),
            ("EXPENSE", TransactionType::Expense),
            ("income", TransactionType::Income),
            ("Income", TransactionType::Income),
        ] {
            let mut payload = coffee_payload();
            payload.txn_type = Some(text.to_owned());

            let record = validate(payload, TODAY).expect("payload should be valid");

            assert_eq!(record.txn_type, want, "type text {text:?}");
        }
    }

    #[test]
    fn missing_fields_are_named() {
        let cases: Vec<(&str, RawTransaction)> = vec![
            (
                "line_item",
                RawTransaction {
                    line_item: None,
                    ..coffee_payload()
                },
            ),
            (
                "amount",
                RawTransaction {
                    amount: None,
                    ..coffee_payload()
                },
            ),
            (
                "date_of_txn",
                RawTransaction {
                    date_of_txn: None,
                    ..coffee_payload()
                },
            ),
            (
                "type",
                RawTransaction {
                    txn_type: None,
                    ..coffee_payload()
                },
            ),
            (
                "category",
                RawTransaction {
                    category: None,
                    ..coffee_payload()
                },
            ),
        ];

        for (want_field, payload) in cases {
            let error = validate(payload, TODAY).expect_err("payload should be rejected");

            assert_eq!(
                error,
                ValidationError::Missing(want_field),
                "want missing {want_field}, got {error:?}"
            );
            assert_eq!(error.field(), want_field);
        }
    }

    #[test]
    fn whitespace_only_text_is_rejected() {
        let mut payload = coffee_payload();
        payload.line_item = Some("   ".to_owned());

        let error = validate(payload, TODAY).expect_err("payload should be rejected");

        assert_eq!(error, ValidationError::Empty("line_item"));
    }

    #[test]
    fn overlong_text_is_rejected() {
        let mut payload = coffee_payload();
        payload.category = Some("x".repeat(257));

        let error = validate(payload, TODAY).expect_err("payload should be rejected");

        assert_eq!(error, ValidationError::TooLong("category"));
    }

    #[test]
    fn length_bound_counts_characters_not_bytes() {
        // 200 characters but 400 bytes; must still be accepted.
        let mut payload = coffee_payload();
        payload.line_item = Some("é".repeat(200));

        assert!(validate(payload, TODAY).is_ok());

        let mut payload = coffee_payload();
        payload.line_item = Some("é".repeat(257));

        let error = validate(payload, TODAY).expect_err("payload should be rejected");

        assert_eq!(error, ValidationError::TooLong("line_item"));
    }

    #[test]
    fn record_serializes_its_date_as_an_iso_string() {
        let record = validate(coffee_payload(), TODAY).expect("payload should be valid");

        let json = serde_json::to_value(&record).expect("record should serialize");

        assert_eq!(json["date_of_txn"], "2025-09-13");
        assert_eq!(json["type"], "Expense");
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        for amount in [0.0, -5.0] {
            let mut payload = coffee_payload();
            payload.amount = Some(RawAmount::Number(amount));

            let error = validate(payload, TODAY).expect_err("payload should be rejected");

            assert_eq!(
                error,
                ValidationError::AmountNotPositive,
                "amount {amount}"
            );
        }
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        let mut payload = coffee_payload();
        payload.amount = Some(RawAmount::Text("a lot".to_owned()));

        let error = validate(payload, TODAY).expect_err("payload should be rejected");

        assert_eq!(error, ValidationError::AmountNotNumeric);
    }

    #[test]
    fn malformed_date_is_rejected() {
        for text in ["13/09/2025", "2025-13-40", "yesterday"] {
            let mut payload = coffee_payload();
            payload.date_of_txn = Some(text.to_owned());

            let error = validate(payload, TODAY).expect_err("payload should be rejected");

            assert_eq!(error, ValidationError::InvalidDate, "date text {text:?}");
        }
    }

    #[test]
    fn tomorrow_is_within_the_future_tolerance() {
        let mut payload = coffee_payload();
        payload.date_of_txn = Some("2025-09-15".to_owned());

        assert!(validate(payload, TODAY).is_ok());
    }

    #[test]
    fn dates_beyond_the_tolerance_are_rejected() {
        let mut payload = coffee_payload();
        payload.date_of_txn = Some("2025-09-16".to_owned());

        let error = validate(payload, TODAY).expect_err("payload should be rejected");

        assert_eq!(error, ValidationError::FutureDate);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let mut payload = coffee_payload();
        payload.txn_type = Some("Transfer".to_owned());

        let error = validate(payload, TODAY).expect_err("payload should be rejected");

        assert_eq!(error, ValidationError::InvalidType);
    }
}
