//! Defines the core data models for transactions and the validation of client input.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{
    Error,
    database_id::{TransactionId, hex_string},
};

// ============================================================================
// MODELS
// ============================================================================

/// The format dates are accepted and returned in, e.g. "2024-01-15".
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

time::serde::format_description!(iso_date, Date, DATE_FORMAT);

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The name used for the type in JSON and in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(Error::Validation(
                "type must be either \"income\" or \"expense\"".to_owned(),
            )),
        }
    }
}

/// An income or expense entry as it is held in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The store-assigned ID of the transaction.
    #[serde(with = "hex_string")]
    pub id: TransactionId,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// A free-text category, e.g. "Food".
    pub category: String,
    /// Whether this is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// When the transaction happened.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// When the transaction was first stored.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last modified.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The validated, mutable fields of a transaction.
///
/// Use [TransactionInput::validate] to create one from client input.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFields {
    /// The amount of money spent or earned.
    pub amount: f64,
    /// A non-blank description.
    pub description: String,
    /// A non-blank category.
    pub category: String,
    /// Whether this is income or an expense.
    pub kind: TransactionType,
    /// When the transaction happened.
    pub date: Date,
}

impl TransactionFields {
    /// Combine the fields with the server-assigned ID and timestamps.
    pub fn into_transaction(
        self,
        id: TransactionId,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Transaction {
        Transaction {
            id,
            amount: self.amount,
            description: self.description,
            category: self.category,
            kind: self.kind,
            date: self.date,
            created_at,
            updated_at,
        }
    }
}

/// The JSON body clients send to create or update a transaction.
///
/// Every field is optional here so that a missing field can be reported by
/// name rather than as a generic deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    /// The amount of money spent or earned. Zero is allowed.
    pub amount: Option<f64>,
    /// Must not be blank.
    pub description: Option<String>,
    /// Must not be blank.
    pub category: Option<String>,
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// A date in the form `YYYY-MM-DD`.
    pub date: Option<String>,
}

impl TransactionInput {
    /// Check that every field is present and well-formed.
    ///
    /// # Errors
    /// Returns [Error::Validation] naming the first offending field.
    pub fn validate(self) -> Result<TransactionFields, Error> {
        let amount = self.amount.ok_or_else(|| missing("amount"))?;
        if !amount.is_finite() {
            return Err(Error::Validation("amount must be a finite number".to_owned()));
        }

        let description = required_text(self.description, "description")?;
        let category = required_text(self.category, "category")?;

        let kind = match self.kind {
            Some(kind) => kind.parse()?,
            None => return Err(missing("type")),
        };

        let date = match self.date {
            Some(date) => parse_date(&date)?,
            None => return Err(missing("date")),
        };

        Ok(TransactionFields {
            amount,
            description,
            category,
            kind,
            date,
        })
    }
}

/// Parse a date in the form `YYYY-MM-DD`.
///
/// # Errors
/// Returns [Error::Validation] if `text` is not a valid calendar date in that form.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    let invalid_date = || Error::Validation("Invalid date format. Use YYYY-MM-DD".to_owned());

    // `[year]` also accepts a sign and more than four digits.
    if !is_four_digit_year_date(text) {
        return Err(invalid_date());
    }

    Date::parse(text, DATE_FORMAT).map_err(|_| invalid_date())
}

/// Whether `text` has the shape `DDDD-DD-DD`, with ASCII digits only.
fn is_four_digit_year_date(text: &str) -> bool {
    let bytes = text.as_bytes();

    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, byte)| match i {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

/// The current time, truncated to the millisecond precision the store keeps.
pub fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();

    now.replace_millisecond(now.millisecond()).unwrap_or(now)
}

fn missing(field: &str) -> Error {
    Error::Validation(format!("{field} is required"))
}

fn required_text(value: Option<String>, field: &str) -> Result<String, Error> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(missing(field)),
    }
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod serialization_tests {
    use serde_json::json;
    use time::macros::{date, datetime};

    use crate::{
        database_id::parse_transaction_id,
        transaction::{Transaction, TransactionType},
    };

    #[test]
    fn serializes_with_api_field_names() {
        let transaction = Transaction {
            id: parse_transaction_id("65a4f0c2e4b0a1b2c3d4e5f6").unwrap(),
            amount: 42.5,
            description: "Groceries".to_owned(),
            category: "Food".to_owned(),
            kind: TransactionType::Expense,
            date: date!(2024 - 01 - 15),
            created_at: datetime!(2024-01-16 09:30:00.123 UTC),
            updated_at: datetime!(2024-01-16 09:30:00.123 UTC),
        };

        let value = serde_json::to_value(&transaction).unwrap();

        assert_eq!(
            value,
            json!({
                "id": "65a4f0c2e4b0a1b2c3d4e5f6",
                "amount": 42.5,
                "description": "Groceries",
                "category": "Food",
                "type": "expense",
                "date": "2024-01-15",
                "createdAt": "2024-01-16T09:30:00.123Z",
                "updatedAt": "2024-01-16T09:30:00.123Z",
            })
        );
        assert_eq!(serde_json::from_value::<Transaction>(value).unwrap(), transaction);
    }
}
