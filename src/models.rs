// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

pub const DEFAULT_BASE_CURRENCY: &str = "INR";
pub const SUPPORTED_CURRENCIES: [&str; 4] = ["INR", "USD", "EUR", "GBP"];
pub const EXPENSE_CATEGORIES: [&str; 7] = [
    "Food",
    "Transport",
    "Shopping",
    "Bills",
    "Entertainment",
    "Health",
    "Other",
];
pub const FALLBACK_CATEGORY: &str = "Other";

/// Currency code -> factor against a common anchor unit (not necessarily the base currency).
pub type RateTable = HashMap<String, Decimal>;

/// Decoded through a wire struct of raw JSON values, so one odd field never rejects the
/// whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawExpense")]
pub struct ExpenseRecord {
    #[serde(rename = "_id")]
    pub id: String,
    /// `None` when the backend sent nothing usable; counts as zero everywhere.
    pub amount: Option<Decimal>,
    pub currency: String,
    pub category: Option<String>,
    pub note: Option<String>,
    /// `None` when the timestamp could not be parsed; such records are never bucketed by time.
    #[serde(rename = "date")]
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Wire shape of an expense. `_id` wins over `id` and `date` over `occurredAt`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawExpense {
    #[serde(rename = "_id")]
    mongo_id: Value,
    id: Value,
    amount: Value,
    currency: Value,
    category: Value,
    note: Value,
    date: Value,
    #[serde(rename = "occurredAt")]
    occurred_at: Value,
}

impl From<RawExpense> for ExpenseRecord {
    fn from(raw: RawExpense) -> Self {
        let occurred_at =
            instant_from_value(&raw.date).or_else(|| instant_from_value(&raw.occurred_at));
        Self {
            id: text_from_value(&raw.mongo_id)
                .or_else(|| text_from_value(&raw.id))
                .unwrap_or_default(),
            amount: decimal_from_value(&raw.amount),
            currency: text_from_value(&raw.currency).unwrap_or_default(),
            category: text_from_value(&raw.category),
            note: text_from_value(&raw.note),
            occurred_at,
        }
    }
}

impl ExpenseRecord {
    /// Display category. Empty or missing labels become "Other"; anything else is kept
    /// verbatim, whitespace included.
    pub fn category_label(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => FALLBACK_CATEGORY,
        }
    }

    pub fn note_text(&self) -> &str {
        self.note.as_deref().unwrap_or("")
    }

    pub fn amount_text(&self) -> String {
        self.amount.map(|a| a.to_string()).unwrap_or_default()
    }
}

/// Body of `POST /api/expenses`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExpense {
    pub amount: Decimal,
    pub category: String,
    pub note: String,
    pub currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "_id", alias = "userId", default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_currency: Option<String>,
}

impl UserProfile {
    pub fn base_currency(&self) -> &str {
        match self.base_currency.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => DEFAULT_BASE_CURRENCY,
        }
    }

    pub fn display_name(&self) -> &str {
        [&self.name, &self.username, &self.email]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .map(String::as_str)
            .unwrap_or("Unnamed User")
    }
}

/// Parses a JSON number or numeric string into a decimal; everything else is `None`.
pub fn decimal_from_value(v: &Value) -> Option<Decimal> {
    let text = match v {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Strings pass through and numbers or booleans are rendered; null, arrays and objects
/// are `None`.
pub fn text_from_value(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accepts RFC 3339, naive ISO datetimes (read as UTC), plain dates and epoch milliseconds.
pub fn instant_from_value(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => parse_instant(s),
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

fn lenient_id<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(text_from_value(&v).unwrap_or_default())
}
