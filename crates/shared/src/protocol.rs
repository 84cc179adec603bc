use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::{BillId, BillStatus, UserType};

/// A bill exactly as the store returns it.
///
/// Only `id` is mandatory on decode. Other fields accept `null` and values of
/// the wrong JSON type so partially corrupt records still reach the client
/// and can be displayed with fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBill {
    #[serde(deserialize_with = "bill_id")]
    pub id: BillId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub expense_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vat: String,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub commentary: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub comment_admin: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_name: Option<String>,
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn bill_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BillId, D::Error> {
    scalar_to_string(Value::deserialize(deserializer)?)
        .filter(|id| !id.is_empty())
        .map(BillId)
        .ok_or_else(|| serde::de::Error::custom("bill id must be a non-empty string or number"))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_to_string(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_optional_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(scalar_to_string(Value::deserialize(deserializer)?))
}

/// Numbers and numeric strings; anything else reads as absent.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    })
}

/// Body sent to the store when persisting a new bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillPayload {
    pub email: String,
    #[serde(rename = "type")]
    pub expense_type: String,
    pub name: String,
    pub amount: Option<i64>,
    pub date: String,
    pub vat: String,
    pub pct: i64,
    pub commentary: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub status: BillStatus,
}

/// Store answer to a receipt upload. `key` identifies the draft bill the
/// store created for the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_url: String,
    #[serde(default)]
    pub file_name: String,
    pub key: BillId,
}

/// The `user` entry of the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(rename = "type")]
    pub user_type: UserType,
    #[serde(default)]
    pub email: String,
}
