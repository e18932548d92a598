//! Captured exchange data model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// One captured HTTP request/response pair.
///
/// Serializes with camelCase keys in declaration order; the JSON form is the
/// canonical encoding the [`crate::store::ExchangeStore`] round-trips.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRecord {
    /// Random 128-bit identifier
    pub id: Uuid,
    /// Request path as received (not the route template)
    pub endpoint: String,
    /// Upper-case HTTP verb
    pub method: String,
    /// Parsed request body, or a JSON string placeholder for GET
    pub request_body: Option<Value>,
    /// First value per header name
    pub request_headers: BTreeMap<String, String>,
    /// First value per query parameter
    pub query_params: BTreeMap<String, String>,
    /// Template variable -> resolved value
    pub path_variables: BTreeMap<String, String>,
    /// Parsed JSON when the response was JSON, otherwise the raw text
    pub response_body: Option<Value>,
    pub status_code: u16,
    /// Wall-clock instant, second precision on the wire
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    /// Elapsed milliseconds from pre-handler to post-handler
    pub execution_time: u64,
    /// Remote peer address
    pub client_ip: String,
}

/// Wire format for [`ExchangeRecord::timestamp`]: `yyyy-MM-dd HH:mm:ss`,
/// never epoch numbers.
pub mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}
