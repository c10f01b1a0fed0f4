use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Result of an authorization-code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    #[serde(rename = "access_token")]
    pub value: String,
    #[serde(rename = "token_type")]
    pub kind: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(rename = "x_user_id", default)]
    pub user_id: u64,
}

/// Per-call request description handed to the request builder.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    pub queries: BTreeMap<String, Value>,
    pub values: BTreeMap<String, Value>,
    pub with_bearer: bool,
    pub with_form_url_encoded: bool,
}

impl RequestParams {
    pub fn bearer() -> Self {
        Self {
            with_bearer: true,
            ..Self::default()
        }
    }

    pub fn form() -> Self {
        Self {
            with_form_url_encoded: true,
            ..Self::default()
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.queries.insert(key.into(), value.into());
        self
    }

    pub fn value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(rename = "polar-user-id")]
    pub id: u64,
    #[serde(rename = "first-name")]
    pub first_name: String,
    #[serde(rename = "last-name")]
    pub last_name: String,
    #[serde(rename = "birthdate")]
    pub birthday: String,
    pub gender: String,
    #[serde(rename = "registration-date")]
    pub registration_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartRate {
    pub average: u16,
    pub maximum: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exercise {
    pub id: String,
    pub sport: String,
    pub device: String,
    pub has_route: bool,
    pub calories: f64,
    pub distance: f64,
    pub training_load: f64,
    pub fat_percentage: u8,
    pub protein_percentage: u8,
    pub carbohydrate_percentage: u8,
    /// ISO 8601 duration, e.g. `PT1H30M`.
    pub duration: String,
    pub start_time: String,
    pub heart_rate: HeartRate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sleep {
    pub date: Option<NaiveDate>,
    pub device_id: String,
    pub continuity: f64,
    #[serde(rename = "sleep_score")]
    pub score: u64,
    #[serde(rename = "light_sleep")]
    pub light: u64,
    #[serde(rename = "deep_sleep")]
    pub deep: u64,
    #[serde(rename = "rem_sleep")]
    pub rem: u64,
    #[serde(rename = "total_interruption_duration")]
    pub interruption: u64,
    #[serde(rename = "sleep_start_time")]
    pub start: Option<DateTime<FixedOffset>>,
    #[serde(rename = "sleep_end_time")]
    pub end: Option<DateTime<FixedOffset>>,
}

/// A "Nightly Recharge" summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recharge {
    pub date: Option<NaiveDate>,
    pub heart_rate_avg: u64,
    pub beat_to_beat_avg: u64,
    pub heart_rate_variability_avg: u64,
    pub breathing_rate_avg: f64,
    pub ans_charge: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_uses_wire_names() {
        let token: AccessToken = serde_json::from_str(
            r#"{"access_token":"abc","token_type":"bearer","expires_in":3600,"x_user_id":42}"#,
        )
        .unwrap();
        assert_eq!(token.value, "abc");
        assert_eq!(token.kind, "bearer");
        assert_eq!(token.expires_in, 3600);
        assert_eq!(token.user_id, 42);
    }

    #[test]
    fn access_token_requires_value() {
        let result = serde_json::from_str::<AccessToken>(r#"{"error":"invalid_grant"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn sleep_decodes_partial_payload() {
        let sleep: Sleep = serde_json::from_str(
            r#"{
                "date": "2020-01-01",
                "sleep_score": 80,
                "sleep_start_time": "2020-01-01T23:03:38.000+02:00"
            }"#,
        )
        .unwrap();
        assert_eq!(sleep.score, 80);
        assert_eq!(sleep.date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert!(sleep.start.is_some());
        assert!(sleep.end.is_none());
    }

    #[test]
    fn user_uses_hyphenated_keys() {
        let user: User = serde_json::from_str(
            r#"{"polar-user-id":7,"first-name":"Ada","last-name":"Lovelace","gender":"FEMALE"}"#,
        )
        .unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.last_name, "Lovelace");
        assert!(user.registration_date.is_empty());
    }

    #[test]
    fn request_params_builders() {
        let params = RequestParams::form()
            .value("grant_type", "authorization_code")
            .query("samples", true);
        assert!(params.with_form_url_encoded);
        assert!(!params.with_bearer);
        assert_eq!(params.values.len(), 1);
        assert_eq!(params.queries["samples"], Value::Bool(true));
        assert!(RequestParams::bearer().with_bearer);
    }
}
