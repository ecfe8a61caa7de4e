use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::sim::{
    prediction::{PredictionFactors, Trend},
    RiskCategory,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Stored user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String, // normalized
    #[serde(rename = "password")]
    pub password_hash: String, // Argon2 PHC string
    #[serde(default)]
    pub location: Location,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub location: Location,
}

/// Partial profile update; `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub location: Option<Location>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AqiRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user: Uuid,
    #[serde(default)]
    pub location: Location,
    pub aqi: u32,
    pub pm25: u32,
    pub pm10: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewAqiRecord {
    pub user: Uuid,
    pub location: Location,
    pub aqi: u32,
    pub pm25: u32,
    pub pm10: u32,
    pub risk_level: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(default)]
    pub location: Location,
    pub predicted_aqi: u32,
    pub classification: RiskCategory,
    pub trend: Trend,
    pub factors: PredictionFactors,
    #[serde(with = "time::serde::rfc3339")]
    pub forecast_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPrediction {
    pub location: Location,
    pub predicted_aqi: u32,
    pub classification: RiskCategory,
    pub trend: Trend,
    pub factors: PredictionFactors,
    pub forecast_date: OffsetDateTime,
}
