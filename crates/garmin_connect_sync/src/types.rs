//! Typed views of the daily payload documents.
//!
//! The client hands these over as opaque JSON; only the fields that are
//! persisted are modelled. Missing fields become `None`.

use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SleepData {
    #[serde(rename = "dailySleepDTO")]
    pub daily_sleep: DailySleep,
    #[serde(rename = "sleepMovement", default)]
    pub sleep_movement: Option<Vec<SleepMovement>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailySleep {
    pub calendar_date: NaiveDate,
    #[serde(default)]
    pub sleep_time_seconds: Option<i64>,
    #[serde(rename = "sleepStartTimestampGMT", default)]
    pub sleep_start_timestamp_gmt: Option<i64>,
    #[serde(rename = "sleepEndTimestampGMT", default)]
    pub sleep_end_timestamp_gmt: Option<i64>,
    #[serde(default)]
    pub deep_sleep_seconds: Option<i64>,
    #[serde(default)]
    pub light_sleep_seconds: Option<i64>,
    #[serde(default)]
    pub rem_sleep_seconds: Option<i64>,
    #[serde(default)]
    pub awake_sleep_seconds: Option<i64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SleepMovement {
    #[serde(rename = "startGMT")]
    pub start_gmt: String,
    #[serde(rename = "endGMT")]
    pub end_gmt: String,
    #[serde(rename = "activityLevel")]
    pub activity_level: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateData {
    pub calendar_date: NaiveDate,
    #[serde(default)]
    pub max_heart_rate: Option<i64>,
    #[serde(default)]
    pub min_heart_rate: Option<i64>,
    #[serde(default)]
    pub resting_heart_rate: Option<i64>,
    /// `[epoch millis, bpm]` pairs; bpm is null while the watch was off-wrist.
    #[serde(default)]
    pub heart_rate_values: Option<Vec<(i64, Option<i64>)>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovementData {
    pub calendar_date: NaiveDate,
    #[serde(default)]
    pub movement_values: Option<Vec<(i64, Option<f64>)>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub calendar_date: NaiveDate,
    #[serde(default)]
    pub total_steps: Option<i64>,
    #[serde(default)]
    pub highly_active_seconds: Option<i64>,
    #[serde(default)]
    pub active_seconds: Option<i64>,
    #[serde(default)]
    pub sedentary_seconds: Option<i64>,
    #[serde(default)]
    pub sleeping_seconds: Option<i64>,
    #[serde(default)]
    pub max_stress_level: Option<i64>,
    #[serde(default)]
    pub low_stress_duration: Option<i64>,
    #[serde(default)]
    pub medium_stress_duration: Option<i64>,
    #[serde(default)]
    pub high_stress_duration: Option<i64>,
}
