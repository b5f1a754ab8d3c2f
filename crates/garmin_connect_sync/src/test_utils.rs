//! In-memory `GarminConnect` used by the unit tests.
#![cfg(test)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use garmin_connect_client::{ActivityRef, GarminConnect, GarminError, OriginalFile, UploadOptions};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

pub fn activity(id: u64, start: &str) -> ActivityRef {
    ActivityRef {
        id,
        start_time: DateTime::parse_from_rfc3339(start)
            .unwrap()
            .with_timezone(&Utc),
    }
}

/// Returns the same daily payloads for every date and serves a fixed
/// activity list. Anything not configured is absent.
#[derive(Default)]
pub struct MockClient {
    sleep: Option<Value>,
    hr: Option<Value>,
    movement: Option<Value>,
    summary: Option<Value>,
    activities: Vec<ActivityRef>,
    gpx: HashMap<u64, String>,
    /// Dates asked for, one entry per `pull_daily`.
    pub daily_requests: Mutex<Vec<NaiveDate>>,
}

impl MockClient {
    pub fn with_sleep(mut self, v: Value) -> Self {
        self.sleep = Some(v);
        self
    }

    pub fn with_hr(mut self, v: Value) -> Self {
        self.hr = Some(v);
        self
    }

    pub fn with_movement(mut self, v: Value) -> Self {
        self.movement = Some(v);
        self
    }

    pub fn with_summary(mut self, v: Value) -> Self {
        self.summary = Some(v);
        self
    }

    pub fn with_activities(mut self, activities: Vec<ActivityRef>) -> Self {
        self.activities = activities;
        self
    }

    pub fn with_gpx(mut self, id: u64, gpx: &str) -> Self {
        self.gpx.insert(id, gpx.to_string());
        self
    }
}

#[async_trait]
impl GarminConnect for MockClient {
    async fn get_daily_sleep_data(&self, date: NaiveDate) -> Result<Option<Value>, GarminError> {
        self.daily_requests.lock().unwrap().push(date);
        Ok(self.sleep.clone())
    }

    async fn get_daily_hr_data(&self, _date: NaiveDate) -> Result<Option<Value>, GarminError> {
        Ok(self.hr.clone())
    }

    async fn get_daily_movement(&self, _date: NaiveDate) -> Result<Option<Value>, GarminError> {
        Ok(self.movement.clone())
    }

    async fn get_user_summary(&self, _date: NaiveDate) -> Result<Option<Value>, GarminError> {
        Ok(self.summary.clone())
    }

    async fn fetch_activity_batch(
        &self,
        start: u32,
        limit: u32,
    ) -> Result<Vec<ActivityRef>, GarminError> {
        Ok(self
            .activities
            .iter()
            .skip(start as usize)
            .take(limit as usize)
            .copied()
            .collect())
    }

    async fn get_activity_summary(&self, _activity_id: u64) -> Result<Option<Value>, GarminError> {
        Ok(None)
    }

    async fn get_activity_details(&self, _activity_id: u64) -> Result<Option<Value>, GarminError> {
        Ok(None)
    }

    async fn get_activity_gpx(&self, activity_id: u64) -> Result<Option<String>, GarminError> {
        Ok(self.gpx.get(&activity_id).cloned())
    }

    async fn get_activity_tcx(&self, _activity_id: u64) -> Result<Option<String>, GarminError> {
        Ok(None)
    }

    async fn get_original_activity(
        &self,
        _activity_id: u64,
    ) -> Result<Option<OriginalFile>, GarminError> {
        Ok(None)
    }

    async fn upload_activity(
        &self,
        _file: &Path,
        _options: &UploadOptions,
    ) -> Result<u64, GarminError> {
        Err(GarminError::Upload("uploads are not supported by the mock".into()))
    }
}
