//! Session-authenticated client for the Garmin Connect web API.
//!
//! The client logs in through the single sign-on form, claims the ticket the
//! identity provider hands back and then reuses the resulting cookie session
//! for every resource request. Resources that legitimately do not exist for a
//! date or activity come back as `None`, never as an error.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

pub mod archive;
pub mod auth;
pub mod config;
pub mod http_client;
pub mod pagination;
pub mod upload;
pub mod utils;

pub use upload::{UploadFormat, UploadOptions};

#[derive(Debug, Error)]
pub enum GarminError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("client not connected: {0}")]
    Usage(String),
    #[error("request failed with status {status}: {body}")]
    Request { status: u16, body: String },
    #[error("unsupported upload format: {0}")]
    Format(String),
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("decoding error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

/// One recorded exercise session: upstream id and UTC start time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ActivityRef {
    pub id: u64,
    pub start_time: DateTime<Utc>,
}

/// The file originally uploaded for an activity, unpacked from its archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OriginalFile {
    /// Lowercase extension without the dot, e.g. `fit`.
    pub extension: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait GarminConnect: Send + Sync {
    /// Sleep summary and sleep movement for one night.
    async fn get_daily_sleep_data(
        &self,
        date: NaiveDate,
    ) -> Result<Option<serde_json::Value>, GarminError>;

    /// Heart rate samples plus min/max/resting values for one day.
    async fn get_daily_hr_data(
        &self,
        date: NaiveDate,
    ) -> Result<Option<serde_json::Value>, GarminError>;

    async fn get_daily_movement(
        &self,
        date: NaiveDate,
    ) -> Result<Option<serde_json::Value>, GarminError>;

    /// Steps, activity seconds and stress durations for one day.
    async fn get_user_summary(
        &self,
        date: NaiveDate,
    ) -> Result<Option<serde_json::Value>, GarminError>;

    /// Fetch up to `limit` activities starting at `start`, most recent first.
    ///
    /// An out-of-range `start` yields an empty batch.
    async fn fetch_activity_batch(
        &self,
        start: u32,
        limit: u32,
    ) -> Result<Vec<ActivityRef>, GarminError>;

    async fn get_activity_summary(
        &self,
        activity_id: u64,
    ) -> Result<Option<serde_json::Value>, GarminError>;

    async fn get_activity_details(
        &self,
        activity_id: u64,
    ) -> Result<Option<serde_json::Value>, GarminError>;

    async fn get_activity_gpx(&self, activity_id: u64) -> Result<Option<String>, GarminError>;

    /// `None` when the activity has no TCX source (e.g. it was uploaded as GPX).
    async fn get_activity_tcx(&self, activity_id: u64) -> Result<Option<String>, GarminError>;

    /// `None` when the activity has no file source, e.g. it was entered manually.
    async fn get_original_activity(
        &self,
        activity_id: u64,
    ) -> Result<Option<OriginalFile>, GarminError>;

    async fn get_activity_fit(&self, activity_id: u64) -> Result<Option<Vec<u8>>, GarminError> {
        Ok(self
            .get_original_activity(activity_id)
            .await?
            .filter(|file| file.extension == "fit")
            .map(|file| file.bytes))
    }

    /// Upload a GPX, TCX or FIT file and return the id of the new activity.
    async fn upload_activity(
        &self,
        file: &Path,
        options: &UploadOptions,
    ) -> Result<u64, GarminError>;
}
