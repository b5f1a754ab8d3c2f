//! HTTP client implementation for the Garmin Connect API.
//!
//! This module provides a reqwest-based implementation of the [`GarminConnect`](crate::GarminConnect) trait.

use crate::config::Config;
use crate::pagination::DEFAULT_BATCH_SIZE;
use crate::upload::{UploadFormat, UploadOptions};
use crate::{ActivityRef, GarminConnect, GarminError, OriginalFile, archive, auth, upload, utils};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::de::Error as _;
use std::path::Path;
use tracing::{debug, info};

/// Upstream URLs, all derived from the SSO login URL and the Connect base URL.
#[derive(Clone, Debug)]
struct Endpoints {
    sso_url: String,
    base_url: String,
}

impl Endpoints {
    fn api(&self, path: &str) -> String {
        format!("{}/modern/proxy/{}", self.base_url, path)
    }

    fn service(&self) -> String {
        format!("{}/modern", self.base_url)
    }

    fn legacy_session(&self) -> String {
        format!("{}/legacy/session", self.base_url)
    }

    fn activity_update(&self, activity_id: u64) -> String {
        format!(
            "{}/proxy/activity-service/activity/{}",
            self.base_url, activity_id
        )
    }
}

/// Client for the Garmin Connect API using reqwest.
///
/// Holds no session until [`connect`](Self::connect) succeeds; every resource
/// operation fails with [`GarminError::Usage`] until then.
#[derive(Debug)]
pub struct ReqwestGarminClient {
    endpoints: Endpoints,
    display_name: String,
    batch_size: u32,
    session: Option<reqwest::Client>,
}

impl ReqwestGarminClient {
    /// Create a new, unconnected client instance.
    ///
    /// # Arguments
    /// * `sso_url` - The login form URL (e.g., "https://sso.garmin.com/sso/login")
    /// * `base_url` - The Connect site root (e.g., "https://connect.garmin.com")
    /// * `display_name` - Account identifier used in wellness endpoint paths
    pub fn new(sso_url: &str, base_url: &str, display_name: impl Into<String>) -> Self {
        Self {
            endpoints: Endpoints {
                sso_url: sso_url.to_string(),
                base_url: base_url.trim_end_matches('/').to_string(),
            },
            display_name: display_name.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            session: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.sso_url, &config.base_url, config.display_name.clone())
    }

    /// Override the page size used by [`list_activities`](Self::list_activities).
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Log in and establish an authenticated session.
    ///
    /// The session is only stored once every step succeeded; on failure the
    /// client is left disconnected.
    pub async fn connect(
        &mut self,
        username: &str,
        password: &SecretString,
    ) -> Result<(), GarminError> {
        self.session = None;
        let session = reqwest::Client::builder().cookie_store(true).build()?;

        info!("authenticating user ...");
        let form = [
            ("username", username),
            ("password", password.expose_secret()),
            ("embed", "false"),
        ];
        let auth_response = session
            .post(&self.endpoints.sso_url)
            .query(&[("service", self.endpoints.service())])
            .form(&form)
            .send()
            .await?;
        let status = auth_response.status();
        let body = auth_response.text().await?;
        debug!("got auth response: {}", body);
        if !status.is_success() {
            return Err(GarminError::Authentication(format!(
                "login form rejected with status {}; did you enter valid credentials?",
                status.as_u16()
            )));
        }
        let ticket_url = auth::extract_ticket_url(&body)?;
        debug!("auth ticket url: '{}'", ticket_url);

        info!("claiming auth ticket ...");
        let response = session.get(&ticket_url).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GarminError::Authentication(format!(
                "failed to claim auth ticket: {ticket_url}: {status}\n{body}"
            )));
        }

        if let Err(e) = session.get(self.endpoints.legacy_session()).send().await {
            debug!("session warm-up failed: {}", e);
        }

        self.session = Some(session);
        Ok(())
    }

    /// Drop the session. Later resource calls fail with [`GarminError::Usage`].
    pub fn disconnect(&mut self) {
        if self.session.take().is_some() {
            debug!("session closed");
        }
    }

    /// Lazily page through every activity of the account.
    pub fn list_activities(
        &self,
    ) -> impl futures_util::Stream<Item = Result<ActivityRef, GarminError>> + '_ {
        crate::pagination::list_activities(self, self.batch_size)
    }

    fn session(&self) -> Result<&reqwest::Client, GarminError> {
        self.session.as_ref().ok_or_else(|| {
            GarminError::Usage(
                "attempt to use the client without being connected; call connect() first".into(),
            )
        })
    }

    /// Extract error information from a failed response.
    async fn error_from_response(resp: reqwest::Response) -> GarminError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        GarminError::Request { status, body }
    }

    /// GET a resource; 404 and 204 mean the resource does not exist.
    async fn get_resource(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<reqwest::Response>, GarminError> {
        let session = self.session()?;
        debug!("GET {}", url);
        let resp = session.get(url).query(query).send().await?;
        match resp.status() {
            StatusCode::OK => {
                record_request("ok");
                Ok(Some(resp))
            }
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => {
                record_request("absent");
                info!("response unavailable for request {}", url);
                Ok(None)
            }
            _ => {
                record_request("error");
                Err(Self::error_from_response(resp).await)
            }
        }
    }

    async fn get_text(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<String>, GarminError> {
        match self.get_resource(url, query).await? {
            Some(resp) => Ok(Some(resp.text().await?)),
            None => Ok(None),
        }
    }

    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<serde_json::Value>, GarminError> {
        match self.get_text(url, query).await? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn wellness_url(&self, resource: &str) -> String {
        self.endpoints.api(&format!(
            "wellness-service/wellness/{}/{}",
            resource, self.display_name
        ))
    }
}

fn record_request(outcome: &'static str) {
    metrics::counter!("garmin_connect_requests_total", "outcome" => outcome).increment(1);
}

#[derive(serde::Deserialize)]
struct ActivityListEntry {
    #[serde(rename = "activityId")]
    activity_id: u64,
    #[serde(rename = "startTimeGMT")]
    start_time_gmt: String,
}

#[async_trait]
impl GarminConnect for ReqwestGarminClient {
    async fn get_daily_sleep_data(
        &self,
        date: NaiveDate,
    ) -> Result<Option<serde_json::Value>, GarminError> {
        let url = self.wellness_url("dailySleepData");
        self.get_json(
            &url,
            &[
                ("date", date.to_string()),
                ("nonSleepBufferMinutes", "60".to_string()),
            ],
        )
        .await
    }

    async fn get_daily_hr_data(
        &self,
        date: NaiveDate,
    ) -> Result<Option<serde_json::Value>, GarminError> {
        let url = self.wellness_url("dailyHeartRate");
        self.get_json(&url, &[("date", date.to_string())]).await
    }

    async fn get_daily_movement(
        &self,
        date: NaiveDate,
    ) -> Result<Option<serde_json::Value>, GarminError> {
        let url = self.wellness_url("dailyMovement");
        self.get_json(&url, &[("calendarDate", date.to_string())])
            .await
    }

    async fn get_user_summary(
        &self,
        date: NaiveDate,
    ) -> Result<Option<serde_json::Value>, GarminError> {
        let url = self.endpoints.api(&format!(
            "usersummary-service/usersummary/daily/{}",
            self.display_name
        ));
        self.get_json(&url, &[("calendarDate", date.to_string())])
            .await
    }

    async fn fetch_activity_batch(
        &self,
        start: u32,
        limit: u32,
    ) -> Result<Vec<ActivityRef>, GarminError> {
        let session = self.session()?;
        let url = self
            .endpoints
            .api("activitylist-service/activities/search/activities");
        let resp = session
            .get(&url)
            .query(&[("start", start), ("limit", limit)])
            .send()
            .await?;
        if resp.status() != StatusCode::OK {
            record_request("error");
            return Err(Self::error_from_response(resp).await);
        }
        record_request("ok");
        let text = resp.text().await?;
        let entries: Option<Vec<ActivityListEntry>> = serde_json::from_str(&text)?;
        entries
            .unwrap_or_default()
            .into_iter()
            .map(|entry| {
                let start_time =
                    utils::parse_gmt_timestamp(&entry.start_time_gmt).ok_or_else(|| {
                        GarminError::Decode(serde_json::Error::custom(format!(
                            "activity {} has unparsable startTimeGMT '{}'",
                            entry.activity_id, entry.start_time_gmt
                        )))
                    })?;
                Ok(ActivityRef {
                    id: entry.activity_id,
                    start_time,
                })
            })
            .collect()
    }

    async fn get_activity_summary(
        &self,
        activity_id: u64,
    ) -> Result<Option<serde_json::Value>, GarminError> {
        let url = self
            .endpoints
            .api(&format!("activity-service/activity/{}", activity_id));
        self.get_json(&url, &[]).await
    }

    async fn get_activity_details(
        &self,
        activity_id: u64,
    ) -> Result<Option<serde_json::Value>, GarminError> {
        let url = self.endpoints.api(&format!(
            "activity-service-1.3/json/activityDetails/{}",
            activity_id
        ));
        self.get_json(&url, &[]).await
    }

    async fn get_activity_gpx(&self, activity_id: u64) -> Result<Option<String>, GarminError> {
        let url = self.endpoints.api(&format!(
            "download-service/export/gpx/activity/{}",
            activity_id
        ));
        self.get_text(&url, &[]).await
    }

    async fn get_activity_tcx(&self, activity_id: u64) -> Result<Option<String>, GarminError> {
        let url = self.endpoints.api(&format!(
            "download-service/export/tcx/activity/{}",
            activity_id
        ));
        self.get_text(&url, &[]).await
    }

    async fn get_original_activity(
        &self,
        activity_id: u64,
    ) -> Result<Option<OriginalFile>, GarminError> {
        let url = self
            .endpoints
            .api(&format!("download-service/files/activity/{}", activity_id));
        let Some(resp) = self.get_resource(&url, &[]).await? else {
            return Ok(None);
        };
        let bytes = resp.bytes().await?;
        archive::extract_activity_file(&bytes, activity_id)
    }

    async fn upload_activity(
        &self,
        file: &Path,
        options: &UploadOptions,
    ) -> Result<u64, GarminError> {
        let format = match options.format {
            Some(format) => format,
            None => UploadFormat::from_path(file)?,
        };
        let session = self.session()?;

        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("activity")
            .to_string();
        let contents = tokio::fs::read(file).await?;
        let form = Form::new().part("data", Part::bytes(contents).file_name(file_name));

        info!("uploading {} as {} ...", file.display(), format);
        let url = self
            .endpoints
            .api(&format!("upload-service/upload/.{}", format.extension()));
        let resp = session
            .post(&url)
            .header("nk", "NT")
            .multipart(form)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        let activity_id = upload::parse_import_result(format, status, &body)?;

        if let Some(metadata) = options.metadata(activity_id) {
            let resp = session
                .put(self.endpoints.activity_update(activity_id))
                .json(&metadata)
                .send()
                .await?;
            if resp.status() != StatusCode::NO_CONTENT {
                let status = resp.status().as_u16();
                let body = resp.text().await.unwrap_or_default();
                return Err(GarminError::Upload(format!(
                    "failed to set metadata for activity {activity_id}: {status}\n{body}"
                )));
            }
        }
        Ok(activity_id)
    }
}
