//! Upload formats, options and import-result parsing.

use crate::GarminError;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadFormat {
    Gpx,
    Tcx,
    Fit,
}

impl UploadFormat {
    pub fn extension(self) -> &'static str {
        match self {
            UploadFormat::Gpx => "gpx",
            UploadFormat::Tcx => "tcx",
            UploadFormat::Fit => "fit",
        }
    }

    /// Guess the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, GarminError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        ext.parse().map_err(|_| {
            GarminError::Format(format!("could not guess file type for {}", path.display()))
        })
    }
}

impl FromStr for UploadFormat {
    type Err = GarminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gpx" => Ok(UploadFormat::Gpx),
            "tcx" => Ok(UploadFormat::Tcx),
            "fit" => Ok(UploadFormat::Fit),
            other => Err(GarminError::Format(format!(
                "'{other}' is not one of gpx, tcx, fit"
            ))),
        }
    }
}

impl fmt::Display for UploadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Format override and metadata applied to an uploaded activity.
#[derive(Clone, Debug, Default)]
pub struct UploadOptions {
    /// Guessed from the file extension when `None`.
    pub format: Option<UploadFormat>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Lowercase activity type key, e.g. `running` or `cycling`.
    pub activity_type: Option<String>,
    pub private: Option<bool>,
}

impl UploadOptions {
    /// Body of the follow-up metadata update, or `None` when nothing was set.
    pub fn metadata(&self, activity_id: u64) -> Option<serde_json::Value> {
        let mut data = serde_json::Map::new();
        if let Some(name) = &self.name {
            data.insert("activityName".into(), json!(name));
        }
        if let Some(description) = &self.description {
            data.insert("description".into(), json!(description));
        }
        if let Some(activity_type) = &self.activity_type {
            data.insert("activityTypeDTO".into(), json!({ "typeKey": activity_type }));
        }
        if let Some(private) = self.private {
            let key = if private { "private" } else { "public" };
            data.insert("privacy".into(), json!({ "typeKey": key }));
        }
        if data.is_empty() {
            return None;
        }
        data.insert("activityId".into(), json!(activity_id));
        Some(serde_json::Value::Object(data))
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(rename = "detailedImportResult")]
    detailed_import_result: ImportResult,
}

#[derive(Deserialize)]
struct ImportResult {
    #[serde(default)]
    successes: Vec<ImportSuccess>,
    #[serde(default)]
    failures: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct ImportSuccess {
    #[serde(rename = "internalId")]
    internal_id: u64,
}

/// Interpret the upload response and return the single created activity id.
pub(crate) fn parse_import_result(
    format: UploadFormat,
    status: u16,
    body: &str,
) -> Result<u64, GarminError> {
    let response: UploadResponse = serde_json::from_str(body).map_err(|_| {
        GarminError::Upload(format!("failed to upload {format} for activity: {status}\n{body}"))
    })?;
    let result = response.detailed_import_result;
    if !result.failures.is_empty() || result.successes.is_empty() {
        return Err(GarminError::Upload(format!(
            "failed to upload {format} for activity: {status}\n{}",
            serde_json::Value::Array(result.failures)
        )));
    }
    if result.successes.len() > 1 {
        return Err(GarminError::Upload(format!(
            "uploading {format} resulted in multiple activities ({})",
            result.successes.len()
        )));
    }
    Ok(result.successes[0].internal_id)
}
