//! Activity export to a local directory and incremental backup.
//!
//! Files are named `{start}_{id}{suffix}` where `start` is the RFC 3339 UTC
//! start time. Formats the server has no data for are listed in a
//! `.not_found` file so later backups do not ask for them again.

use crate::error::{SyncError, SyncResult};
use chrono::SecondsFormat;
use clap::ValueEnum;
use futures_util::TryStreamExt;
use garmin_connect_client::pagination::list_activities;
use garmin_connect_client::utils::parse_gmt_timestamp;
use garmin_connect_client::{ActivityRef, GarminConnect};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

pub const NOT_FOUND_FILE: &str = ".not_found";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum ExportFormat {
    #[value(name = "json_summary")]
    JsonSummary,
    #[value(name = "json_details")]
    JsonDetails,
    Gpx,
    Tcx,
    Fit,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::JsonSummary,
        ExportFormat::JsonDetails,
        ExportFormat::Gpx,
        ExportFormat::Tcx,
        ExportFormat::Fit,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            ExportFormat::JsonSummary => "_summary.json",
            ExportFormat::JsonDetails => "_details.json",
            ExportFormat::Gpx => ".gpx",
            ExportFormat::Tcx => ".tcx",
            ExportFormat::Fit => ".fit",
        }
    }
}

pub fn export_file_name(activity: &ActivityRef, format: ExportFormat) -> String {
    format!(
        "{}_{}{}",
        activity.start_time.to_rfc3339_opts(SecondsFormat::Secs, false),
        activity.id,
        format.suffix()
    )
}

pub fn export_path(dir: &Path, activity: &ActivityRef, format: ExportFormat) -> PathBuf {
    dir.join(export_file_name(activity, format))
}

/// Outcome of exporting one activity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub written: Vec<PathBuf>,
    pub not_found: Vec<ExportFormat>,
}

/// Outcome of a backup run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackupReport {
    pub listed: usize,
    pub downloaded: usize,
}

/// Write every requested format of `activity` into `dir`.
///
/// Formats without data are appended to the `.not_found` record and skipped.
pub async fn download_activity<C>(
    client: &C,
    activity: &ActivityRef,
    dir: &Path,
    formats: &[ExportFormat],
) -> SyncResult<DownloadReport>
where
    C: GarminConnect + ?Sized,
{
    tokio::fs::create_dir_all(dir).await?;
    let mut report = DownloadReport::default();

    for &format in formats {
        let path = export_path(dir, activity, format);
        debug!("downloading {format:?} for activity {}", activity.id);
        let contents = match format {
            ExportFormat::JsonSummary => client
                .get_activity_summary(activity.id)
                .await?
                .map(|v| serde_json::to_vec_pretty(&v))
                .transpose()?,
            ExportFormat::JsonDetails => client
                .get_activity_details(activity.id)
                .await?
                .map(|v| serde_json::to_vec_pretty(&v))
                .transpose()?,
            ExportFormat::Gpx => client
                .get_activity_gpx(activity.id)
                .await?
                .map(String::into_bytes),
            ExportFormat::Tcx => client
                .get_activity_tcx(activity.id)
                .await?
                .map(String::into_bytes),
            ExportFormat::Fit => client.get_activity_fit(activity.id).await?,
        };

        match contents {
            Some(bytes) => {
                write_file(&path, &bytes).await?;
                report.written.push(path);
            }
            None => {
                info!("no {format:?} available for activity {}", activity.id);
                record_not_found(dir, &export_file_name(activity, format)).await?;
                report.not_found.push(format);
            }
        }
    }

    Ok(report)
}

/// Download every activity of the account that is missing from `dir`.
///
/// A format counts as done when its file exists or it was recorded as not
/// found on an earlier run.
pub async fn backup<C>(
    client: &C,
    dir: &Path,
    formats: &[ExportFormat],
    batch_size: u32,
) -> SyncResult<BackupReport>
where
    C: GarminConnect + ?Sized,
{
    tokio::fs::create_dir_all(dir).await?;
    let not_found = read_not_found(dir).await?;
    let mut report = BackupReport::default();

    let activities = list_activities(client, batch_size);
    futures_util::pin_mut!(activities);
    while let Some(activity) = activities.try_next().await? {
        report.listed += 1;
        let mut missing = Vec::new();
        for &format in formats {
            let name = export_file_name(&activity, format);
            if not_found.contains(&name) || tokio::fs::try_exists(dir.join(&name)).await? {
                continue;
            }
            missing.push(format);
        }
        if missing.is_empty() {
            continue;
        }
        info!(
            "backing up activity {} started {}",
            activity.id, activity.start_time
        );
        download_activity(client, &activity, dir, &missing).await?;
        report.downloaded += 1;
    }

    info!(
        "backup complete: {} activities listed, {} downloaded",
        report.listed, report.downloaded
    );
    Ok(report)
}

/// Build an [`ActivityRef`] from an activity summary document.
pub fn activity_ref_from_summary(
    activity_id: u64,
    summary: &serde_json::Value,
) -> SyncResult<ActivityRef> {
    let raw = summary["summaryDTO"]["startTimeGMT"]
        .as_str()
        .ok_or_else(|| {
            SyncError::Validation(format!("activity {activity_id} summary has no start time"))
        })?;
    let start_time = parse_gmt_timestamp(raw).ok_or_else(|| {
        SyncError::Validation(format!(
            "activity {activity_id} has unparsable start time '{raw}'"
        ))
    })?;
    Ok(ActivityRef {
        id: activity_id,
        start_time,
    })
}

/// Look up an activity by id; an unknown id is a validation error.
pub async fn fetch_activity_ref<C>(client: &C, activity_id: u64) -> SyncResult<ActivityRef>
where
    C: GarminConnect + ?Sized,
{
    let summary = client
        .get_activity_summary(activity_id)
        .await?
        .ok_or_else(|| SyncError::Validation(format!("activity {activity_id} not found")))?;
    activity_ref_from_summary(activity_id, &summary)
}

/// Write through a `.part` sibling; the final name only ever holds a
/// complete file.
async fn write_file(path: &Path, bytes: &[u8]) -> SyncResult<()> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);
    tokio::fs::write(&partial, bytes).await?;
    tokio::fs::rename(&partial, path).await?;
    Ok(())
}

async fn read_not_found(dir: &Path) -> SyncResult<HashSet<String>> {
    match tokio::fs::read_to_string(dir.join(NOT_FOUND_FILE)).await {
        Ok(contents) => Ok(contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashSet::new()),
        Err(e) => Err(e.into()),
    }
}

async fn record_not_found(dir: &Path, file_name: &str) -> SyncResult<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(NOT_FOUND_FILE))
        .await?;
    file.write_all(format!("{file_name}\n").as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
