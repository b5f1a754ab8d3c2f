//! Pulls daily wellness payloads from the client into the store.

use crate::database::Database;
use crate::error::{SyncError, SyncResult};
use crate::types::{HeartRateData, MovementData, SleepData, UserSummary};
use chrono::NaiveDate;
use garmin_connect_client::GarminConnect;
use serde::Serialize;
use tracing::info;

/// Which payloads were stored for a date.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub sleep: bool,
    pub heart_rate: bool,
    pub movement: bool,
    pub summary: bool,
}

/// Fetch and store sleep, heart rate, movement and summary for `date`.
///
/// Absent payloads are skipped. A sleep document without a total sleep time
/// counts as absent.
pub async fn pull_daily<C>(client: &C, db: &Database, date: NaiveDate) -> SyncResult<DailyReport>
where
    C: GarminConnect + ?Sized,
{
    let mut report = DailyReport {
        date,
        ..Default::default()
    };

    match client.get_daily_sleep_data(date).await? {
        Some(raw) => {
            let sleep: SleepData = serde_json::from_value(raw)?;
            if sleep.daily_sleep.sleep_time_seconds.is_some() {
                db.insert_sleep_data(&sleep).await?;
                report.sleep = true;
            } else {
                info!("no sleep recorded for {date}");
            }
        }
        None => info!("no sleep data for {date}"),
    }

    match client.get_daily_hr_data(date).await? {
        Some(raw) => {
            let hr: HeartRateData = serde_json::from_value(raw)?;
            db.insert_hr_data(&hr).await?;
            report.heart_rate = true;
        }
        None => info!("no heart rate data for {date}"),
    }

    match client.get_daily_movement(date).await? {
        Some(raw) => {
            let movement: MovementData = serde_json::from_value(raw)?;
            db.insert_movement_data(&movement).await?;
            report.movement = true;
        }
        None => info!("no movement data for {date}"),
    }

    match client.get_user_summary(date).await? {
        Some(raw) => {
            let summary: UserSummary = serde_json::from_value(raw)?;
            db.insert_user_summary(&summary).await?;
            report.summary = true;
        }
        None => info!("no user summary for {date}"),
    }

    Ok(report)
}

/// Run [`pull_daily`] for every date from `start` through `end`, in order.
pub async fn pull_range<C>(
    client: &C,
    db: &Database,
    start: NaiveDate,
    end: NaiveDate,
) -> SyncResult<Vec<DailyReport>>
where
    C: GarminConnect + ?Sized,
{
    if start > end {
        return Err(SyncError::Validation(format!(
            "start date {start} is after end date {end}"
        )));
    }
    let mut reports = Vec::new();
    for date in crate::dates::days(start, end) {
        info!("importing daily data for {date}");
        reports.push(pull_daily(client, db, date).await?);
    }
    Ok(reports)
}
