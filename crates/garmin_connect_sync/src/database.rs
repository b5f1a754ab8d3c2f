//! # Daily statistics store
//!
//! SQLite persistence for the daily payloads. Each calendar date owns one
//! `daily_statistics` row; sleep sessions and sample series hang off it.
//! Importing a date again replaces its child rows instead of appending.

use crate::error::SyncResult;
use crate::types::{HeartRateData, MovementData, SleepData, UserSummary};
use chrono::{DateTime, NaiveDate, Utc};
use garmin_connect_client::utils::{from_epoch_millis, parse_gmt_timestamp};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use std::str::FromStr;
use tracing::debug;

/// Aggregates stored per calendar date.
#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct DailyStatistic {
    pub id: i64,
    pub entry_date: NaiveDate,
    pub total_sleep: Option<i64>,
    pub max_hr: Option<i64>,
    pub min_hr: Option<i64>,
    pub resting_hr: Option<i64>,
    pub total_steps: Option<i64>,
    pub highly_active_seconds: Option<i64>,
    pub active_seconds: Option<i64>,
    pub sedentary_seconds: Option<i64>,
    pub sleeping_seconds: Option<i64>,
    pub max_stress_level: Option<i64>,
    pub low_stress_duration: Option<i64>,
    pub medium_stress_duration: Option<i64>,
    pub high_stress_duration: Option<i64>,
}

/// Database handle for the daily statistics store
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database at `database_url` and migrate it.
    ///
    /// A single connection is used; this also keeps `sqlite::memory:`
    /// databases alive for the lifetime of the handle.
    pub async fn new(database_url: &str) -> SyncResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations
    pub async fn migrate(&self) -> SyncResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS daily_statistics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                entry_date TEXT NOT NULL UNIQUE,
                total_sleep INTEGER,
                max_hr INTEGER,
                min_hr INTEGER,
                resting_hr INTEGER,
                total_steps INTEGER,
                highly_active_seconds INTEGER,
                active_seconds INTEGER,
                sedentary_seconds INTEGER,
                sleeping_seconds INTEGER,
                max_stress_level INTEGER,
                low_stress_duration INTEGER,
                medium_stress_duration INTEGER,
                high_stress_duration INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sleep (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                daily_statistics_id INTEGER NOT NULL,
                sleep_start TEXT,
                sleep_end TEXT,
                deep_sleep INTEGER,
                light_sleep INTEGER,
                rem_sleep INTEGER,
                awake_sleep INTEGER,
                FOREIGN KEY (daily_statistics_id) REFERENCES daily_statistics (id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sleep_movement (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sleep_id INTEGER NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                activity_level REAL NOT NULL,
                FOREIGN KEY (sleep_id) REFERENCES sleep (id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS hr_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                daily_statistics_id INTEGER NOT NULL,
                event_time TEXT NOT NULL,
                hr_value INTEGER,
                FOREIGN KEY (daily_statistics_id) REFERENCES daily_statistics (id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS movement_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                daily_statistics_id INTEGER NOT NULL,
                event_time TEXT NOT NULL,
                movement REAL,
                FOREIGN KEY (daily_statistics_id) REFERENCES daily_statistics (id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_hr_data_daily ON hr_data(daily_statistics_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_movement_data_daily ON movement_data(daily_statistics_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Id of the row for `date`, inserting an empty row first if needed.
    pub async fn get_or_create_daily_statistic(&self, date: NaiveDate) -> SyncResult<i64> {
        let mut conn = self.pool.acquire().await?;
        daily_statistic_id(&mut conn, date).await
    }

    pub async fn daily_statistic(&self, date: NaiveDate) -> SyncResult<Option<DailyStatistic>> {
        let row = sqlx::query_as::<_, DailyStatistic>(
            "SELECT * FROM daily_statistics WHERE entry_date = ?",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Number of rows in one of the store's tables.
    pub async fn count_rows(&self, table: &str) -> SyncResult<i64> {
        const TABLES: &[&str] = &[
            "daily_statistics",
            "sleep",
            "sleep_movement",
            "hr_data",
            "movement_data",
        ];
        if !TABLES.contains(&table) {
            return Err(crate::error::SyncError::Validation(format!(
                "unknown table '{table}'"
            )));
        }
        let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn insert_sleep_data(&self, sleep_data: &SleepData) -> SyncResult<()> {
        let daily = &sleep_data.daily_sleep;
        let mut tx = self.pool.begin().await?;
        let daily_id = daily_statistic_id(&mut tx, daily.calendar_date).await?;

        sqlx::query("UPDATE daily_statistics SET total_sleep = ? WHERE id = ?")
            .bind(daily.sleep_time_seconds)
            .bind(daily_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM sleep WHERE daily_statistics_id = ?")
            .bind(daily_id)
            .execute(&mut *tx)
            .await?;

        let sleep_start = daily.sleep_start_timestamp_gmt.and_then(from_epoch_millis);
        let sleep_end = daily.sleep_end_timestamp_gmt.and_then(from_epoch_millis);
        let sleep_id = sqlx::query(
            r#"
            INSERT INTO sleep (
                daily_statistics_id, sleep_start, sleep_end,
                deep_sleep, light_sleep, rem_sleep, awake_sleep
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(daily_id)
        .bind(sleep_start)
        .bind(sleep_end)
        .bind(daily.deep_sleep_seconds)
        .bind(daily.light_sleep_seconds)
        .bind(daily.rem_sleep_seconds)
        .bind(daily.awake_sleep_seconds)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for movement in sleep_data.sleep_movement.iter().flatten() {
            let (Some(start), Some(end)) = (
                parse_gmt_timestamp(&movement.start_gmt),
                parse_gmt_timestamp(&movement.end_gmt),
            ) else {
                debug!(
                    "skipping sleep movement with unparsable bounds {} - {}",
                    movement.start_gmt, movement.end_gmt
                );
                continue;
            };
            sqlx::query(
                "INSERT INTO sleep_movement (sleep_id, start_time, end_time, activity_level) VALUES (?, ?, ?, ?)",
            )
            .bind(sleep_id)
            .bind(start)
            .bind(end)
            .bind(movement.activity_level)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn insert_hr_data(&self, hr_data: &HeartRateData) -> SyncResult<()> {
        let mut tx = self.pool.begin().await?;
        let daily_id = daily_statistic_id(&mut tx, hr_data.calendar_date).await?;

        sqlx::query(
            "UPDATE daily_statistics SET max_hr = ?, min_hr = ?, resting_hr = ? WHERE id = ?",
        )
        .bind(hr_data.max_heart_rate)
        .bind(hr_data.min_heart_rate)
        .bind(hr_data.resting_heart_rate)
        .bind(daily_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM hr_data WHERE daily_statistics_id = ?")
            .bind(daily_id)
            .execute(&mut *tx)
            .await?;
        for (millis, value) in hr_data.heart_rate_values.iter().flatten() {
            let Some(event_time) = from_epoch_millis(*millis) else {
                continue;
            };
            sqlx::query(
                "INSERT INTO hr_data (daily_statistics_id, event_time, hr_value) VALUES (?, ?, ?)",
            )
            .bind(daily_id)
            .bind(event_time)
            .bind(*value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn insert_movement_data(&self, movement_data: &MovementData) -> SyncResult<()> {
        let mut tx = self.pool.begin().await?;
        let daily_id = daily_statistic_id(&mut tx, movement_data.calendar_date).await?;

        sqlx::query("DELETE FROM movement_data WHERE daily_statistics_id = ?")
            .bind(daily_id)
            .execute(&mut *tx)
            .await?;
        for (millis, movement) in movement_data.movement_values.iter().flatten() {
            let Some(event_time) = from_epoch_millis(*millis) else {
                continue;
            };
            sqlx::query(
                "INSERT INTO movement_data (daily_statistics_id, event_time, movement) VALUES (?, ?, ?)",
            )
            .bind(daily_id)
            .bind(event_time)
            .bind(*movement)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn insert_user_summary(&self, summary: &UserSummary) -> SyncResult<()> {
        let mut tx = self.pool.begin().await?;
        let daily_id = daily_statistic_id(&mut tx, summary.calendar_date).await?;

        sqlx::query(
            r#"
            UPDATE daily_statistics SET
                total_steps = ?, highly_active_seconds = ?, active_seconds = ?,
                sedentary_seconds = ?, sleeping_seconds = ?, max_stress_level = ?,
                low_stress_duration = ?, medium_stress_duration = ?, high_stress_duration = ?
            WHERE id = ?
            "#,
        )
        .bind(summary.total_steps)
        .bind(summary.highly_active_seconds)
        .bind(summary.active_seconds)
        .bind(summary.sedentary_seconds)
        .bind(summary.sleeping_seconds)
        .bind(summary.max_stress_level)
        .bind(summary.low_stress_duration)
        .bind(summary.medium_stress_duration)
        .bind(summary.high_stress_duration)
        .bind(daily_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Heart rate samples stored for `date`, oldest first.
    pub async fn hr_samples(&self, date: NaiveDate) -> SyncResult<Vec<(DateTime<Utc>, Option<i64>)>> {
        let rows = sqlx::query_as::<_, (DateTime<Utc>, Option<i64>)>(
            r#"
            SELECT h.event_time, h.hr_value FROM hr_data h
            JOIN daily_statistics d ON d.id = h.daily_statistics_id
            WHERE d.entry_date = ?
            ORDER BY h.event_time
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

async fn daily_statistic_id(conn: &mut SqliteConnection, date: NaiveDate) -> SyncResult<i64> {
    sqlx::query("INSERT INTO daily_statistics (entry_date) VALUES (?) ON CONFLICT(entry_date) DO NOTHING")
        .bind(date)
        .execute(&mut *conn)
        .await?;
    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM daily_statistics WHERE entry_date = ?")
        .bind(date)
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}
