//! Daily wellness import and activity export on top of
//! [`garmin_connect_client`].
//!
//! [`sync`] pulls the daily payloads into a SQLite store ([`database`]);
//! [`export`] writes activities to disk and keeps an incremental backup.

pub mod credentials;
pub mod dates;
pub mod database;
pub mod error;
pub mod export;
pub mod logging;
pub mod sync;
pub mod types;

mod test_utils;

pub use database::Database;
pub use error::{SyncError, SyncResult};
pub use export::ExportFormat;
