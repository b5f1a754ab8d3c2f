use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use futures_util::{StreamExt, TryStreamExt};
use garmin_connect_client::http_client::ReqwestGarminClient;
use garmin_connect_client::pagination::DEFAULT_BATCH_SIZE;
use garmin_connect_client::{GarminConnect, UploadFormat, UploadOptions};
use garmin_connect_sync::{Database, ExportFormat, credentials, dates, export, logging, sync};

const DEFAULT_DATABASE_URL: &str = "sqlite:garmin.db";

#[derive(Debug, Parser)]
#[command(name = "garmin-sync", version, about = "Garmin Connect daily import and activity export")]
struct Cli {
    /// DEBUG, INFO, WARNING or ERROR
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Account user name, overrides GARMIN_CONNECT_USERNAME
    #[arg(long, global = true)]
    username: Option<String>,

    /// Account password, overrides GARMIN_CONNECT_PASSWORD; prompted for when unset
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import daily sleep, heart rate, movement and summary data
    Daily {
        /// First date (YYYY-MM-DD), defaults to yesterday
        #[arg(long, value_parser = dates::parse_date)]
        start: Option<NaiveDate>,
        /// Last date (YYYY-MM-DD), defaults to the start date
        #[arg(long, value_parser = dates::parse_date)]
        end: Option<NaiveDate>,
        /// Overrides GARMIN_SYNC_DATABASE_URL
        #[arg(long, value_name = "URL")]
        database: Option<String>,
    },
    /// Download one activity
    Activity {
        id: u64,
        /// Repeatable; all formats when omitted
        #[arg(long = "format", value_enum)]
        formats: Vec<ExportFormat>,
        #[arg(long, default_value = "./activities")]
        destination: PathBuf,
    },
    /// Download every activity not yet present in the destination
    Backup {
        #[arg(long = "format", value_enum)]
        formats: Vec<ExportFormat>,
        #[arg(long, default_value = "./activities")]
        destination: PathBuf,
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: u32,
    },
    /// Upload a GPX, TCX or FIT file
    Upload {
        file: PathBuf,
        /// Inferred from the file extension when omitted
        #[arg(long)]
        format: Option<UploadFormat>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Activity type key, e.g. running
        #[arg(long)]
        activity_type: Option<String>,
        #[arg(long)]
        private: bool,
    },
    /// Print activity ids and start times, most recent first
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_env = match logging::resolve_filter(cli.log_level.as_deref(), |k| std::env::var(k).ok())
    {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("garmin-sync: {e}");
            return ExitCode::FAILURE;
        }
    };
    let env_filter = match tracing_subscriber::EnvFilter::try_new(&log_env) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("garmin-sync: invalid log filter '{log_env}': {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::debug!("garmin-sync: log filter: {}", log_env);

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("garmin-sync: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    preflight(&cli.command)?;

    let config = credentials::resolve_config(
        cli.username,
        cli.password,
        |k| std::env::var(k).ok(),
        |msg: &str| rpassword::prompt_password(msg),
    )?;
    let mut client = ReqwestGarminClient::from_config(&config);
    client
        .connect(&config.username, &config.password)
        .await
        .context("could not log in to Garmin Connect")?;

    let result = run(&client, cli.command).await;
    client.disconnect();
    result
}

/// Checks that need no session, run before logging in.
fn preflight(command: &Command) -> anyhow::Result<()> {
    if let Command::Upload {
        file, format: None, ..
    } = command
    {
        UploadFormat::from_path(file)
            .with_context(|| format!("cannot upload {}", file.display()))?;
    }
    Ok(())
}

async fn run(client: &ReqwestGarminClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Daily {
            start,
            end,
            database,
        } => {
            let start = start.unwrap_or_else(dates::yesterday);
            let end = end.unwrap_or(start);
            let url = database
                .or_else(|| std::env::var("GARMIN_SYNC_DATABASE_URL").ok())
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
            let db = Database::new(&url)
                .await
                .with_context(|| format!("could not open database {url}"))?;
            let reports = sync::pull_range(client, &db, start, end).await?;
            tracing::info!("imported {} day(s) into {}", reports.len(), url);
        }
        Command::Activity {
            id,
            formats,
            destination,
        } => {
            let activity = export::fetch_activity_ref(client, id).await?;
            let report =
                export::download_activity(client, &activity, &destination, selected(&formats))
                    .await?;
            for path in &report.written {
                println!("{}", path.display());
            }
        }
        Command::Backup {
            formats,
            destination,
            batch_size,
        } => {
            let report = export::backup(client, &destination, selected(&formats), batch_size).await?;
            println!(
                "{} activities listed, {} downloaded",
                report.listed, report.downloaded
            );
        }
        Command::Upload {
            file,
            format,
            name,
            description,
            activity_type,
            private,
        } => {
            let options = UploadOptions {
                format,
                name,
                description,
                activity_type,
                private: private.then_some(true),
            };
            let id = client
                .upload_activity(&file, &options)
                .await
                .with_context(|| format!("upload of {} failed", file.display()))?;
            println!("{id}");
        }
        Command::List { limit } => {
            let activities = client.list_activities().take(limit.unwrap_or(usize::MAX));
            futures_util::pin_mut!(activities);
            while let Some(activity) = activities.try_next().await? {
                println!("{}\t{}", activity.id, activity.start_time.to_rfc3339());
            }
        }
    }
    Ok(())
}

fn selected(formats: &[ExportFormat]) -> &[ExportFormat] {
    if formats.is_empty() {
        &ExportFormat::ALL
    } else {
        formats
    }
}
