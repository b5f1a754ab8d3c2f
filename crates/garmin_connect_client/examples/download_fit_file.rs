use garmin_connect_client::{GarminConnect, config::Config, http_client::ReqwestGarminClient};
use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::from_env()?;

    let activity_id = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("GARMIN_CONNECT_ACTIVITY_ID").ok())
        .and_then(|v| v.parse::<u64>().ok());

    let Some(activity_id) = activity_id else {
        eprintln!(
            "usage: cargo run -p garmin_connect_client --example download_fit_file -- <activity_id>"
        );
        eprintln!("or set GARMIN_CONNECT_ACTIVITY_ID");
        return Ok(());
    };

    let output_path = std::env::var("GARMIN_CONNECT_OUTPUT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(format!("{activity_id}.fit")));

    let mut client = ReqwestGarminClient::from_config(&cfg);
    client.connect(&cfg.username, &cfg.password).await?;
    let fit = client.get_activity_fit(activity_id).await;
    client.disconnect();

    match fit.map_err(|e| format!("download failed: {}", e))? {
        Some(bytes) => {
            tokio::fs::write(&output_path, bytes).await?;
            println!("Saved activity {activity_id} to {}", output_path.display());
        }
        None => println!("Activity {activity_id} has no FIT source"),
    }
    Ok(())
}
