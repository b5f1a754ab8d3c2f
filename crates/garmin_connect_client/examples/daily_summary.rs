use garmin_connect_client::{GarminConnect, config::Config, http_client::ReqwestGarminClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: expects GARMIN_CONNECT_USERNAME and GARMIN_CONNECT_PASSWORD in env
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let mut client = ReqwestGarminClient::from_config(&cfg);
    client.connect(&cfg.username, &cfg.password).await?;

    let yesterday = chrono::Local::now().date_naive() - chrono::Duration::days(1);
    match client.get_user_summary(yesterday).await? {
        Some(summary) => println!(
            "{}: {} steps",
            yesterday,
            summary.get("totalSteps").cloned().unwrap_or_default()
        ),
        None => println!("{}: no summary recorded", yesterday),
    }

    client.disconnect();
    Ok(())
}
