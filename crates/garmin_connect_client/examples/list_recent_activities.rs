use futures_util::TryStreamExt;
use garmin_connect_client::{config::Config, http_client::ReqwestGarminClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::from_env()?;
    let limit = std::env::var("GARMIN_CONNECT_LIMIT")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(5);

    let mut client = ReqwestGarminClient::from_config(&cfg).with_batch_size(limit.max(1) as u32);
    client.connect(&cfg.username, &cfg.password).await?;

    println!("Recent activities (limit {}):", limit);
    {
        let mut activities = std::pin::pin!(client.list_activities());
        let mut shown = 0;
        while shown < limit {
            let Some(activity) = activities.try_next().await? else {
                break;
            };
            println!("- {} started {}", activity.id, activity.start_time);
            shown += 1;
        }
        if shown == 0 {
            println!("No activities returned (check credentials)");
        }
    }

    client.disconnect();
    Ok(())
}
