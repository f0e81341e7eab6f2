use anyhow::{Context, Result};

use daily_shuffle::config::Config;
use daily_shuffle::http::ShuffleQueryHandler;
use daily_shuffle::scheduler::ScheduledPublisher;
use daily_shuffle::storage::create_store;

/// Publish one shuffle and exit; for use from an external scheduler
pub async fn publish(config: Config) -> Result<()> {
    config.validate()?;

    let store = create_store(&config.store).context("Failed to open shuffle store")?;
    let publisher = ScheduledPublisher::new(store, config.schedule.timezone);

    let record = publisher.publish().await.context("Publish failed")?;

    println!("Published daily shuffle");
    println!("  Entry number: {}", record.entry_number());
    println!("  Document key: {}", record.document_key);
    println!("  Timestamp: {}", record.document.timestamp);
    Ok(())
}

/// Print the response body the read endpoint would return
pub async fn latest(config: Config) -> Result<()> {
    config.validate()?;

    let store = create_store(&config.store).context("Failed to open shuffle store")?;
    let document = ShuffleQueryHandler::new(store)
        .handle()
        .await
        .context("Failed to read latest shuffle")?;

    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
