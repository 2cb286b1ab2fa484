//! One-shot question batch fetch.

use std::time::Duration;

use hangtube_core::{Config, Database, HttpQuizSource, QuizSource};

pub fn run(video_id: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let video_id = video_id
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| config.source.video_id.clone());
    if video_id.is_empty() {
        return Err("no video id given (pass --video-id or set source.video_id)".into());
    }

    let source = HttpQuizSource::new(
        &config.source.endpoint,
        Duration::from_secs(config.source.timeout_secs),
    )?;
    let runtime = tokio::runtime::Runtime::new()?;
    let batch = runtime.block_on(source.fetch_batch(&video_id))?;

    println!("{}", serde_json::to_string_pretty(&batch)?);

    // Keep the latest batch around so other commands can inspect it.
    let db = Database::open()?;
    db.kv_set("last_batch", &serde_json::to_string(&batch)?)?;
    db.kv_set("last_batch_at", &chrono::Utc::now().to_rfc3339())?;

    tracing::info!(count = batch.len(), %video_id, "fetched and saved batch");
    Ok(())
}
