pub mod config;
pub mod fetch;
pub mod run;
pub mod stats;
pub mod status;

use hangtube_core::{Config, Database, QuizScheduler};

pub(crate) const SCHEDULER_KEY: &str = "quiz_scheduler";

pub(crate) fn load_scheduler(db: &Database, config: &Config) -> QuizScheduler {
    if let Ok(Some(json)) = db.kv_get(SCHEDULER_KEY) {
        if let Ok(scheduler) = serde_json::from_str::<QuizScheduler>(&json) {
            return scheduler;
        }
    }
    QuizScheduler::new(config.scheduler.clone())
}

pub(crate) fn save_scheduler(
    db: &Database,
    scheduler: &QuizScheduler,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(scheduler)?;
    db.kv_set(SCHEDULER_KEY, &json)?;
    Ok(())
}
