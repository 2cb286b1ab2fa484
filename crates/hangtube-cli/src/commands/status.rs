//! Print the persisted scheduler state.

use hangtube_core::{Config, Database};

use super::load_scheduler;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let scheduler = load_scheduler(&db, &config);

    let snapshot = scheduler.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
