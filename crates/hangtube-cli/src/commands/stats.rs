use hangtube_core::Database;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let stats = db.stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("answered: {}", stats.answered);
    println!("correct:  {}", stats.correct);
    println!("accuracy: {:.0}%", stats.accuracy() * 100.0);

    let recent = db.recent_answers(5)?;
    if !recent.is_empty() {
        println!();
        println!("recent:");
        for record in recent {
            let mark = if record.correct { "+" } else { "-" };
            println!("  [{mark}] {} ({})", record.title, record.answered_at);
        }
    }
    Ok(())
}
