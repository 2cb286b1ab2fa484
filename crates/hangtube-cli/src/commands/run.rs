//! The poll-and-present loop.
//!
//! Single-threaded and cooperative: one loop polls the question server on
//! its interval, ticks the scheduler, presents dispatched quizzes, and
//! routes outcomes back in. Presentation blocks the loop -- a human answer
//! is the one external event the session waits for.

use std::time::{Duration, Instant};

use hangtube_core::quiz::{BLUR_TITLE_TAG, SEVERE_TAG, SHRINK_VIDEO_TAG, TINT_SCREEN_TAG};
use hangtube_core::{
    AnswerRecord, Config, Database, Event, HttpQuizSource, Presenter, PresenterOutcome,
    QuizScheduler, QuizSource,
};

use super::{load_scheduler, save_scheduler};
use crate::presenter::TerminalPresenter;

const TICK_INTERVAL: Duration = Duration::from_millis(250);

pub fn run(video_id: Option<String>, once: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let video_id = video_id
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| config.source.video_id.clone());
    if video_id.is_empty() {
        return Err("no video id given (pass --video-id or set source.video_id)".into());
    }

    let db = Database::open()?;
    let mut scheduler = load_scheduler(&db, &config);
    register_effects(&mut scheduler);

    let source = HttpQuizSource::new(
        &config.source.endpoint,
        Duration::from_secs(config.source.timeout_secs),
    )?;
    let mut presenter = TerminalPresenter::new(Duration::from_secs(config.presenter.display_secs));
    let session_id = uuid::Uuid::new_v4().to_string();
    let runtime = tokio::runtime::Runtime::new()?;

    tracing::info!(%video_id, endpoint = %config.source.endpoint, "starting quiz session");

    let poll_interval = Duration::from_secs(config.source.poll_interval_secs.max(1));
    let mut next_poll = Instant::now();
    let mut polled = false;

    loop {
        if Instant::now() >= next_poll {
            match runtime.block_on(source.fetch_batch(&video_id)) {
                Ok(batch) => {
                    let report = scheduler.ingest_raw(batch);
                    if report.queued > 0 || report.malformed > 0 {
                        tracing::info!(
                            queued = report.queued,
                            duplicates = report.duplicates,
                            malformed = report.malformed,
                            "ingested question batch"
                        );
                    }
                }
                Err(err) => tracing::warn!(%err, "question fetch failed, retrying next poll"),
            }
            polled = true;
            next_poll = Instant::now() + poll_interval;
        }

        if let Some(Event::QuizDispatched { item, .. }) = scheduler.tick() {
            let outcome = presenter.present(&item);
            match outcome {
                PresenterOutcome::Answered(selected) => {
                    if let Some(Event::QuizAnswered {
                        correct,
                        wrong_streak,
                        ..
                    }) = scheduler.on_answered(&item.id, selected)
                    {
                        if correct {
                            println!("correct!");
                        } else {
                            println!(
                                "wrong - the answer was: {}",
                                item.choices[item.correct_choice]
                            );
                        }
                        db.record_answer(&AnswerRecord {
                            item_id: item.id.clone(),
                            title: item.title.clone(),
                            selected,
                            correct,
                            wrong_streak,
                            session_id: session_id.clone(),
                            answered_at: chrono::Utc::now(),
                        })?;
                    }
                    scheduler.on_dismissed(&item.id);
                }
                PresenterOutcome::Dismissed => {
                    scheduler.on_dismissed(&item.id);
                }
            }
            save_scheduler(&db, &scheduler)?;
        }

        if once
            && polled
            && !scheduler.is_showing()
            && scheduler.queue_len() == 0
            && scheduler.cooldown_remaining_ms() == 0
        {
            save_scheduler(&db, &scheduler)?;
            tracing::info!("batch drained, exiting");
            return Ok(());
        }

        std::thread::sleep(TICK_INTERVAL);
    }
}

/// Terminal stand-ins for the overlay effects, registered under the same
/// tags the question server uses.
fn register_effects(scheduler: &mut QuizScheduler) {
    scheduler.register_punishment(
        SEVERE_TAG,
        Box::new(|| {
            println!("\x1b[41;97m !! WRONG AGAIN - PENALTY ESCALATED !! \x1b[0m");
        }),
    );
    scheduler.register_punishment(
        SHRINK_VIDEO_TAG,
        Box::new(|| println!("(the video just got smaller)")),
    );
    scheduler.register_punishment(
        TINT_SCREEN_TAG,
        Box::new(|| println!("\x1b[31m(the screen takes on a red tint)\x1b[0m")),
    );
    scheduler.register_punishment(
        BLUR_TITLE_TAG,
        Box::new(|| println!("(the video title is now unreadable)")),
    );
}
