use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quiz::{QuizItem, SchedulerPhase};

/// Every scheduler state change produces an Event.
/// The hosting loop reacts to them; the CLI prints them as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A question batch passed through ingest.
    BatchIngested {
        queued: usize,
        duplicates: usize,
        malformed: usize,
        at: DateTime<Utc>,
    },
    /// The queue head was handed to the presentation layer.
    QuizDispatched {
        item: QuizItem,
        queue_len: usize,
        at: DateTime<Utc>,
    },
    /// The user picked a choice for the showing quiz.
    QuizAnswered {
        item_id: String,
        selected: usize,
        correct: bool,
        wrong_streak: u32,
        /// Punishment tags that actually fired, in trigger order.
        punishments: Vec<String>,
        at: DateTime<Utc>,
    },
    /// The showing quiz went away (answered, timed out, or closed).
    QuizDismissed {
        item_id: String,
        answered: bool,
        requeued: bool,
        cooldown_ms: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: SchedulerPhase,
        queue_len: usize,
        wrong_streak: u32,
        cooldown_remaining_ms: u64,
        current_item_id: Option<String>,
        at: DateTime<Utc>,
    },
}
