//! Quiz scheduler implementation.
//!
//! The scheduler is a wall-clock-based state machine. It does not use
//! internal threads or timers - the caller is responsible for calling
//! `tick()` periodically and for routing presentation outcomes back in
//! through `on_answered`/`on_dismissed`.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Showing -> Cooldown -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut scheduler = QuizScheduler::new(SchedulerConfig::default());
//! scheduler.ingest_raw(batch);
//! // In a loop:
//! scheduler.tick(); // Returns Some(Event::QuizDispatched) when an item is due
//! ```

use std::collections::{HashSet, VecDeque};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::item::{QuizItem, RawQuestion};
use super::punishment::{PunishmentEffect, PunishmentRegistry, SEVERE_TAG};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerPhase {
    /// Nothing showing, no cooldown pending.
    Idle,
    /// One item dispatched, awaiting its outcome.
    Showing,
    /// Between dismissal and the next advance attempt.
    Cooldown,
}

/// Pacing and escalation knobs.
///
/// The source material disagrees on these values across revisions, so they
/// are configuration with the most commonly observed defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Delay between dismissing one quiz and attempting the next.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Wrong streak at which the severe punishment joins the item's own.
    #[serde(default = "default_severe_streak_threshold")]
    pub severe_streak_threshold: u32,
    /// Re-queue an item dismissed without an answer instead of dropping it.
    #[serde(default)]
    pub requeue_on_dismiss: bool,
}

fn default_cooldown_secs() -> u64 {
    5
}
fn default_severe_streak_threshold() -> u32 {
    2
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
            severe_streak_threshold: default_severe_streak_threshold(),
            requeue_on_dismiss: false,
        }
    }
}

/// Outcome counts for one ingest call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub queued: usize,
    pub duplicates: usize,
    pub malformed: usize,
}

impl IngestReport {
    pub fn into_event(self) -> Event {
        Event::BatchIngested {
            queued: self.queued,
            duplicates: self.duplicates,
            malformed: self.malformed,
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ShowingItem {
    item: QuizItem,
    /// Set once `on_answered` accepted an answer for this item.
    answered: bool,
}

/// Core quiz scheduler.
///
/// Owns the pending queue, the showing slot, the cooldown timestamp, and
/// the cross-quiz wrong-answer counter. No other component mutates these.
///
/// Serializable (minus the effect registry) so a host can persist it
/// between invocations.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuizScheduler {
    config: SchedulerConfig,
    queue: VecDeque<QuizItem>,
    #[serde(default)]
    showing: Option<ShowingItem>,
    /// Epoch-ms timestamp when the current cooldown started.
    #[serde(default)]
    cooldown_started_ms: Option<u64>,
    #[serde(default)]
    wrong_streak: u32,
    /// Ids of every item ever queued. Repeated polls return the same batch;
    /// a dispatched item must not come back.
    #[serde(default)]
    seen_ids: HashSet<String>,
    #[serde(skip)]
    punishments: PunishmentRegistry,
}

impl QuizScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
            showing: None,
            cooldown_started_ms: None,
            wrong_streak: 0,
            seen_ids: HashSet::new(),
            punishments: PunishmentRegistry::new(),
        }
    }

    /// Register a punishment effect under `tag`.
    ///
    /// The registry is not serialized; re-register after deserializing.
    pub fn register_punishment(&mut self, tag: impl Into<String>, effect: Box<dyn PunishmentEffect>) {
        self.punishments.register(tag, effect);
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> SchedulerPhase {
        if self.showing.is_some() {
            SchedulerPhase::Showing
        } else if self.cooldown_started_ms.is_some() {
            SchedulerPhase::Cooldown
        } else {
            SchedulerPhase::Idle
        }
    }

    pub fn is_showing(&self) -> bool {
        self.showing.is_some()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn queued(&self) -> impl Iterator<Item = &QuizItem> {
        self.queue.iter()
    }

    pub fn wrong_streak(&self) -> u32 {
        self.wrong_streak
    }

    pub fn current_item(&self) -> Option<&QuizItem> {
        self.showing.as_ref().map(|s| &s.item)
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Milliseconds until the pending cooldown elapses (0 when none).
    pub fn cooldown_remaining_ms(&self) -> u64 {
        match self.cooldown_started_ms {
            Some(started) => {
                let elapsed = now_ms().saturating_sub(started);
                self.cooldown_ms().saturating_sub(elapsed)
            }
            None => 0,
        }
    }

    fn cooldown_ms(&self) -> u64 {
        self.config.cooldown_secs.saturating_mul(1000)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase(),
            queue_len: self.queue.len(),
            wrong_streak: self.wrong_streak,
            cooldown_remaining_ms: self.cooldown_remaining_ms(),
            current_item_id: self.current_item().map(|item| item.id.clone()),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Append items whose id has not been seen, preserving arrival order.
    /// Empty input is a no-op.
    pub fn ingest(&mut self, items: Vec<QuizItem>) -> IngestReport {
        let mut report = IngestReport::default();
        for item in items {
            if self.seen_ids.contains(&item.id) {
                tracing::debug!(item_id = %item.id, "skipping already-seen quiz item");
                report.duplicates += 1;
                continue;
            }
            self.seen_ids.insert(item.id.clone());
            self.queue.push_back(item);
            report.queued += 1;
        }
        report
    }

    /// Transform raw records and ingest the valid ones. Malformed records
    /// are dropped here with a diagnostic; they never reach the queue.
    pub fn ingest_raw(&mut self, records: Vec<RawQuestion>) -> IngestReport {
        let mut malformed = 0;
        let mut items = Vec::with_capacity(records.len());
        for record in records {
            match record.into_item() {
                Ok(item) => items.push(item),
                Err(err) => {
                    tracing::warn!(%err, "dropping malformed question record");
                    malformed += 1;
                }
            }
        }
        let mut report = self.ingest(items);
        report.malformed = malformed;
        report
    }

    /// Dispatch the queue head if nothing is showing and no cooldown is
    /// pending. Idempotent: redundant calls from timer and ingest paths
    /// are no-ops.
    pub fn try_advance(&mut self) -> Option<Event> {
        if self.showing.is_some() || self.cooldown_started_ms.is_some() {
            return None;
        }
        let item = self.queue.pop_front()?;
        self.showing = Some(ShowingItem {
            item: item.clone(),
            answered: false,
        });
        Some(Event::QuizDispatched {
            item,
            queue_len: self.queue.len(),
            at: Utc::now(),
        })
    }

    /// Record the single answer for the showing item.
    ///
    /// Calls that do not match the showing, not-yet-answered item are
    /// stale (late callback after a re-render) and are ignored to protect
    /// the state machine.
    pub fn on_answered(&mut self, item_id: &str, selected: usize) -> Option<Event> {
        let showing = self.showing.as_mut()?;
        if showing.item.id != item_id || showing.answered {
            tracing::debug!(item_id, "ignoring answer for item that is not showing");
            return None;
        }
        showing.answered = true;

        let correct = showing.item.is_correct(selected);
        let mut applied = Vec::new();
        if correct {
            self.wrong_streak = 0;
        } else {
            self.wrong_streak += 1;
            if self.wrong_streak >= self.config.severe_streak_threshold
                && self.punishments.apply(SEVERE_TAG)
            {
                applied.push(SEVERE_TAG.to_string());
            }
            if let Some(tag) = showing.item.punishment_tag.as_deref() {
                if self.punishments.apply(tag) {
                    applied.push(tag.to_string());
                }
            }
        }

        Some(Event::QuizAnswered {
            item_id: showing.item.id.clone(),
            selected,
            correct,
            wrong_streak: self.wrong_streak,
            punishments: applied,
            at: Utc::now(),
        })
    }

    /// End the presentation of the showing item and start the cooldown.
    /// Ids that are not the showing item are ignored.
    pub fn on_dismissed(&mut self, item_id: &str) -> Option<Event> {
        match &self.showing {
            Some(showing) if showing.item.id == item_id => {}
            _ => {
                tracing::debug!(item_id, "ignoring dismissal for item that is not showing");
                return None;
            }
        }
        let ShowingItem { item, answered } = self.showing.take()?;

        let mut requeued = false;
        if !answered && self.config.requeue_on_dismiss {
            self.queue.push_back(item.clone());
            requeued = true;
        }
        self.cooldown_started_ms = Some(now_ms());

        Some(Event::QuizDismissed {
            item_id: item.id,
            answered,
            requeued,
            cooldown_ms: self.cooldown_ms(),
            at: Utc::now(),
        })
    }

    /// Call periodically. Clears an elapsed cooldown and immediately
    /// attempts to dispatch the next queued item.
    pub fn tick(&mut self) -> Option<Event> {
        if let Some(started) = self.cooldown_started_ms {
            let elapsed = now_ms().saturating_sub(started);
            if elapsed >= self.cooldown_ms() {
                self.cooldown_started_ms = None;
            }
        }
        self.try_advance()
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn item(id: &str) -> QuizItem {
        QuizItem {
            id: id.to_string(),
            title: id.to_string(),
            prompt: format!("prompt {id}"),
            choices: vec!["x".into(), "y".into(), "z".into()],
            correct_choice: 0,
            punishment_tag: None,
        }
    }

    fn tagged_item(id: &str, tag: &str) -> QuizItem {
        QuizItem {
            punishment_tag: Some(tag.to_string()),
            ..item(id)
        }
    }

    /// Config with no cooldown so tests advance deterministically.
    fn no_cooldown() -> SchedulerConfig {
        SchedulerConfig {
            cooldown_secs: 0,
            ..SchedulerConfig::default()
        }
    }

    /// Registry stub that records which tags fired, in order.
    fn recording(scheduler: &mut QuizScheduler, tags: &[&str]) -> Arc<Mutex<Vec<String>>> {
        let fired = Arc::new(Mutex::new(Vec::new()));
        for tag in tags {
            let log = fired.clone();
            let tag_owned = tag.to_string();
            scheduler.register_punishment(
                *tag,
                Box::new(move || log.lock().unwrap().push(tag_owned.clone())),
            );
        }
        fired
    }

    #[test]
    fn starts_idle_with_empty_queue() {
        let scheduler = QuizScheduler::new(SchedulerConfig::default());
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
        assert_eq!(scheduler.queue_len(), 0);
        assert_eq!(scheduler.wrong_streak(), 0);
    }

    #[test]
    fn try_advance_dispatches_fifo() {
        let mut scheduler = QuizScheduler::new(SchedulerConfig::default());
        scheduler.ingest(vec![item("q1"), item("q2")]);

        match scheduler.try_advance() {
            Some(Event::QuizDispatched { item, queue_len, .. }) => {
                assert_eq!(item.id, "q1");
                assert_eq!(queue_len, 1);
            }
            other => panic!("expected QuizDispatched, got {other:?}"),
        }
        assert_eq!(scheduler.phase(), SchedulerPhase::Showing);
    }

    #[test]
    fn try_advance_is_noop_while_showing() {
        let mut scheduler = QuizScheduler::new(SchedulerConfig::default());
        scheduler.ingest(vec![item("q1"), item("q2")]);
        assert!(scheduler.try_advance().is_some());
        assert!(scheduler.try_advance().is_none());
        assert_eq!(scheduler.queue_len(), 1);
    }

    #[test]
    fn try_advance_is_noop_on_empty_queue() {
        let mut scheduler = QuizScheduler::new(SchedulerConfig::default());
        assert!(scheduler.try_advance().is_none());
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
    }

    #[test]
    fn try_advance_is_noop_during_cooldown() {
        let mut scheduler = QuizScheduler::new(SchedulerConfig::default());
        scheduler.ingest(vec![item("q1"), item("q2")]);
        scheduler.try_advance();
        scheduler.on_dismissed("q1");
        assert_eq!(scheduler.phase(), SchedulerPhase::Cooldown);
        assert!(scheduler.try_advance().is_none());
    }

    #[test]
    fn ingest_deduplicates_by_id() {
        let mut scheduler = QuizScheduler::new(SchedulerConfig::default());
        let first = scheduler.ingest(vec![item("q1")]);
        let second = scheduler.ingest(vec![item("q1")]);
        assert_eq!(first.queued, 1);
        assert_eq!(second.queued, 0);
        assert_eq!(second.duplicates, 1);
        assert_eq!(scheduler.queue_len(), 1);
    }

    #[test]
    fn dispatched_item_is_never_requeued_by_ingest() {
        let mut scheduler = QuizScheduler::new(no_cooldown());
        scheduler.ingest(vec![item("q1")]);
        scheduler.try_advance();
        scheduler.on_answered("q1", 0);
        scheduler.on_dismissed("q1");

        let report = scheduler.ingest(vec![item("q1")]);
        assert_eq!(report.duplicates, 1);
        assert_eq!(scheduler.queue_len(), 0);
    }

    #[test]
    fn ingest_raw_drops_malformed_records() {
        let mut scheduler = QuizScheduler::new(SchedulerConfig::default());
        let good = RawQuestion {
            id: None,
            title: None,
            question: "Q".into(),
            choices: [("A", "x"), ("B", "y")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            correct_answer: "A".into(),
            punishment: None,
        };
        let bad = RawQuestion {
            correct_answer: "Z".into(),
            ..good.clone()
        };
        let report = scheduler.ingest_raw(vec![good, bad]);
        assert_eq!(report.queued, 1);
        assert_eq!(report.malformed, 1);
        assert_eq!(scheduler.queue_len(), 1);
    }

    #[test]
    fn correct_answer_resets_streak() {
        let mut scheduler = QuizScheduler::new(no_cooldown());
        scheduler.ingest(vec![item("q1"), item("q2"), item("q3")]);

        scheduler.try_advance();
        scheduler.on_answered("q1", 2); // wrong
        scheduler.on_dismissed("q1");
        scheduler.tick();
        scheduler.on_answered("q2", 1); // wrong
        assert_eq!(scheduler.wrong_streak(), 2);
        scheduler.on_dismissed("q2");

        scheduler.tick();
        let event = scheduler.on_answered("q3", 0).unwrap();
        match event {
            Event::QuizAnswered { correct, wrong_streak, .. } => {
                assert!(correct);
                assert_eq!(wrong_streak, 0);
            }
            other => panic!("expected QuizAnswered, got {other:?}"),
        }
    }

    #[test]
    fn streak_threshold_fires_severe_then_own_tag() {
        let mut scheduler = QuizScheduler::new(no_cooldown());
        let fired = recording(&mut scheduler, &[SEVERE_TAG, "tint_screen", "shrink_video"]);

        scheduler.ingest(vec![
            tagged_item("q1", "tint_screen"),
            tagged_item("q2", "shrink_video"),
        ]);

        scheduler.try_advance();
        scheduler.on_answered("q1", 1); // wrong, streak 1: own tag only
        assert_eq!(*fired.lock().unwrap(), vec!["tint_screen"]);

        scheduler.on_dismissed("q1");
        scheduler.tick();
        scheduler.on_answered("q2", 1); // wrong, streak 2: severe first, then own
        assert_eq!(
            *fired.lock().unwrap(),
            vec!["tint_screen", SEVERE_TAG, "shrink_video"]
        );
    }

    #[test]
    fn unknown_punishment_tag_is_ignored() {
        let mut scheduler = QuizScheduler::new(SchedulerConfig::default());
        scheduler.ingest(vec![tagged_item("q1", "not_registered")]);
        scheduler.try_advance();

        let event = scheduler.on_answered("q1", 1).unwrap();
        match event {
            Event::QuizAnswered { punishments, .. } => assert!(punishments.is_empty()),
            other => panic!("expected QuizAnswered, got {other:?}"),
        }
    }

    #[test]
    fn stale_answer_is_ignored() {
        let mut scheduler = QuizScheduler::new(SchedulerConfig::default());
        scheduler.ingest(vec![item("q1")]);
        scheduler.try_advance();

        assert!(scheduler.on_answered("unknown", 0).is_none());
        assert_eq!(scheduler.wrong_streak(), 0);
        assert_eq!(scheduler.phase(), SchedulerPhase::Showing);
    }

    #[test]
    fn second_answer_for_same_item_is_ignored() {
        let mut scheduler = QuizScheduler::new(SchedulerConfig::default());
        scheduler.ingest(vec![item("q1")]);
        scheduler.try_advance();

        assert!(scheduler.on_answered("q1", 1).is_some());
        assert!(scheduler.on_answered("q1", 0).is_none());
        assert_eq!(scheduler.wrong_streak(), 1);
    }

    #[test]
    fn stale_dismissal_is_ignored() {
        let mut scheduler = QuizScheduler::new(SchedulerConfig::default());
        scheduler.ingest(vec![item("q1")]);
        scheduler.try_advance();

        assert!(scheduler.on_dismissed("unknown").is_none());
        assert_eq!(scheduler.phase(), SchedulerPhase::Showing);
    }

    #[test]
    fn dismissal_starts_cooldown_then_tick_advances() {
        let mut scheduler = QuizScheduler::new(no_cooldown());
        scheduler.ingest(vec![item("q1"), item("q2")]);
        scheduler.try_advance();

        let event = scheduler.on_dismissed("q1").unwrap();
        match event {
            Event::QuizDismissed { answered, requeued, .. } => {
                assert!(!answered);
                assert!(!requeued);
            }
            other => panic!("expected QuizDismissed, got {other:?}"),
        }

        // Zero cooldown elapses on the next tick, which dispatches q2.
        match scheduler.tick() {
            Some(Event::QuizDispatched { item, .. }) => assert_eq!(item.id, "q2"),
            other => panic!("expected QuizDispatched, got {other:?}"),
        }
    }

    #[test]
    fn pending_cooldown_blocks_tick_dispatch() {
        let mut scheduler = QuizScheduler::new(SchedulerConfig {
            cooldown_secs: 3600,
            ..SchedulerConfig::default()
        });
        scheduler.ingest(vec![item("q1"), item("q2")]);
        scheduler.try_advance();
        scheduler.on_dismissed("q1");

        assert!(scheduler.tick().is_none());
        assert_eq!(scheduler.phase(), SchedulerPhase::Cooldown);
        assert!(scheduler.cooldown_remaining_ms() > 0);
    }

    #[test]
    fn unanswered_dismissal_requeues_when_configured() {
        let mut scheduler = QuizScheduler::new(SchedulerConfig {
            cooldown_secs: 0,
            requeue_on_dismiss: true,
            ..SchedulerConfig::default()
        });
        scheduler.ingest(vec![item("q1")]);
        scheduler.try_advance();

        let event = scheduler.on_dismissed("q1").unwrap();
        match event {
            Event::QuizDismissed { requeued, .. } => assert!(requeued),
            other => panic!("expected QuizDismissed, got {other:?}"),
        }
        assert_eq!(scheduler.queue_len(), 1);
    }

    #[test]
    fn answered_dismissal_never_requeues() {
        let mut scheduler = QuizScheduler::new(SchedulerConfig {
            cooldown_secs: 0,
            requeue_on_dismiss: true,
            ..SchedulerConfig::default()
        });
        scheduler.ingest(vec![item("q1")]);
        scheduler.try_advance();
        scheduler.on_answered("q1", 0);
        scheduler.on_dismissed("q1");
        assert_eq!(scheduler.queue_len(), 0);
    }

    #[test]
    fn state_survives_serde_roundtrip() {
        let mut scheduler = QuizScheduler::new(SchedulerConfig::default());
        scheduler.ingest(vec![item("q1"), item("q2")]);
        scheduler.try_advance();
        scheduler.on_answered("q1", 1);

        let json = serde_json::to_string(&scheduler).unwrap();
        let restored: QuizScheduler = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.phase(), SchedulerPhase::Showing);
        assert_eq!(restored.queue_len(), 1);
        assert_eq!(restored.wrong_streak(), 1);
        assert_eq!(restored.current_item().unwrap().id, "q1");
    }

    #[test]
    fn snapshot_reports_current_state() {
        let mut scheduler = QuizScheduler::new(SchedulerConfig::default());
        scheduler.ingest(vec![item("q1"), item("q2")]);
        scheduler.try_advance();

        match scheduler.snapshot() {
            Event::StateSnapshot {
                phase,
                queue_len,
                wrong_streak,
                current_item_id,
                ..
            } => {
                assert_eq!(phase, SchedulerPhase::Showing);
                assert_eq!(queue_len, 1);
                assert_eq!(wrong_streak, 0);
                assert_eq!(current_item_id.as_deref(), Some("q1"));
            }
            other => panic!("expected StateSnapshot, got {other:?}"),
        }
    }
}
