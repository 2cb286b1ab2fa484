//! # Hang Tube Core Library
//!
//! This library provides the core logic for Hang Tube: it sequences quiz
//! questions over a video-watching session, enforces at-most-one-visible-quiz
//! at a time, and escalates a punishment effect when the user keeps answering
//! wrong.
//!
//! ## Architecture
//!
//! - **Quiz Scheduler**: A wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick()` and to route presentation
//!   outcomes back in via `on_answered`/`on_dismissed`
//! - **Quiz Source**: async HTTP client polling the local question server
//! - **Storage**: SQLite engagement log and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`QuizScheduler`]: Core scheduling state machine
//! - [`HttpQuizSource`]: Question batch fetcher
//! - [`PunishmentRegistry`]: Tag-to-effect lookup for wrong answers
//! - [`Database`]: Engagement persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod presenter;
pub mod quiz;
pub mod source;
pub mod storage;

pub use error::{ConfigError, CoreError, ItemError, SourceError, StorageError};
pub use events::Event;
pub use presenter::{Presenter, PresenterOutcome};
pub use quiz::{
    IngestReport, PunishmentEffect, PunishmentRegistry, QuizItem, QuizScheduler, RawQuestion,
    SchedulerConfig, SchedulerPhase,
};
pub use source::{HttpQuizSource, QuizSource};
pub use storage::{AnswerRecord, Config, Database, Stats};
