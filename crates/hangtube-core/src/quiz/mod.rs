mod item;
mod punishment;
mod scheduler;

pub use item::{QuizItem, RawQuestion};
pub use punishment::{
    PunishmentEffect, PunishmentRegistry, BLUR_TITLE_TAG, SEVERE_TAG, SHRINK_VIDEO_TAG,
    TINT_SCREEN_TAG,
};
pub use scheduler::{IngestReport, QuizScheduler, SchedulerConfig, SchedulerPhase};
