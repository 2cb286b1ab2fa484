//! Punishment effects applied on wrong answers.
//!
//! The scheduler only knows tags; the presentation layer registers the
//! actual side effects. Unknown tags are ignored so a server can ship tags
//! this build has no rendering for.

use std::collections::HashMap;
use std::fmt;

/// Reserved tag for the escalated effect, fired once the wrong streak
/// reaches the configured threshold.
pub const SEVERE_TAG: &str = "severe";

/// Built-in tags for the effects the product ships.
pub const SHRINK_VIDEO_TAG: &str = "shrink_video";
pub const TINT_SCREEN_TAG: &str = "tint_screen";
pub const BLUR_TITLE_TAG: &str = "blur_title";

/// A fire-and-forget side effect.
///
/// `trigger` must not block; failures stay inside the effect -- the
/// scheduler neither awaits nor retries.
pub trait PunishmentEffect: Send + Sync {
    fn trigger(&self);
}

impl<F> PunishmentEffect for F
where
    F: Fn() + Send + Sync,
{
    fn trigger(&self) {
        self()
    }
}

/// Tag-to-effect lookup.
#[derive(Default)]
pub struct PunishmentRegistry {
    effects: HashMap<String, Box<dyn PunishmentEffect>>,
}

impl PunishmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tag: impl Into<String>, effect: Box<dyn PunishmentEffect>) {
        self.effects.insert(tag.into(), effect);
    }

    /// Trigger the effect registered under `tag`. Returns whether anything
    /// fired; unknown tags are silently ignored.
    pub fn apply(&self, tag: &str) -> bool {
        match self.effects.get(tag) {
            Some(effect) => {
                effect.trigger();
                true
            }
            None => {
                tracing::debug!(tag, "no punishment effect registered for tag");
                false
            }
        }
    }

    pub fn tags(&self) -> Vec<&str> {
        self.effects.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl fmt::Debug for PunishmentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PunishmentRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}
