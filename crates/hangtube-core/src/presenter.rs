//! Presentation layer boundary.

use crate::quiz::QuizItem;

/// What the user did with a presented quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterOutcome {
    /// The user picked the choice at this index.
    Answered(usize),
    /// The quiz was closed (or timed out) without an answer.
    Dismissed,
}

/// Renders one quiz item and collects exactly one outcome.
///
/// Implementations own all rendering concerns. The scheduler never calls a
/// presenter directly -- the hosting loop presents the dispatched item and
/// routes the outcome back through `on_answered`/`on_dismissed`.
pub trait Presenter {
    fn present(&mut self, item: &QuizItem) -> PresenterOutcome;
}
