//! Quiz source collaborators.

pub mod http;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::quiz::RawQuestion;

pub use http::HttpQuizSource;

/// A provider of quiz question batches keyed by a content identifier.
///
/// Implementations are polled on a fixed interval; a failed fetch is
/// logged and skipped, never fatal.
#[async_trait]
pub trait QuizSource: Send + Sync {
    async fn fetch_batch(&self, video_id: &str) -> Result<Vec<RawQuestion>, SourceError>;
}
