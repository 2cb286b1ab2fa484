//! HTTP quiz source backed by the local question server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::QuizSource;
use crate::error::SourceError;
use crate::quiz::RawQuestion;

/// Response envelope from `GET /questions`.
#[derive(Debug, Deserialize)]
struct QuestionsResponse {
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

/// Client for the question server (`http://127.0.0.1:5000` by default).
#[derive(Debug)]
pub struct HttpQuizSource {
    base: Url,
    client: Client,
}

impl HttpQuizSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, SourceError> {
        let base = Url::parse(endpoint).map_err(|err| SourceError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SourceError::Unavailable)?;
        Ok(Self { base, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, SourceError> {
        self.base.join(path).map_err(|err| SourceError::InvalidEndpoint {
            endpoint: self.base.to_string(),
            message: err.to_string(),
        })
    }

    /// Probe the server's `/health` endpoint.
    pub async fn health(&self) -> Result<(), SourceError> {
        let url = self.endpoint("health")?;
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl QuizSource for HttpQuizSource {
    async fn fetch_batch(&self, video_id: &str) -> Result<Vec<RawQuestion>, SourceError> {
        let mut url = self.endpoint("questions")?;
        url.query_pairs_mut().append_pair("video_id", video_id);

        tracing::debug!(%url, "fetching question batch");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        let body: QuestionsResponse = resp
            .json()
            .await
            .map_err(|err| SourceError::Decode(err.to_string()))?;
        Ok(body.questions)
    }
}
