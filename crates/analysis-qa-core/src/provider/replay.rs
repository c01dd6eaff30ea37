//! Replays recorded raw provider responses.
//!
//! Each call consumes the next recorded payload and runs it through the
//! parse boundary, so captured model output (including malformed responses)
//! exercises the same path as a live provider. Once the recording is
//! exhausted every further call fails with `Unavailable`.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::{ProviderError, ProviderResult};
use super::payload::parse_provider_payload;
use super::AnalysisProvider;
use crate::domain::{AnalysisRequest, ScoredAnalysis};

/// One recorded provider response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordedResponse {
    /// Raw model text, parsed on replay.
    Payload { body: String },
    /// Upstream failure (non-2xx).
    Status { code: u16, message: String },
    /// Network failure.
    Transport { message: String },
}

/// Provider backed by a queue of recorded responses.
#[derive(Debug)]
pub struct ReplayProvider {
    responses: Mutex<VecDeque<RecordedResponse>>,
}

impl ReplayProvider {
    pub fn new(responses: Vec<RecordedResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }

    /// Convenience constructor for payload-only recordings.
    pub fn from_payloads<I, S>(payloads: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            payloads
                .into_iter()
                .map(|body| RecordedResponse::Payload { body: body.into() })
                .collect(),
        )
    }

    /// Recorded responses not yet replayed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|q| q.len()).unwrap_or(0)
    }

    fn next(&self) -> Option<RecordedResponse> {
        self.responses.lock().ok().and_then(|mut q| q.pop_front())
    }
}

#[async_trait]
impl AnalysisProvider for ReplayProvider {
    async fn analyze(&self, _request: &AnalysisRequest) -> ProviderResult<ScoredAnalysis> {
        match self.next() {
            Some(RecordedResponse::Payload { body }) => parse_provider_payload(&body),
            Some(RecordedResponse::Status { code, message }) => {
                Err(ProviderError::Status { code, message })
            }
            Some(RecordedResponse::Transport { message }) => Err(ProviderError::Transport(message)),
            None => Err(ProviderError::Unavailable(
                "replay recording exhausted".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "replay"
    }
}
