//! Mock implementations for testing
//!
//! [`MockTransport`] replays a scripted sequence of responses and network
//! failures, and records every requested URL.

use crate::client::transport::{HttpResponse, HttpTransport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use url::Url;

type Outcome = std::result::Result<HttpResponse, TransportError>;

/// Scripted transport for testing
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Outcome>>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Create new mock transport with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response
    #[must_use]
    pub fn respond(self, response: HttpResponse) -> Self {
        self.push(Ok(response));
        self
    }

    /// Queue a network failure
    #[must_use]
    pub fn fail(self, error: TransportError) -> Self {
        self.push(Err(error));
        self
    }

    /// Queue a response on a shared transport
    pub fn push(&self, outcome: Outcome) {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(outcome);
    }

    /// Number of requests made so far
    pub fn calls(&self) -> usize {
        self.requests().len()
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &Url) -> Outcome {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(url.to_string());

        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connect(format!("no scripted response for {url}"))))
    }
}
