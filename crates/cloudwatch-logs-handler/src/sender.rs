// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivery of one batch to the remote stream.
//!
//! ```text
//!   initialize (first send only)
//!        │
//!   stable sort by timestamp
//!        │
//!   throttle ──> put_log_events(token) ──ok──> store next token
//!        ^              │
//!        │        token conflict
//!        │              │
//!        └── refresh ───┘   (at most `token_conflict_retries` times,
//!                            then the token is dropped and the error returned)
//! ```
//!
//! A conflict reported as "data already accepted" is retried like a stale
//! token. The service may then hold the batch twice; callers that cannot
//! tolerate duplicates must deduplicate downstream.

use std::sync::Arc;
use tracing::debug;

use crate::client::{LogsClient, PutLogEventsRequest};
use crate::config::HandlerConfig;
use crate::error::ClientError;
use crate::event::LogEvent;
use crate::stream::{StreamInitializer, StreamState};
use crate::throttle::RateLimiter;

pub struct BatchSender {
    client: Arc<dyn LogsClient>,
    initializer: StreamInitializer,
    state: StreamState,
    limiter: Option<RateLimiter>,
    token_conflict_retries: usize,
}

impl BatchSender {
    #[must_use]
    pub fn new(client: Arc<dyn LogsClient>, config: &HandlerConfig) -> Self {
        BatchSender {
            initializer: StreamInitializer::new(Arc::clone(&client), config),
            client,
            state: StreamState::default(),
            limiter: config.requests_per_second.map(RateLimiter::new),
            token_conflict_retries: config.token_conflict_retries,
        }
    }

    #[must_use]
    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Sends `events` as one append request.
    ///
    /// The caller keeps no copy: whatever the outcome, the events are not
    /// resubmitted by the handler later on.
    pub async fn send(&mut self, mut events: Vec<LogEvent>) -> Result<(), ClientError> {
        if events.is_empty() {
            return Ok(());
        }

        if !self.state.initialized {
            self.initializer.initialize(&mut self.state).await?;
        } else if self.state.sequence_token.is_none() {
            self.initializer.refresh_token(&mut self.state).await?;
        }

        // stable: equal timestamps keep their write order
        events.sort_by_key(LogEvent::timestamp_millis);

        let mut conflicts = 0;
        loop {
            if let Some(limiter) = self.limiter.as_mut() {
                limiter.acquire().await;
            }

            let request = PutLogEventsRequest {
                group_name: self.initializer.group_name(),
                stream_name: self.initializer.stream_name(),
                events: &events,
                sequence_token: self.state.sequence_token.as_deref(),
            };

            match self.client.put_log_events(request).await {
                Ok(response) => {
                    debug!("LOGS | Sent batch of {} events", events.len());
                    self.state.sequence_token = response.next_sequence_token;
                    return Ok(());
                }
                Err(e) if e.is_token_conflict() && conflicts < self.token_conflict_retries => {
                    conflicts += 1;
                    debug!("LOGS | Refreshing sequence token, attempt {conflicts}");
                    self.initializer.refresh_token(&mut self.state).await?;
                }
                Err(e) => {
                    if e.is_token_conflict() {
                        self.state.sequence_token = None;
                    }
                    return Err(e);
                }
            }
        }
    }
}
