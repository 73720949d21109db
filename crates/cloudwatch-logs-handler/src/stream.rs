// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Group/stream provisioning and sequencing-token discovery.
//!
//! Nothing is cached on failure: a remote error aborts the step that raised
//! it and leaves [`StreamState`] as it was, so the next send starts over.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::client::LogsClient;
use crate::config::HandlerConfig;
use crate::error::ClientError;

/// What the handler knows about the remote stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamState {
    pub initialized: bool,
    /// Token the next append must carry. `None` on a brand-new stream or
    /// after it was discarded following a failed conflict recovery.
    pub sequence_token: Option<String>,
}

pub struct StreamInitializer {
    client: Arc<dyn LogsClient>,
    group_name: String,
    stream_name: String,
    retention_days: Option<u32>,
    tags: BTreeMap<String, String>,
    create_group: bool,
    group_lookup_limit: Option<u32>,
}

impl StreamInitializer {
    #[must_use]
    pub fn new(client: Arc<dyn LogsClient>, config: &HandlerConfig) -> Self {
        StreamInitializer {
            client,
            group_name: config.group_name.clone(),
            stream_name: config.stream_name.clone(),
            retention_days: config.retention_days,
            tags: config.tags.clone(),
            create_group: config.create_group,
            group_lookup_limit: config.group_lookup_limit,
        }
    }

    #[must_use]
    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    #[must_use]
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Makes sure group and stream exist and loads the current token.
    ///
    /// Does nothing once `state.initialized` is set.
    pub async fn initialize(&self, state: &mut StreamState) -> Result<(), ClientError> {
        if state.initialized {
            return Ok(());
        }
        if self.create_group {
            self.ensure_group().await?;
        }
        self.refresh_token(state).await?;
        state.initialized = true;
        debug!(
            "LOGS | Stream {}/{} initialized",
            self.group_name, self.stream_name
        );
        Ok(())
    }

    /// Creates the group unless one with the exact configured name exists.
    ///
    /// Tags are attached only when some are configured, and the retention
    /// policy is applied right after creation when one is configured.
    pub async fn ensure_group(&self) -> Result<(), ClientError> {
        let groups = self
            .client
            .describe_log_groups(&self.group_name, self.group_lookup_limit)
            .await?;
        if groups.iter().any(|group| group.name == self.group_name) {
            return Ok(());
        }

        let tags = (!self.tags.is_empty()).then_some(&self.tags);
        debug!("LOGS | Creating log group {}", self.group_name);
        self.client.create_log_group(&self.group_name, tags).await?;

        if let Some(days) = self.retention_days {
            debug!(
                "LOGS | Setting retention of {} to {days} days",
                self.group_name
            );
            self.client
                .put_retention_policy(&self.group_name, days)
                .await?;
        }
        Ok(())
    }

    /// Reads the stream's upload token, creating the stream when it is missing.
    ///
    /// The listed token always replaces the current one, including when the
    /// stream reports none (recreated, or never written to). A freshly created
    /// stream starts without a token.
    pub async fn refresh_token(&self, state: &mut StreamState) -> Result<(), ClientError> {
        let streams = self
            .client
            .describe_log_streams(&self.group_name, &self.stream_name)
            .await?;

        match streams.into_iter().find(|s| s.name == self.stream_name) {
            Some(stream) => {
                debug!("LOGS | Refreshed sequence token for {}", self.stream_name);
                state.sequence_token = stream.upload_sequence_token;
            }
            None => {
                debug!(
                    "LOGS | Creating log stream {}/{}",
                    self.group_name, self.stream_name
                );
                self.client
                    .create_log_stream(&self.group_name, &self.stream_name)
                    .await?;
                state.sequence_token = None;
            }
        }
        Ok(())
    }
}
