// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Contract for the remote log service.
//!
//! The handler never talks to the network itself: callers provide an
//! implementation of [`LogsClient`] that owns transport, credentials and
//! endpoint selection. Every call is treated as a single fallible round trip
//! with no partial results.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::error::ClientError;
use crate::event::LogEvent;

/// A log group as returned by a group listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogGroup {
    pub name: String,
}

/// A log stream as returned by a stream listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogStream {
    pub name: String,
    /// Token that the next append to this stream must carry, if any.
    pub upload_sequence_token: Option<String>,
}

/// One append request against a stream.
#[derive(Debug, Clone, Copy)]
pub struct PutLogEventsRequest<'a> {
    pub group_name: &'a str,
    pub stream_name: &'a str,
    /// Sorted ascending by timestamp.
    pub events: &'a [LogEvent],
    pub sequence_token: Option<&'a str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutLogEventsResponse {
    pub next_sequence_token: Option<String>,
}

#[async_trait]
pub trait LogsClient: Send + Sync {
    /// Lists groups whose name starts with `name_prefix`.
    async fn describe_log_groups(
        &self,
        name_prefix: &str,
        limit: Option<u32>,
    ) -> Result<Vec<LogGroup>, ClientError>;

    /// Creates a group. `tags` is `None` when no tags are configured.
    async fn create_log_group(
        &self,
        name: &str,
        tags: Option<&BTreeMap<String, String>>,
    ) -> Result<(), ClientError>;

    async fn put_retention_policy(&self, group_name: &str, days: u32)
        -> Result<(), ClientError>;

    /// Lists streams of `group_name` whose name starts with `name_prefix`.
    async fn describe_log_streams(
        &self,
        group_name: &str,
        name_prefix: &str,
    ) -> Result<Vec<LogStream>, ClientError>;

    async fn create_log_stream(&self, group_name: &str, name: &str) -> Result<(), ClientError>;

    /// Appends a batch. Stale or already used tokens fail with an error for
    /// which [`ClientError::is_token_conflict`] is true.
    async fn put_log_events(
        &self,
        request: PutLogEventsRequest<'_>,
    ) -> Result<PutLogEventsResponse, ClientError>;
}
