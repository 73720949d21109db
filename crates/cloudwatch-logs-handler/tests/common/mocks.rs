// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-memory log service for exercising the handler end to end

use async_trait::async_trait;
use cloudwatch_logs_handler::client::{
    LogGroup, LogStream, LogsClient, PutLogEventsRequest, PutLogEventsResponse,
};
use cloudwatch_logs_handler::constants::{
    MAX_BATCH_COUNT, MAX_BATCH_SIZE_BYTES, MAX_BATCH_TIMESPAN_MILLIS, MAX_EVENT_SIZE_BYTES,
};
use cloudwatch_logs_handler::event::LogEvent;
use cloudwatch_logs_handler::ClientError;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Call {
    DescribeLogGroups {
        prefix: String,
        limit: Option<u32>,
    },
    CreateLogGroup {
        name: String,
        tags: Option<BTreeMap<String, String>>,
    },
    PutRetentionPolicy {
        group: String,
        days: u32,
    },
    DescribeLogStreams {
        group: String,
        prefix: String,
    },
    CreateLogStream {
        group: String,
        name: String,
    },
    PutLogEvents {
        events: usize,
        token: Option<String>,
    },
}

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct AcceptedBatch {
    pub events: Vec<LogEvent>,
    pub at: Instant,
}

#[derive(Default)]
struct State {
    groups: Vec<String>,
    /// stream name -> current upload token
    streams: HashMap<(String, String), Option<String>>,
    next_token: u64,
    calls: Vec<Call>,
    accepted: Vec<AcceptedBatch>,
    /// errors returned, in order, by the next put_log_events calls
    put_failures: Vec<ClientError>,
}

/// Behaves like the remote service: it hands out sequence tokens, rejects
/// stale ones and rejects batches that break a request limit.
#[derive(Default)]
pub struct MockLogService {
    state: Mutex<State>,
}

#[allow(dead_code)]
impl MockLogService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(self, name: &str) -> Self {
        self.state.lock().unwrap().groups.push(name.to_string());
        self
    }

    pub fn with_stream(self, group: &str, name: &str, token: Option<&str>) -> Self {
        self.state.lock().unwrap().streams.insert(
            (group.to_string(), name.to_string()),
            token.map(str::to_string),
        );
        self
    }

    /// Simulates another writer appending to the stream.
    pub fn advance_token(&self, group: &str, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_token += 1;
        let token = format!("foreign-{}", state.next_token);
        state
            .streams
            .insert((group.to_string(), name.to_string()), Some(token.clone()));
        token
    }

    /// Simulates the stream being deleted and recreated by another writer.
    pub fn recreate_stream(&self, group: &str, name: &str) {
        self.state
            .lock()
            .unwrap()
            .streams
            .insert((group.to_string(), name.to_string()), None);
    }

    pub fn fail_next_put(&self, error: ClientError) {
        self.state.lock().unwrap().put_failures.push(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count<F: Fn(&Call) -> bool>(&self, predicate: F) -> usize {
        self.calls().iter().filter(|c| predicate(c)).count()
    }

    pub fn accepted(&self) -> Vec<AcceptedBatch> {
        self.state.lock().unwrap().accepted.clone()
    }

    pub fn accepted_sizes(&self) -> Vec<usize> {
        self.accepted().iter().map(|b| b.events.len()).collect()
    }

    fn validate(events: &[LogEvent]) -> Result<(), ClientError> {
        let invalid = |message: &str| ClientError::Service {
            code: "InvalidParameterException".to_string(),
            message: message.to_string(),
        };
        if events.is_empty() || events.len() > MAX_BATCH_COUNT {
            return Err(invalid("batch count out of range"));
        }
        if events.iter().map(LogEvent::size).sum::<usize>() > MAX_BATCH_SIZE_BYTES {
            return Err(invalid("batch too large"));
        }
        if events.iter().any(|e| e.size() > MAX_EVENT_SIZE_BYTES) {
            return Err(invalid("event too large"));
        }
        if events
            .windows(2)
            .any(|w| w[0].timestamp_millis() > w[1].timestamp_millis())
        {
            return Err(invalid("events not in chronological order"));
        }
        let span = events[events.len() - 1].timestamp_millis() - events[0].timestamp_millis();
        if span >= MAX_BATCH_TIMESPAN_MILLIS {
            return Err(invalid("batch spans more than 24 hours"));
        }
        Ok(())
    }
}

#[async_trait]
impl LogsClient for MockLogService {
    async fn describe_log_groups(
        &self,
        name_prefix: &str,
        limit: Option<u32>,
    ) -> Result<Vec<LogGroup>, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DescribeLogGroups {
            prefix: name_prefix.to_string(),
            limit,
        });
        Ok(state
            .groups
            .iter()
            .filter(|g| g.starts_with(name_prefix))
            .map(|g| LogGroup { name: g.clone() })
            .collect())
    }

    async fn create_log_group(
        &self,
        name: &str,
        tags: Option<&BTreeMap<String, String>>,
    ) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateLogGroup {
            name: name.to_string(),
            tags: tags.cloned(),
        });
        if state.groups.iter().any(|g| g == name) {
            return Err(ClientError::Service {
                code: "ResourceAlreadyExistsException".to_string(),
                message: name.to_string(),
            });
        }
        state.groups.push(name.to_string());
        Ok(())
    }

    async fn put_retention_policy(&self, group_name: &str, days: u32) -> Result<(), ClientError> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(Call::PutRetentionPolicy {
                group: group_name.to_string(),
                days,
            });
        Ok(())
    }

    async fn describe_log_streams(
        &self,
        group_name: &str,
        name_prefix: &str,
    ) -> Result<Vec<LogStream>, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DescribeLogStreams {
            group: group_name.to_string(),
            prefix: name_prefix.to_string(),
        });
        Ok(state
            .streams
            .iter()
            .filter(|((g, s), _)| g == group_name && s.starts_with(name_prefix))
            .map(|((_, s), token)| LogStream {
                name: s.clone(),
                upload_sequence_token: token.clone(),
            })
            .collect())
    }

    async fn create_log_stream(&self, group_name: &str, name: &str) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateLogStream {
            group: group_name.to_string(),
            name: name.to_string(),
        });
        if !state.groups.iter().any(|g| g == group_name) {
            return Err(ClientError::ResourceNotFound(group_name.to_string()));
        }
        state
            .streams
            .insert((group_name.to_string(), name.to_string()), None);
        Ok(())
    }

    async fn put_log_events(
        &self,
        request: PutLogEventsRequest<'_>,
    ) -> Result<PutLogEventsResponse, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::PutLogEvents {
            events: request.events.len(),
            token: request.sequence_token.map(str::to_string),
        });
        if !state.put_failures.is_empty() {
            return Err(state.put_failures.remove(0));
        }

        let key = (
            request.group_name.to_string(),
            request.stream_name.to_string(),
        );
        let expected = match state.streams.get(&key) {
            Some(token) => token.clone(),
            None => return Err(ClientError::ResourceNotFound(request.stream_name.to_string())),
        };
        if expected.as_deref() != request.sequence_token {
            return Err(ClientError::InvalidSequenceToken { expected });
        }
        Self::validate(request.events)?;

        state.next_token += 1;
        let next = format!("token-{}", state.next_token);
        state.streams.insert(key, Some(next.clone()));
        state.accepted.push(AcceptedBatch {
            events: request.events.to_vec(),
            at: Instant::now(),
        });
        Ok(PutLogEventsResponse {
            next_sequence_token: Some(next),
        })
    }
}
