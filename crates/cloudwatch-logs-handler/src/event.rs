// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

use crate::constants::{EVENT_ENVELOPE_BYTES, MAX_EVENT_MESSAGE_BYTES};

/// A single event as submitted to the remote stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEvent {
    message: String,
    #[serde(rename = "timestamp")]
    timestamp_millis: i64,
}

impl LogEvent {
    #[must_use]
    pub fn new(message: String, timestamp_millis: i64) -> Self {
        LogEvent {
            message,
            timestamp_millis,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp_millis
    }

    /// Bytes this event counts against the batch size limit.
    #[must_use]
    pub fn size(&self) -> usize {
        self.message.len() + EVENT_ENVELOPE_BYTES
    }

    /// Turns one message into as many events as needed to respect the
    /// per-event size ceiling. Segments keep their order and share the
    /// timestamp; an empty message still yields one event.
    #[must_use]
    pub fn split(message: &str, timestamp_millis: i64) -> Vec<LogEvent> {
        split_message(message, MAX_EVENT_MESSAGE_BYTES)
            .into_iter()
            .map(|segment| LogEvent::new(segment.to_string(), timestamp_millis))
            .collect()
    }
}

/// Splits `message` into consecutive segments of at most `max_bytes` bytes.
///
/// Cuts only at char boundaries, so a segment may come out up to three bytes
/// short when a multi-byte character straddles the limit.
pub(crate) fn split_message(message: &str, max_bytes: usize) -> Vec<&str> {
    if message.len() <= max_bytes || max_bytes < 4 {
        return vec![message];
    }

    let mut segments = Vec::with_capacity(message.len().div_ceil(max_bytes));
    let mut rest = message;
    while rest.len() > max_bytes {
        let mut cut = max_bytes;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let (head, tail) = rest.split_at(cut);
        segments.push(head);
        rest = tail;
    }
    segments.push(rest);
    segments
}
