// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Accumulation of events awaiting submission.
//!
//! The buffer never holds more than one request's worth of events. Before an
//! event is pushed, [`Buffer::needs_flush_before`] tells the owner whether the
//! current contents must be sent first:
//!
//! 1. **Size**: `bytes + event.size() >= max_bytes`
//! 2. **Count**: `len >= max_count`
//! 3. **Time span**: the batch would cover 24 hours or more
//!
//! The check runs on the triggering event, so a submitted batch always
//! satisfies every limit.

use crate::constants;
use crate::event::LogEvent;

#[derive(Debug, Clone)]
pub struct Buffer {
    events: Vec<LogEvent>,
    /// Sum of [`LogEvent::size`] over `events`.
    bytes: usize,
    max_bytes: usize,
    max_count: usize,
    max_timespan_millis: i64,
    /// Oldest and newest timestamp currently buffered.
    bounds: Option<(i64, i64)>,
}

impl Buffer {
    #[must_use]
    pub fn new(max_count: usize) -> Self {
        Self::with_limits(
            max_count,
            constants::MAX_BATCH_SIZE_BYTES,
            constants::MAX_BATCH_TIMESPAN_MILLIS,
        )
    }

    /// Buffer with explicit limits, mostly useful for exercising flush
    /// decisions without megabyte sized payloads.
    #[must_use]
    pub fn with_limits(max_count: usize, max_bytes: usize, max_timespan_millis: i64) -> Self {
        Buffer {
            events: Vec::new(),
            bytes: 0,
            max_bytes,
            max_count,
            max_timespan_millis,
            bounds: None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    #[must_use]
    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    /// Whether the buffered events must be flushed before `event` is added.
    #[must_use]
    pub fn needs_flush_before(&self, event: &LogEvent) -> bool {
        if self.events.is_empty() {
            return false;
        }
        if self.bytes + event.size() >= self.max_bytes {
            return true;
        }
        if self.events.len() >= self.max_count {
            return true;
        }
        match self.bounds {
            Some((oldest, newest)) => {
                let ts = event.timestamp_millis();
                // the full i64 range fits in u64
                let span = newest.max(ts).abs_diff(oldest.min(ts));
                span >= self.max_timespan_millis.unsigned_abs()
            }
            None => false,
        }
    }

    /// Adds an event. The caller is expected to have flushed first when
    /// [`Buffer::needs_flush_before`] said so.
    pub fn push(&mut self, event: LogEvent) {
        let ts = event.timestamp_millis();
        self.bounds = Some(match self.bounds {
            Some((oldest, newest)) => (oldest.min(ts), newest.max(ts)),
            None => (ts, ts),
        });
        self.bytes += event.size();
        self.events.push(event);
    }

    /// Empties the buffer, handing back its events in insertion order.
    pub fn take(&mut self) -> Vec<LogEvent> {
        self.bytes = 0;
        self.bounds = None;
        std::mem::take(&mut self.events)
    }
}
