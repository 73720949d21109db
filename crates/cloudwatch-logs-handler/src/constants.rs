// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Limits imposed by the remote log service on a single append request.
//!
//! A request is rejected outright when any of these is violated, so the
//! buffer enforces them before a batch ever leaves the process:
//! - **Batch size**: sum of `message bytes + 26` over all events
//! - **Batch count**: number of events in one request
//! - **Time span**: newest minus oldest timestamp within one request
//! - **Event size**: a single event, envelope included

/// Maximum size of one append request, in bytes, envelopes included.
pub const MAX_BATCH_SIZE_BYTES: usize = 1_048_576;

/// Protocol ceiling for the number of events in one append request.
///
/// [`crate::config::HandlerConfig::batch_size`] may be lower, never higher.
pub const MAX_BATCH_COUNT: usize = 10_000;

/// Fixed per-event overhead the service charges on top of the message bytes.
pub const EVENT_ENVELOPE_BYTES: usize = 26;

/// Maximum size of a single event, envelope included.
pub const MAX_EVENT_SIZE_BYTES: usize = 262_144;

/// Largest message segment that still fits in one event.
pub const MAX_EVENT_MESSAGE_BYTES: usize = MAX_EVENT_SIZE_BYTES - EVENT_ENVELOPE_BYTES;

/// Events in one request must not span 24 hours or more.
pub const MAX_BATCH_TIMESPAN_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Append requests per second allowed by the service quota.
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 5;

pub const DEFAULT_RETENTION_DAYS: u32 = 7;

/// How many times a token conflict is answered with refresh-and-retry.
pub const DEFAULT_TOKEN_CONFLICT_RETRIES: usize = 1;

/// Retention periods, in days, accepted by the service.
pub const VALID_RETENTION_DAYS: [u32; 22] = [
    1, 3, 5, 7, 14, 30, 60, 90, 120, 150, 180, 365, 400, 545, 731, 1096, 1827, 2192, 2557, 2922,
    3288, 3653,
];
