// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Turning structured records into the message string that gets shipped.
//!
//! # Format
//!
//! [`LineFormatter`] produces one line per record:
//! ```text
//! [2024-01-01T00:00:00.000Z] app.ERROR: payment failed {"order":42}
//! ```
//! The context object is omitted when empty.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Notice => "NOTICE",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
            Level::Alert => "ALERT",
            Level::Emergency => "EMERGENCY",
        };
        f.write_str(name)
    }
}

/// A structured log record as produced by the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: Level,
    pub channel: String,
    pub message: String,
    #[serde(default)]
    pub context: Map<String, Value>,
    pub timestamp_millis: i64,
}

impl LogRecord {
    /// A record stamped with the current time and an empty context.
    #[must_use]
    pub fn new(level: Level, channel: impl Into<String>, message: impl Into<String>) -> Self {
        LogRecord {
            level,
            channel: channel.into(),
            message: message.into(),
            context: Map::new(),
            timestamp_millis: Utc::now().timestamp_millis(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn at(mut self, timestamp_millis: i64) -> Self {
        self.timestamp_millis = timestamp_millis;
        self
    }
}

pub trait Formatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormatter;

impl Formatter for LineFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let datetime = DateTime::<Utc>::from_timestamp_millis(record.timestamp_millis)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_else(|| record.timestamp_millis.to_string());

        let mut line = format!(
            "[{datetime}] {}.{}: {}",
            record.channel, record.level, record.message
        );
        if !record.context.is_empty() {
            line.push(' ');
            line.push_str(&Value::Object(record.context.clone()).to_string());
        }
        line
    }
}
