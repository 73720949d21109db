// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;

use crate::constants;
use crate::error::HandlerError;

/// Settings for one handler, fixed for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub group_name: String,
    pub stream_name: String,
    /// Retention applied when the handler creates the group. `None` leaves
    /// retention alone.
    pub retention_days: Option<u32>,
    /// Events per append request, at most [`constants::MAX_BATCH_COUNT`].
    pub batch_size: usize,
    /// Attached when the handler creates the group.
    pub tags: BTreeMap<String, String>,
    /// When false the group is assumed to exist and is never listed,
    /// created or given a retention policy.
    pub create_group: bool,
    /// Page size for the group listing, `None` for the service default.
    pub group_lookup_limit: Option<u32>,
    /// Append requests per second. `None` disables throttling.
    pub requests_per_second: Option<u32>,
    /// Refresh-and-retry cycles allowed when the sequence token is rejected.
    pub token_conflict_retries: usize,
}

impl HandlerConfig {
    #[must_use]
    pub fn new(group_name: impl Into<String>, stream_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            stream_name: stream_name.into(),
            retention_days: Some(constants::DEFAULT_RETENTION_DAYS),
            batch_size: constants::MAX_BATCH_COUNT,
            tags: BTreeMap::new(),
            create_group: true,
            group_lookup_limit: None,
            requests_per_second: Some(constants::DEFAULT_REQUESTS_PER_SECOND),
            token_conflict_retries: constants::DEFAULT_TOKEN_CONFLICT_RETRIES,
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, HandlerError> {
        let group_name = env::var("CW_LOGS_GROUP").unwrap_or_default();
        let stream_name = env::var("CW_LOGS_STREAM").unwrap_or_default();
        let mut config = Self::new(group_name, stream_name);

        if let Ok(val) = env::var("CW_LOGS_RETENTION_DAYS") {
            let val = val.trim();
            config.retention_days = if val.is_empty() || val.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(parse_var("CW_LOGS_RETENTION_DAYS", val)?)
            };
        }
        if let Ok(val) = env::var("CW_LOGS_BATCH_SIZE") {
            config.batch_size = parse_var("CW_LOGS_BATCH_SIZE", &val)?;
        }
        if let Ok(val) = env::var("CW_LOGS_TAGS") {
            config.tags = parse_tags(&val);
        }
        if let Ok(val) = env::var("CW_LOGS_CREATE_GROUP") {
            config.create_group = val.to_lowercase() != "false";
        }
        if let Ok(val) = env::var("CW_LOGS_RPS_LIMIT") {
            config.requests_per_second = match parse_var("CW_LOGS_RPS_LIMIT", &val)? {
                0 => None,
                rps => Some(rps),
            };
        }
        if let Ok(val) = env::var("CW_LOGS_TOKEN_RETRIES") {
            config.token_conflict_retries = parse_var("CW_LOGS_TOKEN_RETRIES", &val)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), HandlerError> {
        if self.group_name.trim().is_empty() {
            return Err(HandlerError::InvalidConfig(
                "log group name cannot be empty".to_string(),
            ));
        }
        if self.stream_name.trim().is_empty() {
            return Err(HandlerError::InvalidConfig(
                "log stream name cannot be empty".to_string(),
            ));
        }
        if self.batch_size == 0 || self.batch_size > constants::MAX_BATCH_COUNT {
            return Err(HandlerError::InvalidConfig(format!(
                "batch size {} must be between 1 and {}",
                self.batch_size,
                constants::MAX_BATCH_COUNT
            )));
        }
        if let Some(days) = self.retention_days {
            if !constants::VALID_RETENTION_DAYS.contains(&days) {
                return Err(HandlerError::InvalidConfig(format!(
                    "retention of {days} days is not supported"
                )));
            }
        }
        if self.requests_per_second == Some(0) {
            return Err(HandlerError::InvalidConfig(
                "requests per second must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, val: &str) -> Result<T, HandlerError> {
    val.trim()
        .parse()
        .map_err(|_| HandlerError::InvalidConfig(format!("{name} has invalid value '{val}'")))
}

/// Parses `key:value` pairs separated by commas or spaces. Pairs without a
/// colon or with an empty key are skipped.
fn parse_tags(val: &str) -> BTreeMap<String, String> {
    val.split(|c: char| c == ',' || c.is_whitespace())
        .filter_map(|pair| pair.split_once(':'))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
