// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Producer-facing handler.
//!
//! Every write lands in the [`Buffer`]; a write that would push the buffer
//! past a limit first sends what is buffered. Flushing hands the events to
//! the [`BatchSender`] and empties the buffer whatever the outcome, so a
//! failed batch is reported once and never replayed.
//!
//! # Delivery guarantees
//!
//! At most once from the handler's side: an error returned by `write`,
//! `flush` or `close` means the batch it concerns is gone. Token conflict
//! recovery may also resubmit a batch the service had in fact accepted.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::buffer::Buffer;
use crate::client::LogsClient;
use crate::config::HandlerConfig;
use crate::error::HandlerError;
use crate::event::LogEvent;
use crate::formatter::{Formatter, LineFormatter, LogRecord};
use crate::sender::BatchSender;
use crate::stream::StreamState;

pub struct CloudWatchHandler {
    buffer: Buffer,
    sender: BatchSender,
    formatter: Box<dyn Formatter>,
    closed: bool,
}

impl CloudWatchHandler {
    /// Builds a handler after validating `config`. No remote call is made
    /// before the first batch is sent.
    pub fn new(client: Arc<dyn LogsClient>, config: HandlerConfig) -> Result<Self, HandlerError> {
        config.validate()?;
        Ok(CloudWatchHandler {
            buffer: Buffer::new(config.batch_size),
            sender: BatchSender::new(client, &config),
            formatter: Box::new(LineFormatter),
            closed: false,
        })
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    #[must_use]
    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn stream_state(&self) -> &StreamState {
        self.sender.state()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Buffers an already formatted message, splitting it when it exceeds
    /// the per-event size limit.
    pub async fn write(
        &mut self,
        message: &str,
        timestamp_millis: i64,
    ) -> Result<(), HandlerError> {
        if self.closed {
            return Err(HandlerError::Closed);
        }
        let mut result = Ok(());
        for event in LogEvent::split(message, timestamp_millis) {
            if self.buffer.needs_flush_before(&event) {
                // keep going: the remaining segments belong to a fresh batch
                if let Err(e) = self.flush_buffer().await {
                    result = result.and(Err(e));
                }
            }
            self.buffer.push(event);
        }
        result
    }

    /// Formats `record` and writes it with the record's own timestamp.
    pub async fn handle(&mut self, record: &LogRecord) -> Result<(), HandlerError> {
        let message = self.formatter.format(record);
        self.write(&message, record.timestamp_millis).await
    }

    /// Writes every record in order. Each record is handled on its own: a
    /// failing write does not stop the remaining records, and the first error
    /// is returned.
    pub async fn write_batch(&mut self, records: &[LogRecord]) -> Result<(), HandlerError> {
        if self.closed {
            return Err(HandlerError::Closed);
        }
        let mut result = Ok(());
        for record in records {
            if let Err(e) = self.handle(record).await {
                result = result.and(Err(e));
            }
        }
        result
    }

    /// Sends whatever is buffered. A no-op on an empty buffer.
    pub async fn flush(&mut self) -> Result<(), HandlerError> {
        if self.closed {
            return Err(HandlerError::Closed);
        }
        self.flush_buffer().await
    }

    /// Sends the remaining events and refuses further writes.
    ///
    /// Only the first call does any work.
    pub async fn close(&mut self) -> Result<(), HandlerError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!("LOGS | Closing handler with {} buffered events", self.buffer.len());
        self.flush_buffer().await
    }

    async fn flush_buffer(&mut self) -> Result<(), HandlerError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let events = self.buffer.take();
        self.sender.send(events).await?;
        Ok(())
    }
}

impl Drop for CloudWatchHandler {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            warn!(
                "LOGS | Handler dropped with {} unsent events, close() was not awaited",
                self.buffer.len()
            );
        }
    }
}
