// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Actor wrapper sharing one handler between many producers.
//!
//! ```text
//!    HandlerHandle (Clone) ──┐
//!    HandlerHandle (Clone) ──┼── commands ──> HandlerService ──> CloudWatchHandler
//!    HandlerHandle (Clone) ──┘     mpsc          (one task)
//! ```
//!
//! The service task is the only owner of the handler, so writes and sends
//! stay sequential without locks. Each command carries a oneshot reply and
//! producers see the outcome of the flush their write triggered.
//!
//! # Shutdown
//!
//! The service closes the handler (final flush included) when it receives
//! [`HandlerHandle::close`] or when the last handle is dropped. Await the
//! task returned by `tokio::spawn(service.run())` to make sure that final
//! flush finished before the runtime goes away.

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::error::HandlerError;
use crate::formatter::LogRecord;
use crate::handler::CloudWatchHandler;

type Reply = oneshot::Sender<Result<(), HandlerError>>;

#[derive(Debug)]
pub enum HandlerCommand {
    Write {
        message: String,
        timestamp_millis: i64,
        reply: Reply,
    },
    WriteBatch(Vec<LogRecord>, Reply),
    Flush(Reply),
    Close(Reply),
}

#[derive(Clone, Debug)]
pub struct HandlerHandle {
    tx: mpsc::UnboundedSender<HandlerCommand>,
}

impl HandlerHandle {
    pub async fn write(
        &self,
        message: impl Into<String>,
        timestamp_millis: i64,
    ) -> Result<(), HandlerError> {
        self.request(|reply| HandlerCommand::Write {
            message: message.into(),
            timestamp_millis,
            reply,
        })
        .await
    }

    pub async fn write_batch(&self, records: Vec<LogRecord>) -> Result<(), HandlerError> {
        self.request(|reply| HandlerCommand::WriteBatch(records, reply))
            .await
    }

    pub async fn flush(&self) -> Result<(), HandlerError> {
        self.request(HandlerCommand::Flush).await
    }

    /// Flushes and stops the service. Later commands fail with
    /// [`HandlerError::ServiceUnavailable`].
    pub async fn close(&self) -> Result<(), HandlerError> {
        self.request(HandlerCommand::Close).await
    }

    async fn request(
        &self,
        command: impl FnOnce(Reply) -> HandlerCommand,
    ) -> Result<(), HandlerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(command(reply_tx))
            .map_err(|e| HandlerError::ServiceUnavailable(format!("failed to send command: {e}")))?;
        reply_rx.await.map_err(|e| {
            HandlerError::ServiceUnavailable(format!("failed to receive response: {e}"))
        })?
    }
}

pub struct HandlerService {
    handler: CloudWatchHandler,
    rx: mpsc::UnboundedReceiver<HandlerCommand>,
}

impl HandlerService {
    #[must_use]
    pub fn new(handler: CloudWatchHandler) -> (Self, HandlerHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { handler, rx }, HandlerHandle { tx })
    }

    /// Processes commands until closed or until every handle is dropped,
    /// then closes the handler. Returns the outcome of that final close when
    /// nobody asked for it explicitly.
    pub async fn run(mut self) -> Result<(), HandlerError> {
        debug!("LOGS | Handler service started");

        while let Some(command) = self.rx.recv().await {
            match command {
                HandlerCommand::Write {
                    message,
                    timestamp_millis,
                    reply,
                } => {
                    let result = self.handler.write(&message, timestamp_millis).await;
                    Self::respond(reply, result);
                }
                HandlerCommand::WriteBatch(records, reply) => {
                    let result = self.handler.write_batch(&records).await;
                    Self::respond(reply, result);
                }
                HandlerCommand::Flush(reply) => {
                    let result = self.handler.flush().await;
                    Self::respond(reply, result);
                }
                HandlerCommand::Close(reply) => {
                    let result = self.handler.close().await;
                    Self::respond(reply, result);
                    debug!("LOGS | Handler service shutting down");
                    return Ok(());
                }
            }
        }

        debug!("LOGS | All handles dropped, closing handler");
        self.handler.close().await
    }

    fn respond(reply: Reply, result: Result<(), HandlerError>) {
        if reply.send(result).is_err() {
            debug!("LOGS | Caller went away before receiving the response");
        }
    }
}
