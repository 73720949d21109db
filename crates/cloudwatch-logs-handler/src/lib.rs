// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Log shipping to an append-only remote log stream.
//!
//! The handler accepts formatted log records, buffers them under the remote
//! service's per-request limits and delivers them as chronologically ordered
//! batches, guarded by the stream's sequencing-token protocol.
//!
//! ```text
//!   producer ──> CloudWatchHandler::write
//!                      │
//!                      v
//!                ┌───────────┐  threshold crossed / flush / close
//!                │  Buffer   │ ─────────────────────────────────┐
//!                └───────────┘                                  │
//!                                                               v
//!   ┌──────────────────┐  first send / token   ┌─────────────────────────┐
//!   │ StreamInitializer│ <──── refresh ─────── │       BatchSender       │
//!   └──────────────────┘                       │ sort ─> throttle ─> put │
//!                                              └────────────┬────────────┘
//!                                                           v
//!                                                   dyn LogsClient
//! ```
//!
//! # Components
//!
//! - **[`handler`]**: producer-facing API composing everything below
//! - **[`buffer`]**: byte/count/time-span bounded accumulation of events
//! - **[`sender`]**: ordering, token attachment and conflict recovery
//! - **[`stream`]**: group/stream creation and token discovery
//! - **[`throttle`]**: fixed one-second window request limiter
//! - **[`service`]**: actor wrapper for multiple producers
//! - **[`client`]**: the remote service contract the caller implements
//!
//! A handler does no locking of its own; share it through [`service::HandlerHandle`]
//! when more than one task produces logs.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod buffer;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod formatter;
pub mod handler;
pub mod sender;
pub mod service;
pub mod stream;
pub mod throttle;

pub use client::LogsClient;
pub use config::HandlerConfig;
pub use error::{ClientError, HandlerError};
pub use formatter::{Formatter, Level, LineFormatter, LogRecord};
pub use handler::CloudWatchHandler;
pub use service::{HandlerHandle, HandlerService};
