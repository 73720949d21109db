// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Fixed-window limiter for outbound append requests.
//!
//! Up to `quota` permits are handed out per one-second window. A caller that
//! finds the window exhausted waits for it to end; the following window then
//! starts with a full quota. Bursts up to the quota are allowed at the start
//! of every window.
//!
//! Windows are not aligned to wall-clock seconds. A window opens at the first
//! request after the previous one ended and lasts one second on tokio's
//! monotonic clock, so clock adjustments never shorten or stretch it. The
//! per-window quota holds the same way it would with aligned windows.

use tokio::time::{sleep_until, Duration, Instant};
use tracing::trace;

const WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct RateLimiter {
    quota: u32,
    remaining: u32,
    window_start: Option<Instant>,
}

impl RateLimiter {
    /// A limiter handing out `quota` permits per second.
    #[must_use]
    pub fn new(quota: u32) -> Self {
        RateLimiter {
            quota,
            remaining: quota,
            window_start: None,
        }
    }

    /// Waits until a request may be issued and consumes one permit.
    pub async fn acquire(&mut self) {
        let now = Instant::now();
        let window_end = match self.window_start {
            Some(start) if now < start + WINDOW => start + WINDOW,
            _ => {
                self.start_window(now);
                now + WINDOW
            }
        };

        if self.remaining == 0 {
            trace!("LOGS | Request quota of {} exhausted, waiting", self.quota);
            sleep_until(window_end).await;
            self.start_window(window_end);
        }
        self.remaining = self.remaining.saturating_sub(1);
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    fn start_window(&mut self, start: Instant) {
        self.window_start = Some(start);
        self.remaining = self.quota;
    }
}
