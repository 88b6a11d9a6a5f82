use lazy_static::lazy_static;
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::constants::*;
use crate::errors::*;

/// Fixed-window request counter.  Requests over the quota are rejected, never queued.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    state: Mutex<RateLimitWindow>,
}

#[derive(Clone, Copy, Debug)]
pub struct RateLimitWindow {
    pub request_count: u32,
    pub window_start: Instant,
}

lazy_static! {
    static ref SHARED_RATE_LIMITER: Arc<RateLimiter> =
        Arc::new(RateLimiter::new(MAX_REQUESTS_PER_WINDOW, RATE_LIMIT_WINDOW));
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> RateLimiter {
        RateLimiter {
            max_requests,
            window,
            state: Mutex::new(RateLimitWindow {
                request_count: 0,
                window_start: Instant::now(),
            }),
        }
    }

    pub fn shared() -> Arc<RateLimiter> {
        Arc::clone(&SHARED_RATE_LIMITER)
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn check_and_consume(&self) -> Result<()> {
        self.check_and_consume_at(Instant::now())
    }

    pub fn check_and_consume_at(&self, now: Instant) -> Result<()> {
        let mut state = self.lock();
        if now.saturating_duration_since(state.window_start) >= self.window {
            debug!("Rate limit window rolled over after {} requests", state.request_count);
            state.request_count = 0;
            state.window_start = now;
        }
        if state.request_count >= self.max_requests {
            bail!(ErrorKind::RateLimitExceeded(self.max_requests));
        }
        state.request_count += 1;
        Ok(())
    }

    pub fn reset(&self) {
        self.reset_at(Instant::now())
    }

    pub fn reset_at(&self, now: Instant) {
        let mut state = self.lock();
        state.request_count = 0;
        state.window_start = now;
    }

    pub fn window(&self) -> RateLimitWindow {
        *self.lock()
    }

    // Poisoning is ignored; the window is always in a usable state.
    fn lock(&self) -> MutexGuard<'_, RateLimitWindow> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
