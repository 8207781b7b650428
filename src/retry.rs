//! Backoff and interruptible waiting for polling loops

use rand::Rng;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::error::{AtlanError, Result};

/// Retry ceiling for flows that wait on asynchronous server-side work
pub const MAX_ASYNC_RETRIES: u32 = 20;

/// Default ceiling for ordinary network retries
pub const MAX_NETWORK_RETRIES: u32 = 3;

/// Exponential backoff with additive jitter
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Upper bound on the exponential part
    pub max_delay: Duration,

    /// Growth factor per attempt
    pub multiplier: f64,

    /// Upper bound on the random amount added to each delay
    pub jitter: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: Duration::from_millis(250),
        }
    }
}

impl Backoff {
    /// Backoff with no delay at all
    pub fn none() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
            jitter: Duration::ZERO,
        }
    }

    /// Deterministic part of the delay; never decreases as `attempt` grows
    pub fn base_duration(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay = self.initial_delay.as_secs_f64() * self.multiplier.max(1.0).powi(exponent);
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }

    /// How long to wait before retry number `attempt` (0-based)
    pub fn wait_duration(&self, attempt: u32) -> Duration {
        let base = self.base_duration(attempt);
        if self.jitter.is_zero() {
            return base;
        }
        let jitter_ms = self.jitter.as_millis() as u64;
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

/// Something that can wait
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`, failing with [`AtlanError::Interrupted`] if the wait
    /// is cancelled
    fn sleep(&self, duration: Duration) -> Result<()>;
}

/// Shared flag used to abort in-progress waits
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    state: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interrupt the wait in progress, or the next one if none is running.
    /// The flag is consumed by the wait it interrupts.
    pub fn cancel(&self) {
        let (lock, cvar) = &*self.state;
        let mut cancelled = lock.lock().unwrap_or_else(|e| e.into_inner());
        *cancelled = true;
        cvar.notify_all();
    }

    /// Drop a cancellation nobody has observed yet
    pub fn reset(&self) {
        let (lock, _) = &*self.state;
        *lock.lock().unwrap_or_else(|e| e.into_inner()) = false;
    }

    pub fn is_cancelled(&self) -> bool {
        let (lock, _) = &*self.state;
        *lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Thread sleeper that wakes early when its [`CancelHandle`] fires
#[derive(Debug, Clone, Default)]
pub struct InterruptibleSleeper {
    handle: CancelHandle,
}

impl InterruptibleSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handle(handle: CancelHandle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> CancelHandle {
        self.handle.clone()
    }
}

impl Sleeper for InterruptibleSleeper {
    fn sleep(&self, duration: Duration) -> Result<()> {
        let (lock, cvar) = &*self.handle.state;
        let guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        let (mut cancelled, _) = cvar
            .wait_timeout_while(guard, duration, |cancelled| !*cancelled)
            .unwrap_or_else(|e| e.into_inner());
        if *cancelled {
            *cancelled = false;
            return Err(AtlanError::Interrupted);
        }
        Ok(())
    }
}

/// Retry ceiling plus the backoff and sleeper used between rounds
#[derive(Clone)]
pub struct Poller {
    backoff: Backoff,
    sleeper: Arc<dyn Sleeper>,
    max_retries: u32,
}

impl Poller {
    pub fn new(backoff: Backoff, max_retries: u32, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            backoff,
            sleeper,
            max_retries,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Same backoff and sleeper with a different ceiling
    pub fn with_max_retries(&self, max_retries: u32) -> Self {
        Self {
            max_retries,
            ..self.clone()
        }
    }

    /// Wait out the backoff for `attempt`
    pub fn pause(&self, attempt: u32) -> Result<()> {
        let wait = self.backoff.wait_duration(attempt);
        tracing::debug!(attempt, wait_ms = wait.as_millis() as u64, "backing off");
        self.sleeper.sleep(wait)
    }
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("backoff", &self.backoff)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}
