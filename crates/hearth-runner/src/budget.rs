//! Shared remote-call budget.
//!
//! Provides a thread-safe [`RateBudget`] that meters how many remote
//! reasoning calls may be made in the current window. Both the decision and
//! the dialogue clients draw from the same pool. Safe to share via
//! `Arc<RateBudget>`.
//!
//! Consumption is a check-and-decrement under a single lock, performed by
//! the caller before it dispatches a remote call. Concurrent dispatchers can
//! therefore never spend more than the ceiling, no matter how many calls are
//! in flight.

use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use tracing::info;

use crate::config::BudgetConfig;

/// Thread-safe remote-call budget with a fixed refill window.
///
/// # Usage
///
/// ```text
/// let budget = RateBudget::new(BudgetConfig { max_calls: 2, window: BUDGET_WINDOW });
/// assert!(budget.try_consume());
/// assert!(budget.try_consume());
/// assert!(!budget.try_consume());
/// budget.tick(BUDGET_WINDOW);
/// assert_eq!(budget.remaining(), 2);
/// ```
pub struct RateBudget {
    /// Calls allowed per window.
    max_calls: u32,
    /// Window length.
    window: Duration,
    /// Mutable state protected by a mutex.
    inner: Mutex<RateBudgetInner>,
}

/// Mutable window state held inside the mutex.
#[derive(Debug, Default)]
struct RateBudgetInner {
    /// Calls still allowed in this window.
    remaining: u32,
    /// Time accumulated in this window.
    elapsed: Duration,
    /// Successful reservations this window.
    consumed: u64,
    /// Rejected reservations this window.
    denied: u64,
    /// Windows completed since start.
    windows_completed: u64,
}

/// Snapshot of budget state returned by [`RateBudget::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetSnapshot {
    /// Calls still allowed in this window.
    pub remaining: u32,
    /// Configured ceiling.
    pub max_calls: u32,
    /// Time accumulated in this window.
    pub elapsed: Duration,
    /// Successful reservations this window.
    pub consumed: u64,
    /// Rejected reservations this window.
    pub denied: u64,
    /// Windows completed since start.
    pub windows_completed: u64,
}

impl RateBudget {
    /// Create a full budget.
    pub const fn new(config: BudgetConfig) -> Self {
        Self {
            max_calls: config.max_calls,
            window: config.window,
            inner: Mutex::new(RateBudgetInner {
                remaining: config.max_calls,
                elapsed: Duration::ZERO,
                consumed: 0,
                denied: 0,
                windows_completed: 0,
            }),
        }
    }

    /// Calls still allowed in the current window.
    ///
    /// Returns 0 if the mutex is poisoned.
    pub fn remaining(&self) -> u32 {
        self.inner.lock().map_or(0, |inner| inner.remaining)
    }

    /// Configured ceiling.
    pub const fn max_calls(&self) -> u32 {
        self.max_calls
    }

    /// Reserve one call.
    ///
    /// Returns `true` and decrements when budget remains; otherwise returns
    /// `false` and leaves the count at zero. A poisoned mutex denies.
    pub fn try_consume(&self) -> bool {
        let Ok(mut inner) = self.inner.lock() else {
            return false;
        };

        if let Some(left) = inner.remaining.checked_sub(1) {
            inner.remaining = left;
            inner.consumed = inner.consumed.saturating_add(1);
            true
        } else {
            inner.denied = inner.denied.saturating_add(1);
            false
        }
    }

    /// Accumulate elapsed wall-clock time.
    ///
    /// Once the accumulated time reaches the window length, the allowance
    /// refills to the ceiling and the accumulator restarts from zero.
    pub fn tick(&self, elapsed: Duration) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };

        inner.elapsed = inner.elapsed.saturating_add(elapsed);
        if inner.elapsed < self.window {
            return;
        }

        let consumed = inner.consumed;
        let denied = inner.denied;
        inner.remaining = self.max_calls;
        inner.elapsed = Duration::ZERO;
        inner.consumed = 0;
        inner.denied = 0;
        inner.windows_completed = inner.windows_completed.saturating_add(1);
        drop(inner);

        info!(
            max_calls = self.max_calls,
            consumed = consumed,
            denied = denied,
            "rate budget window elapsed, allowance refilled"
        );
    }

    /// Return a snapshot of the current window.
    ///
    /// Returns an empty snapshot if the mutex is poisoned.
    pub fn snapshot(&self) -> BudgetSnapshot {
        let Ok(inner) = self.inner.lock() else {
            return BudgetSnapshot {
                remaining: 0,
                max_calls: self.max_calls,
                elapsed: Duration::ZERO,
                consumed: 0,
                denied: 0,
                windows_completed: 0,
            };
        };

        BudgetSnapshot {
            remaining: inner.remaining,
            max_calls: self.max_calls,
            elapsed: inner.elapsed,
            consumed: inner.consumed,
            denied: inner.denied,
            windows_completed: inner.windows_completed,
        }
    }
}

impl fmt::Display for BudgetSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rate budget: {}/{} calls left | {} used, {} denied this window | \
             {}s into window, {} windows completed",
            self.remaining,
            self.max_calls,
            self.consumed,
            self.denied,
            self.elapsed.as_secs(),
            self.windows_completed,
        )
    }
}
