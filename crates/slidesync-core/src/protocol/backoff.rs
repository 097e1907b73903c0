//! Reconnect backoff policy for the sync connection.
//!
//! The policy is deliberately tiny: a current delay that starts at one
//! second, grows by ×1.5 after each failed or closed connection cycle, caps
//! at thirty seconds, and snaps back to one second the moment a connection
//! opens successfully. There is no retry limit — a peer that is down for an
//! hour costs one dial every thirty seconds, and sync resumes by itself when
//! the peer returns.
//!
//! The struct only does arithmetic on [`Duration`]s. Timers, state guards,
//! and the single-pending-reconnect invariant live with the connection
//! manager that owns an instance of this policy.

use std::time::Duration;

/// Delay before the very first reconnect attempt, and the value the policy
/// resets to on every successful open.
pub const INITIAL_DELAY: Duration = Duration::from_millis(1000);

/// Upper bound the growing delay saturates at.
pub const MAX_DELAY: Duration = Duration::from_millis(30_000);

/// Multiplier applied to the delay after each failed cycle.
const GROWTH_FACTOR: f64 = 1.5;

/// Geometrically growing, capped reconnect delay.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use slidesync_core::ReconnectBackoff;
///
/// let mut backoff = ReconnectBackoff::default();
/// assert_eq!(backoff.current(), Duration::from_millis(1000));
/// backoff.advance();
/// assert_eq!(backoff.current(), Duration::from_millis(1500));
/// backoff.reset();
/// assert_eq!(backoff.current(), Duration::from_millis(1000));
/// ```
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl ReconnectBackoff {
    /// Creates a policy with a custom initial delay and cap.
    ///
    /// Production code uses [`ReconnectBackoff::default`]; custom values
    /// exist so tests can reconnect in milliseconds instead of seconds.
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// The delay to wait before the next connection attempt.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Grows the delay by the factor, saturating at the cap, and returns the
    /// new value.
    ///
    /// Called when the pending reconnect timer fires — the delay that grows
    /// is the one for the attempt *after* the one about to start, so the
    /// delay is monotonically non-decreasing within a disconnect episode.
    pub fn advance(&mut self) -> Duration {
        self.current = self.current.mul_f64(GROWTH_FACTOR).min(self.max);
        self.current
    }

    /// Snaps the delay back to the initial value.
    ///
    /// Called exactly once per successful connection open.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new(INITIAL_DELAY, MAX_DELAY)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
