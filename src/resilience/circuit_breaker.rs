//! Circuit breaker for a single dependency edge.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls go straight to the fallback
//! - Half-Open: one trial call probes whether the dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures >= failure_threshold
//! Open → Half-Open: first call after cool_down has elapsed
//! Half-Open → Closed: trial call succeeds
//! Half-Open → Open: trial call fails (cool-down restarts)
//! ```
//!
//! # Concurrency
//! All state lives behind one mutex that is never held across an await.
//! Every transition bumps a generation counter; outcomes of calls admitted
//! under an older generation are counted in the stats but cannot drive a
//! transition. At most one trial permit exists while Half-Open, and a trial
//! whose future is dropped counts as a failed trial. A Closed call whose
//! future is dropped before it finishes is recorded as cancelled and extends
//! the failure streak like a timeout.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwap;
use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;

use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;

/// Circuit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }

    fn gauge_value(&self) -> f64 {
        match self {
            CircuitState::Closed => 0.0,
            CircuitState::HalfOpen => 1.0,
            CircuitState::Open => 2.0,
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tuning for one breaker. Supplied from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerSettings {
    /// Consecutive failures that open the circuit. Never below 1.
    pub failure_threshold: u32,
    /// Time spent Open before a trial call is allowed.
    pub cool_down: Duration,
    /// Deadline applied by [`CircuitBreaker::execute`].
    pub call_timeout: Duration,
}

impl BreakerSettings {
    pub fn new(failure_threshold: u32, cool_down: Duration, call_timeout: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            cool_down,
            call_timeout,
        }
    }
}

/// Why a protected call did not produce a value. Handed to the fallback.
#[derive(Debug, Error)]
pub enum CallFailure<E> {
    /// The breaker was open; the operation was never invoked.
    #[error("circuit breaker '{0}' is open")]
    ShortCircuited(String),

    /// The operation did not finish within the call deadline.
    #[error("call timed out after {0:?}")]
    TimedOut(Duration),

    /// The operation returned an error.
    #[error("call failed: {0}")]
    Failed(E),
}

impl<E> CallFailure<E> {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CallFailure::ShortCircuited(_) => "short_circuit",
            CallFailure::TimedOut(_) => "timeout",
            CallFailure::Failed(_) => "failure",
        }
    }
}

/// Classifies operation errors for failure accounting.
///
/// Errors that return `false` still route to the fallback but count as a
/// healthy response from the dependency.
pub trait RemoteFailure {
    fn is_dependency_failure(&self) -> bool {
        true
    }
}

/// Cumulative counters, never reset by transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerStats {
    pub successes: u64,
    pub failures: u64,
    pub timeouts: u64,
    pub cancelled: u64,
    pub short_circuits: u64,
}

/// Point-in-time view of a breaker for the admin API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub failure_threshold: u32,
    pub cool_down_ms: u64,
    pub call_timeout_ms: u64,
    pub open_for_ms: Option<u64>,
    pub trial_in_flight: bool,
    pub stats: BreakerStats,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
    generation: u64,
    stats: BreakerStats,
}

impl BreakerState {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            trial_in_flight: false,
            generation: 0,
            stats: BreakerStats::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
    Timeout,
    Cancelled,
}

/// Guards calls to one named dependency.
pub struct CircuitBreaker {
    name: String,
    settings: ArcSwap<BreakerSettings>,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, settings: BreakerSettings) -> Self {
        let breaker = Self {
            name: name.into(),
            settings: ArcSwap::from_pointee(settings),
            state: Mutex::new(BreakerState::new()),
        };
        metrics::record_breaker_state(&breaker.name, CircuitState::Closed.gauge_value());
        breaker
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> Arc<BreakerSettings> {
        self.settings.load_full()
    }

    /// Swap in new tuning without touching the current state.
    pub fn reconfigure(&self, settings: BreakerSettings) {
        tracing::info!(
            breaker = %self.name,
            failure_threshold = settings.failure_threshold,
            cool_down_ms = settings.cool_down.as_millis() as u64,
            call_timeout_ms = settings.call_timeout.as_millis() as u64,
            "Circuit breaker reconfigured"
        );
        self.settings.store(Arc::new(settings));
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let settings = self.settings();
        let s = self.lock();
        BreakerSnapshot {
            name: self.name.clone(),
            state: s.state,
            consecutive_failures: s.consecutive_failures,
            failure_threshold: settings.failure_threshold,
            cool_down_ms: settings.cool_down.as_millis() as u64,
            call_timeout_ms: settings.call_timeout.as_millis() as u64,
            open_for_ms: match s.state {
                CircuitState::Closed => None,
                _ => s.opened_at.map(|t| t.elapsed().as_millis() as u64),
            },
            trial_in_flight: s.trial_in_flight,
            stats: s.stats,
        }
    }

    /// Manually close the circuit and clear the failure streak.
    pub fn reset(&self) {
        let mut s = self.lock();
        tracing::info!(breaker = %self.name, "Circuit breaker manually reset");
        if s.state != CircuitState::Closed {
            self.transition(&mut s, CircuitState::Closed);
        }
        s.consecutive_failures = 0;
    }

    /// Run `operation` under the configured call timeout.
    ///
    /// See [`CircuitBreaker::execute_with_timeout`].
    pub async fn execute<T, E, Op, Fut, Fb, FE>(&self, operation: Op, fallback: Fb) -> Result<T, FE>
    where
        Op: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RemoteFailure + fmt::Display,
        Fb: FnOnce(CallFailure<E>) -> Result<T, FE>,
    {
        let limit = self.settings().call_timeout;
        self.execute_with_timeout(limit, operation, fallback).await
    }

    /// Run `operation` if the circuit admits it, otherwise use `fallback`.
    ///
    /// Remote errors and timeouts are absorbed: they update the breaker and
    /// the fallback's result is returned. The only error this method yields
    /// is one produced by the fallback itself. The operation is invoked at
    /// most once.
    pub async fn execute_with_timeout<T, E, Op, Fut, Fb, FE>(
        &self,
        limit: Duration,
        operation: Op,
        fallback: Fb,
    ) -> Result<T, FE>
    where
        Op: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RemoteFailure + fmt::Display,
        Fb: FnOnce(CallFailure<E>) -> Result<T, FE>,
    {
        let Some(mut permit) = self.admit() else {
            tracing::debug!(breaker = %self.name, "Circuit open, short-circuiting call");
            metrics::record_short_circuit(&self.name);
            metrics::record_fallback(&self.name, "short_circuit");
            return fallback(CallFailure::ShortCircuited(self.name.clone()));
        };

        let failure = match with_deadline(limit, operation()).await {
            Ok(Ok(value)) => {
                permit.settle(Outcome::Success);
                metrics::record_breaker_call(&self.name, "success");
                return Ok(value);
            }
            Ok(Err(err)) => {
                if err.is_dependency_failure() {
                    permit.settle(Outcome::Failure);
                    metrics::record_breaker_call(&self.name, "failure");
                } else {
                    permit.settle(Outcome::Success);
                    metrics::record_breaker_call(&self.name, "rejected");
                }
                CallFailure::Failed(err)
            }
            Err(_) => {
                permit.settle(Outcome::Timeout);
                metrics::record_breaker_call(&self.name, "timeout");
                CallFailure::TimedOut(limit)
            }
        };

        tracing::warn!(
            breaker = %self.name,
            cause = failure.kind(),
            error = %failure,
            "Protected call failed, using fallback"
        );
        metrics::record_fallback(&self.name, failure.kind());
        fallback(failure)
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decide whether a call may proceed. `None` means short-circuit.
    fn admit(&self) -> Option<CallPermit<'_>> {
        let cool_down = self.settings.load().cool_down;
        let mut s = self.lock();

        match s.state {
            CircuitState::Closed => Some(CallPermit::new(self, s.generation, false)),
            CircuitState::Open => {
                let cooled = s
                    .opened_at
                    .map(|opened| opened.elapsed() >= cool_down)
                    .unwrap_or(true);
                if cooled {
                    self.transition(&mut s, CircuitState::HalfOpen);
                    s.trial_in_flight = true;
                    Some(CallPermit::new(self, s.generation, true))
                } else {
                    s.stats.short_circuits += 1;
                    None
                }
            }
            CircuitState::HalfOpen => {
                if s.trial_in_flight {
                    s.stats.short_circuits += 1;
                    None
                } else {
                    s.trial_in_flight = true;
                    Some(CallPermit::new(self, s.generation, true))
                }
            }
        }
    }

    fn record(&self, generation: u64, trial: bool, outcome: Outcome) {
        let threshold = self.settings.load().failure_threshold;
        let mut s = self.lock();

        match outcome {
            Outcome::Success => s.stats.successes += 1,
            Outcome::Failure => s.stats.failures += 1,
            Outcome::Timeout => s.stats.timeouts += 1,
            Outcome::Cancelled => s.stats.cancelled += 1,
        }

        if trial && s.generation == generation {
            s.trial_in_flight = false;
        }
        if s.generation != generation {
            tracing::trace!(breaker = %self.name, "Ignoring outcome from an earlier circuit state");
            return;
        }

        match (s.state, outcome) {
            (CircuitState::Closed, Outcome::Success) => {
                s.consecutive_failures = 0;
            }
            (CircuitState::Closed, _) => {
                s.consecutive_failures += 1;
                if s.consecutive_failures >= threshold {
                    tracing::warn!(
                        breaker = %self.name,
                        failures = s.consecutive_failures,
                        "Circuit breaker opening"
                    );
                    self.transition(&mut s, CircuitState::Open);
                }
            }
            (CircuitState::HalfOpen, Outcome::Success) => {
                tracing::info!(breaker = %self.name, "Trial call succeeded, closing circuit");
                self.transition(&mut s, CircuitState::Closed);
            }
            (CircuitState::HalfOpen, _) => {
                tracing::warn!(breaker = %self.name, "Trial call failed, reopening circuit");
                self.transition(&mut s, CircuitState::Open);
            }
            (CircuitState::Open, _) => {}
        }
    }

    /// Trial permit dropped before its call finished.
    fn abandon_trial(&self, generation: u64) {
        let mut s = self.lock();
        if s.generation != generation || s.state != CircuitState::HalfOpen {
            return;
        }
        tracing::warn!(breaker = %self.name, "Trial call abandoned, reopening circuit");
        self.transition(&mut s, CircuitState::Open);
    }

    fn transition(&self, s: &mut BreakerState, to: CircuitState) {
        let from = s.state;
        s.state = to;
        s.generation += 1;
        s.trial_in_flight = false;

        match to {
            CircuitState::Closed => {
                s.consecutive_failures = 0;
                s.opened_at = None;
            }
            CircuitState::Open => {
                s.opened_at = Some(Instant::now());
            }
            CircuitState::HalfOpen => {
                tracing::info!(breaker = %self.name, "Cool-down elapsed, circuit half-open");
            }
        }

        tracing::debug!(breaker = %self.name, from = %from, to = %to, "Circuit state changed");
        metrics::record_breaker_transition(&self.name, to.as_str());
        metrics::record_breaker_state(&self.name, to.gauge_value());
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}

/// Admission ticket for one call. Reports the outcome exactly once.
struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    trial: bool,
    settled: bool,
}

impl<'a> CallPermit<'a> {
    fn new(breaker: &'a CircuitBreaker, generation: u64, trial: bool) -> Self {
        Self {
            breaker,
            generation,
            trial,
            settled: false,
        }
    }

    fn settle(&mut self, outcome: Outcome) {
        self.settled = true;
        self.breaker.record(self.generation, self.trial, outcome);
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        metrics::record_breaker_call(&self.breaker.name, "cancelled");
        if self.trial {
            self.breaker.abandon_trial(self.generation);
        } else {
            tracing::debug!(breaker = %self.breaker.name, "Protected call cancelled before completion");
            self.breaker.record(self.generation, false, Outcome::Cancelled);
        }
    }
}
