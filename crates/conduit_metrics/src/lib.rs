//! Conduit Metrics - boundary call accounting
//!
//! Counts round trips per native entry point and times script ticks.
//! Everything here compiles to no-op stubs unless the `metrics` feature is
//! enabled.
//!
//! # Usage
//!
//! ```ignore
//! use conduit_metrics::CallCounter;
//!
//! let mut calls = CallCounter::new();
//! calls.record("transform_get");
//! assert_eq!(calls.get("transform_get"), 1);
//! ```

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod tick_timer;

#[cfg(feature = "metrics")]
pub use counter::CallCounter;
#[cfg(feature = "metrics")]
pub use tick_timer::TickTimer;

/// Whether this build collects metrics.
pub const ENABLED: bool = cfg!(feature = "metrics");

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default, Clone)]
pub struct CallCounter;

#[cfg(not(feature = "metrics"))]
impl CallCounter {
    pub fn new() -> Self { Self }
    pub fn record(&mut self, _entry: &'static str) {}
    pub fn get(&self, _entry: &str) -> usize { 0 }
    pub fn total(&self) -> usize { 0 }
    pub fn reset(&mut self) {}
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        std::iter::empty()
    }
}

#[cfg(not(feature = "metrics"))]
pub struct TickTimer;

#[cfg(not(feature = "metrics"))]
impl TickTimer {
    pub fn new(_window: usize) -> Self { Self }
    pub fn begin(&mut self) {}
    pub fn end(&mut self) {}
    pub fn push(&mut self, _sample: std::time::Duration) {}
    pub fn ticks(&self) -> usize { 0 }
    pub fn average(&self) -> std::time::Duration { std::time::Duration::ZERO }
    pub fn average_ms(&self) -> f64 { 0.0 }
    pub fn range(&self) -> (std::time::Duration, std::time::Duration) {
        (std::time::Duration::ZERO, std::time::Duration::ZERO)
    }
}
