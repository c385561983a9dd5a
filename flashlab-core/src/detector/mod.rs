//! Crash detection contract and the default detector.
//!
//! The engine consumes detectors through the narrow `CrashDetector` seam —
//! `record` observations in, pull `detect_flash_crash` out — so its
//! correctness never depends on detector internals. A fresh detector is
//! created per market through `DetectorFactory`; signal state must not
//! leak across market boundaries.

pub mod tracker;

pub use tracker::PriceTracker;

use crate::domain::Side;
use crate::engine::BacktestConfig;

/// A detected flash crash on one side of a market.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlashCrashEvent {
    /// The side whose price crashed.
    pub side: Side,
    /// Window-high price the drop is measured from.
    pub reference_price: f64,
    /// Latest observed price on the crashed side.
    pub crash_price: f64,
    /// `reference_price - crash_price`.
    pub drop: f64,
}

/// Stateful crash detector fed price observations per side.
///
/// `record` may be called zero, one, or two times per tick (once per side
/// with a valid price). `detect_flash_crash` is pull-based; whether a
/// repeated query without new observations re-triggers belongs to the
/// implementation, not to the engine.
pub trait CrashDetector {
    fn record(&mut self, side: Side, price: f64, timestamp: f64);
    fn detect_flash_crash(&mut self) -> Option<FlashCrashEvent>;
}

/// Creates one detector per market from the run configuration.
pub trait DetectorFactory: Send + Sync {
    fn create(&self, config: &BacktestConfig) -> Box<dyn CrashDetector>;
}

/// Factory for the default `PriceTracker`.
pub struct PriceTrackerFactory;

impl DetectorFactory for PriceTrackerFactory {
    fn create(&self, config: &BacktestConfig) -> Box<dyn CrashDetector> {
        Box::new(PriceTracker::new(
            config.lookback_seconds,
            PriceTracker::DEFAULT_MAX_HISTORY,
            config.drop_threshold,
        ))
    }
}
