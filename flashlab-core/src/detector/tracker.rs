//! Sliding-window flash-crash detector.

use super::{CrashDetector, FlashCrashEvent};
use crate::domain::Side;
use std::collections::VecDeque;

/// Per-side price history bounded by a lookback window and a hard length cap.
#[derive(Debug, Clone, Default)]
struct SideHistory {
    window: VecDeque<(f64, f64)>, // (timestamp, price)
    /// One event per excursion: disarmed after firing, re-armed once the
    /// drop inside the window recedes below the threshold.
    armed: bool,
}

impl SideHistory {
    fn new() -> Self {
        Self {
            window: VecDeque::new(),
            armed: true,
        }
    }
}

/// Default crash detector: fires when the latest price sits at least
/// `drop_threshold` below the highest price seen inside the lookback
/// window.
#[derive(Debug, Clone)]
pub struct PriceTracker {
    lookback_seconds: u64,
    max_history: usize,
    pub drop_threshold: f64,
    up: SideHistory,
    down: SideHistory,
}

impl PriceTracker {
    pub const DEFAULT_MAX_HISTORY: usize = 100;

    pub fn new(lookback_seconds: u64, max_history: usize, drop_threshold: f64) -> Self {
        Self {
            lookback_seconds,
            max_history,
            drop_threshold,
            up: SideHistory::new(),
            down: SideHistory::new(),
        }
    }

    fn history_mut(&mut self, side: Side) -> &mut SideHistory {
        match side {
            Side::Up => &mut self.up,
            Side::Down => &mut self.down,
        }
    }

    fn check_side(history: &mut SideHistory, side: Side, threshold: f64) -> Option<FlashCrashEvent> {
        let (_, latest) = *history.window.back()?;
        let window_high = history
            .window
            .iter()
            .map(|&(_, p)| p)
            .fold(f64::NEG_INFINITY, f64::max);
        let drop = window_high - latest;

        if drop >= threshold {
            if history.armed {
                history.armed = false;
                return Some(FlashCrashEvent {
                    side,
                    reference_price: window_high,
                    crash_price: latest,
                    drop,
                });
            }
        } else {
            history.armed = true;
        }
        None
    }
}

impl CrashDetector for PriceTracker {
    fn record(&mut self, side: Side, price: f64, timestamp: f64) {
        if price <= 0.0 {
            return;
        }
        let lookback = self.lookback_seconds as f64;
        let max_history = self.max_history;
        let history = self.history_mut(side);

        history.window.push_back((timestamp, price));
        while let Some(&(t, _)) = history.window.front() {
            if timestamp - t > lookback || history.window.len() > max_history {
                history.window.pop_front();
            } else {
                break;
            }
        }
    }

    /// Up is scanned before Down so simultaneous crashes resolve
    /// deterministically.
    fn detect_flash_crash(&mut self) -> Option<FlashCrashEvent> {
        let threshold = self.drop_threshold;
        if let Some(event) = Self::check_side(&mut self.up, Side::Up, threshold) {
            return Some(event);
        }
        Self::check_side(&mut self.down, Side::Down, threshold)
    }
}
