//! Synthetic market generation with configurable flash-crash scenarios.
//!
//! Produces the same `MarketData` shape as the live fetcher. Each market is
//! a 15-minute window at 1-second fidelity: up/down prices random-walk and
//! sum to roughly 1.0, with an optional injected crash plus gradual
//! recovery.

use crate::domain::{MarketData, PricePoint, Side};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parameters for a synthetic market batch.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub num_markets: usize,
    /// Probability each market contains a flash crash.
    pub crash_probability: f64,
    /// Master seed. Each market derives its own `StdRng` from
    /// `seed + index`, so individual markets reproduce independently.
    pub seed: u64,
    /// Market duration in seconds (900 = the 15-minute windows the
    /// strategy trades).
    pub duration_secs: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            num_markets: 20,
            crash_probability: 0.3,
            seed: 42,
            duration_secs: 900,
        }
    }
}

/// Generate a batch of synthetic markets laid out back-to-back ending at
/// `base_ts + num_markets * duration`.
pub fn generate_synthetic_markets(config: &SyntheticConfig, base_ts: f64) -> Vec<MarketData> {
    let mut master = StdRng::seed_from_u64(config.seed);
    let duration = config.duration_secs as f64;

    (0..config.num_markets)
        .map(|i| {
            let start_ts = base_ts + i as f64 * duration;
            let has_crash = master.gen::<f64>() < config.crash_probability;
            let scenario = if has_crash {
                Some(CrashScenario {
                    side: if master.gen::<bool>() { Side::Up } else { Side::Down },
                    magnitude: master.gen_range(0.20..0.50),
                    at_fraction: master.gen_range(0.15..0.80),
                })
            } else {
                None
            };

            generate_market(
                &format!("synthetic-market-{:03}", i + 1),
                start_ts,
                config.duration_secs,
                scenario,
                config.seed.wrapping_add(i as u64),
            )
        })
        .collect()
}

/// An injected flash crash: which side, how deep, and when in the window.
#[derive(Debug, Clone, Copy)]
pub struct CrashScenario {
    pub side: Side,
    pub magnitude: f64,
    /// Position of the crash within the window, 0..1.
    pub at_fraction: f64,
}

/// Generate one market at 1-second fidelity.
pub fn generate_market(
    slug: &str,
    start_ts: f64,
    duration_secs: u64,
    scenario: Option<CrashScenario>,
    seed: u64,
) -> MarketData {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut up_price: f64 = 0.50 + rng.gen_range(-0.05..0.05);
    let mut up_prices = Vec::with_capacity(duration_secs as usize);
    let mut down_prices = Vec::with_capacity(duration_secs as usize);

    let crash_tick = scenario.map(|s| (duration_secs as f64 * s.at_fraction) as u64);
    let recovery_ticks: u64 = rng.gen_range(15..=60);

    for tick in 0..duration_secs {
        let t = start_ts + tick as f64;

        up_price += gauss(&mut rng, 0.002);

        if let (Some(s), Some(ct)) = (scenario, crash_tick) {
            if tick == ct {
                // A crash on the down side shows up as an up-side spike.
                match s.side {
                    Side::Up => up_price -= s.magnitude,
                    Side::Down => up_price += s.magnitude,
                }
            }
            if tick > ct && tick <= ct + recovery_ticks {
                let recovery = s.magnitude / recovery_ticks as f64 * 0.7;
                match s.side {
                    Side::Up => up_price += recovery,
                    Side::Down => up_price -= recovery,
                }
            }
        }

        up_price = up_price.clamp(0.02, 0.98);
        let down_price = (1.0 - up_price + gauss(&mut rng, 0.005)).clamp(0.02, 0.98);

        up_prices.push(PricePoint { t, p: round4(up_price) });
        down_prices.push(PricePoint { t, p: round4(down_price) });
    }

    MarketData {
        slug: slug.to_string(),
        start_ts,
        end_ts: start_ts + duration_secs as f64,
        up_prices,
        down_prices,
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Zero-mean gaussian via Box-Muller; the walk only needs this one shape,
/// so no distributions crate.
fn gauss<R: Rng>(rng: &mut R, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z * std_dev
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_is_reproducible() {
        let config = SyntheticConfig::default();
        let a = generate_synthetic_markets(&config, 1_700_000_000.0);
        let b = generate_synthetic_markets(&config, 1_700_000_000.0);

        assert_eq!(a.len(), b.len());
        for (ma, mb) in a.iter().zip(&b) {
            assert_eq!(ma.slug, mb.slug);
            assert_eq!(ma.up_prices, mb.up_prices);
            assert_eq!(ma.down_prices, mb.down_prices);
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = generate_synthetic_markets(&SyntheticConfig::default(), 0.0);
        let b = generate_synthetic_markets(
            &SyntheticConfig { seed: 43, ..SyntheticConfig::default() },
            0.0,
        );
        assert_ne!(a[0].up_prices, b[0].up_prices);
    }

    #[test]
    fn prices_stay_in_band() {
        let markets = generate_synthetic_markets(
            &SyntheticConfig { crash_probability: 1.0, ..SyntheticConfig::default() },
            0.0,
        );
        for m in &markets {
            for pt in m.up_prices.iter().chain(&m.down_prices) {
                assert!(pt.p >= 0.02 && pt.p <= 0.98, "price {} out of band", pt.p);
            }
        }
    }

    #[test]
    fn one_second_fidelity_and_window_bounds() {
        let markets = generate_synthetic_markets(
            &SyntheticConfig { num_markets: 2, ..SyntheticConfig::default() },
            1_000.0,
        );
        assert_eq!(markets[0].up_prices.len(), 900);
        assert_eq!(markets[0].start_ts, 1_000.0);
        assert_eq!(markets[0].end_ts, 1_900.0);
        assert_eq!(markets[1].start_ts, 1_900.0);
        for m in &markets {
            assert!(m.validate().is_ok());
        }
    }

    #[test]
    fn injected_crash_reaches_detectable_depth() {
        let market = generate_market(
            "crash",
            0.0,
            900,
            Some(CrashScenario { side: Side::Up, magnitude: 0.40, at_fraction: 0.5 }),
            7,
        );
        let min = market.up_prices.iter().map(|pt| pt.p).fold(f64::INFINITY, f64::min);
        let pre_crash_max = market.up_prices[..440]
            .iter()
            .map(|pt| pt.p)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(pre_crash_max - min >= 0.30, "crash depth {} too shallow", pre_crash_max - min);
    }
}
