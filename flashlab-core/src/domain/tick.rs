//! Tick merger — two side streams into one causal timeline.

use super::market::{PricePoint, Side};
use serde::{Deserialize, Serialize};

/// One point in the merged timeline. Carries whichever side prices exist
/// at this timestamp; a tick with neither side is never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub t: f64,
    pub up: Option<f64>,
    pub down: Option<f64>,
}

impl Tick {
    pub fn price(&self, side: Side) -> Option<f64> {
        match side {
            Side::Up => self.up,
            Side::Down => self.down,
        }
    }
}

/// Merge two side sequences into one ascending tick timeline.
///
/// The output covers the union of input timestamps. A timestamp present in
/// only one input yields a tick carrying only that side; present in both,
/// both. No interpolation, no gap-filling — absent means absent.
///
/// Duplicate timestamps within one side are deduplicated last-in-wins
/// before the union, so ties in the merged order are impossible. Single
/// sorted-merge pass over two lookup vectors; linear in total input size.
pub fn merge_ticks(up: &[PricePoint], down: &[PricePoint]) -> Vec<Tick> {
    let up_by_t = dedup_by_timestamp(up);
    let down_by_t = dedup_by_timestamp(down);

    let mut merged = Vec::with_capacity(up_by_t.len() + down_by_t.len());
    let (mut i, mut j) = (0, 0);

    while i < up_by_t.len() || j < down_by_t.len() {
        let tu = up_by_t.get(i).map(|pt| pt.t);
        let td = down_by_t.get(j).map(|pt| pt.t);

        match (tu, td) {
            (Some(a), Some(b)) if a == b => {
                merged.push(Tick {
                    t: a,
                    up: Some(up_by_t[i].p),
                    down: Some(down_by_t[j].p),
                });
                i += 1;
                j += 1;
            }
            (Some(a), Some(b)) if a < b => {
                merged.push(Tick {
                    t: a,
                    up: Some(up_by_t[i].p),
                    down: None,
                });
                i += 1;
            }
            (Some(_), Some(b)) => {
                merged.push(Tick {
                    t: b,
                    up: None,
                    down: Some(down_by_t[j].p),
                });
                j += 1;
            }
            (Some(a), None) => {
                merged.push(Tick {
                    t: a,
                    up: Some(up_by_t[i].p),
                    down: None,
                });
                i += 1;
            }
            (None, Some(b)) => {
                merged.push(Tick {
                    t: b,
                    up: None,
                    down: Some(down_by_t[j].p),
                });
                j += 1;
            }
            (None, None) => unreachable!("loop condition guarantees one side remains"),
        }
    }

    merged
}

/// Sort by timestamp and keep the last observation for each timestamp.
fn dedup_by_timestamp(prices: &[PricePoint]) -> Vec<PricePoint> {
    let mut sorted = prices.to_vec();
    sorted.sort_by(|a, b| a.t.partial_cmp(&b.t).expect("price timestamps must not be NaN"));

    let mut out: Vec<PricePoint> = Vec::with_capacity(sorted.len());
    for pt in sorted {
        match out.last_mut() {
            Some(last) if last.t == pt.t => *last = pt,
            _ => out.push(pt),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(pairs: &[(f64, f64)]) -> Vec<PricePoint> {
        pairs.iter().map(|&(t, p)| PricePoint { t, p }).collect()
    }

    #[test]
    fn merge_aligned_timestamps() {
        let up = pts(&[(1.0, 0.50), (2.0, 0.52)]);
        let down = pts(&[(1.0, 0.50), (2.0, 0.48)]);
        let ticks = merge_ticks(&up, &down);

        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0], Tick { t: 1.0, up: Some(0.50), down: Some(0.50) });
        assert_eq!(ticks[1], Tick { t: 2.0, up: Some(0.52), down: Some(0.48) });
    }

    #[test]
    fn merge_interleaved_timestamps() {
        let up = pts(&[(1.0, 0.50), (3.0, 0.55)]);
        let down = pts(&[(2.0, 0.49), (4.0, 0.45)]);
        let ticks = merge_ticks(&up, &down);

        let times: Vec<f64> = ticks.iter().map(|tk| tk.t).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ticks[0].down, None);
        assert_eq!(ticks[1].up, None);
        assert_eq!(ticks[1].down, Some(0.49));
    }

    #[test]
    fn merge_one_empty_side() {
        let up = pts(&[(1.0, 0.50), (2.0, 0.52)]);
        let ticks = merge_ticks(&up, &[]);

        assert_eq!(ticks.len(), 2);
        assert!(ticks.iter().all(|tk| tk.down.is_none()));
    }

    #[test]
    fn merge_both_empty() {
        assert!(merge_ticks(&[], &[]).is_empty());
    }

    #[test]
    fn merge_dedups_within_side_last_wins() {
        let up = pts(&[(1.0, 0.50), (1.0, 0.60)]);
        let ticks = merge_ticks(&up, &[]);

        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].up, Some(0.60));
    }

    #[test]
    fn merge_sorts_unordered_input() {
        let up = pts(&[(3.0, 0.55), (1.0, 0.50)]);
        let ticks = merge_ticks(&up, &[]);

        assert_eq!(ticks[0].t, 1.0);
        assert_eq!(ticks[1].t, 3.0);
    }

    #[test]
    fn no_tick_without_prices() {
        let up = pts(&[(1.0, 0.50)]);
        let down = pts(&[(2.0, 0.49)]);
        for tick in merge_ticks(&up, &down) {
            assert!(tick.up.is_some() || tick.down.is_some());
        }
    }
}
