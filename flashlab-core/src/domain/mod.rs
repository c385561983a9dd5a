//! Domain types: markets, ticks, positions, trades.

pub mod market;
pub mod position;
pub mod tick;
pub mod trade;

pub use market::{MarketData, PricePoint, Side};
pub use position::OpenPosition;
pub use tick::{merge_ticks, Tick};
pub use trade::{ExitReason, Trade};
