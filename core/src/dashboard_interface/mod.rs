pub mod chart;
pub mod observed;

pub use chart::{ChartPoint, ChartSeries};
pub use observed::{ObservedPoint, ObservedSeries};
