pub mod quadratic;
pub mod stats;

pub use quadratic::{QuadraticHelper, QuadraticSolution};
pub use stats::SeriesStats;
