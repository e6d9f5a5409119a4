pub mod fitting;
pub mod integrator;
pub mod reproduction;
pub mod threshold;

pub use fitting::{auto_fit, CancelToken, FitJob, FitProgress};
pub use integrator::{integrate, SimulationState};
pub use reproduction::estimate_rc;
pub use threshold::solve_for_rc_one;
