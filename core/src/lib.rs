//! Propagation-simulation core for the Rust R-Shield platform.
//!
//! The modules cover the delayed compartmental model behind the dashboard:
//! the step-wise integrator, the controlled-reproduction estimator, the
//! threshold solver, and the grid-search fitter, together with the data
//! types exchanged with the dashboard layer.

pub mod dashboard_interface;
pub mod math;
pub mod model;
pub mod prelude;
pub mod telemetry;

pub use prelude::{InterventionControls, SimError, SimResult, SimulationParameters};
