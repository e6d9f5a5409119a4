use crate::workflow::runner::SimulationReport;
use rshieldcore::dashboard_interface::ChartPoint;
use serde::{Deserialize, Serialize};

/// Snapshot served to the dashboard: the day-indexed chart plus the scalar
/// indicators shown in the stat tiles.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardModel {
    pub chart: Vec<ChartPoint>,
    pub rc: f64,
    pub peak_sim_day: f64,
    pub peak_sim_value: f64,
    pub peak_real_day: u32,
    pub peak_real_value: f64,
    pub final_infected: f64,
    pub final_recovered: f64,
    pub status_notes: Vec<String>,
}

impl DashboardModel {
    pub fn from_report(report: &SimulationReport) -> Self {
        Self {
            chart: report.chart.points.clone(),
            rc: report.rc,
            peak_sim_day: report.peak_sim_day,
            peak_sim_value: report.peak_sim_value,
            peak_real_day: report.peak_real_day,
            peak_real_value: report.peak_real_value,
            final_infected: report.final_infected,
            final_recovered: report.final_recovered,
            status_notes: Vec::new(),
        }
    }
}
