use crate::gui_bridge::model::DashboardModel;
use crate::workflow::config::ScenarioConfig;
use crate::workflow::runner::Runner;
use anyhow::Result;
use rshieldcore::telemetry::MetricsRecorder;
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Debug)]
struct WarpError;

impl warp::reject::Reject for WarpError {}

/// Bridge hosting the dashboard HTTP endpoint: serves the latest
/// simulation snapshot and accepts scenario edits, threshold solves, and
/// fit requests from the UI.
pub struct GuiBridge {
    state: Arc<RwLock<DashboardModel>>,
    metrics: Arc<MetricsRecorder>,
}

impl GuiBridge {
    pub fn new(runner: Arc<Runner>) -> Self {
        let initial = runner
            .execute()
            .map(|report| DashboardModel::from_report(&report))
            .unwrap_or_default();
        let state = Arc::new(RwLock::new(initial));
        let metrics = Arc::new(MetricsRecorder::new());

        let state_for_filter = state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());
        let metrics_for_filter = metrics.clone();
        let metrics_filter = warp::any().map(move || metrics_for_filter.clone());

        let series_route = warp::path("series")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<DashboardModel>>| warp::reply::json(&*state.read().unwrap()));

        let metrics_route = warp::path("metrics")
            .and(warp::get())
            .and(metrics_filter.clone())
            .map(|metrics: Arc<MetricsRecorder>| warp::reply::json(&metrics.snapshot()));

        let simulate_route = warp::path("simulate")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter.clone())
            .and(metrics_filter.clone())
            .and_then(
                |config: ScenarioConfig,
                 state: Arc<RwLock<DashboardModel>>,
                 metrics: Arc<MetricsRecorder>| async move {
                    match Runner::new(config).execute() {
                        Ok(report) => {
                            let model = DashboardModel::from_report(&report);
                            let mut guard = state.write().unwrap();
                            *guard = model;
                            metrics.record_simulation();
                            Ok::<_, warp::Rejection>(warp::reply::with_status(
                                warp::reply::json(&json!({"status": "ok", "rc": report.rc})),
                                StatusCode::OK,
                            ))
                        }
                        Err(err) => {
                            eprintln!("simulate error: {}", err);
                            metrics.record_error();
                            Err(warp::reject::custom(WarpError))
                        }
                    }
                },
            );

        let solve_route = warp::path("solve-rc")
            .and(warp::post())
            .and(warp::body::json())
            .and(metrics_filter.clone())
            .and_then(
                |config: ScenarioConfig, metrics: Arc<MetricsRecorder>| async move {
                    match Runner::new(config).solve_rc() {
                        Ok(params) => Ok::<_, warp::Rejection>(warp::reply::with_status(
                            warp::reply::json(&json!({"status": "ok", "params": params})),
                            StatusCode::OK,
                        )),
                        Err(err) => {
                            eprintln!("solve-rc error: {}", err);
                            metrics.record_error();
                            Err(warp::reject::custom(WarpError))
                        }
                    }
                },
            );

        let fit_route = warp::path("fit")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter.clone())
            .and(metrics_filter)
            .and_then(
                |config: ScenarioConfig,
                 state: Arc<RwLock<DashboardModel>>,
                 metrics: Arc<MetricsRecorder>| async move {
                    let outcome = tokio::task::spawn_blocking(move || {
                        let fitted = Runner::new(config.clone()).fit_blocking()?;
                        let refit = ScenarioConfig {
                            params: fitted.clone(),
                            observed: config.observed,
                        };
                        let report = Runner::new(refit).execute()?;
                        Ok::<_, anyhow::Error>((fitted, report))
                    })
                    .await;

                    match outcome {
                        Ok(Ok((fitted, report))) => {
                            let mut guard = state.write().unwrap();
                            *guard = DashboardModel::from_report(&report);
                            metrics.record_fit_run();
                            Ok::<_, warp::Rejection>(warp::reply::with_status(
                                warp::reply::json(&json!({"status": "ok", "params": fitted})),
                                StatusCode::OK,
                            ))
                        }
                        Ok(Err(err)) => {
                            eprintln!("fit error: {}", err);
                            metrics.record_error();
                            Err(warp::reject::custom(WarpError))
                        }
                        Err(err) => {
                            eprintln!("fit worker error: {}", err);
                            metrics.record_error();
                            Err(warp::reject::custom(WarpError))
                        }
                    }
                },
            );

        thread::spawn(move || {
            let routes = series_route
                .or(metrics_route)
                .or(simulate_route)
                .or(solve_route)
                .or(fit_route);
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build runtime");
            runtime.block_on(async move {
                warp::serve(routes).run(gui_bind_address()).await;
            });
        });

        Self { state, metrics }
    }

    pub fn publish(&self, model: &DashboardModel) -> Result<()> {
        let mut guard = self.state.write().unwrap();
        *guard = model.clone();
        println!(
            "[GUI] chart points: {}, Rc: {:.3}, sim peak: {:.0}",
            guard.chart.len(),
            guard.rc,
            guard.peak_sim_value
        );
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        self.metrics.clone()
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> DashboardModel {
        self.state.read().unwrap().clone()
    }
}
