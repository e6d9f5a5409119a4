use advisor::client::{AdvisorClient, NarrativeRequest};
use anyhow::Context;
use clap::Parser;
use generator::profile::build_observed_series;
use gui_bridge::bridge::GuiBridge;
use gui_bridge::model::DashboardModel;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::ScenarioConfig;
use workflow::runner::Runner;

mod advisor;
mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Rust-facing R-Shield simulation driver")]
struct Args {
    /// Run a single offline scenario pass and emit a baseline summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a scenario config from YAML
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Replace the observed data with a generated synthetic outbreak
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    #[arg(long, default_value_t = 7)]
    days: u32,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Grid-search the spread parameters against the observed peak first
    #[arg(long, default_value_t = false)]
    fit: bool,
    /// Rescale the suppression/correction controls to the containment threshold first
    #[arg(long, default_value_t = false)]
    solve_rc: bool,
    /// Base URL of the external narrative service
    #[arg(long)]
    advisor_url: Option<String>,
    /// Rumor topic submitted to the narrative service
    #[arg(long)]
    topic: Option<String>,
    /// Date range for a remote trend-series fetch, as YYYY-MM-DD
    #[arg(long)]
    trend_start: Option<String>,
    #[arg(long)]
    trend_end: Option<String>,
    /// Keep the dashboard bridge alive for incoming requests
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut scenario = if let Some(path) = args.scenario {
        ScenarioConfig::load(path)?
    } else {
        ScenarioConfig::default()
    };
    if args.synthetic {
        let series = build_observed_series(args.days, args.seed)?;
        scenario.observed = series.points().to_vec();
    }
    if args.fit {
        let fitted = Runner::new(scenario.clone()).fit()?;
        println!(
            "Fitted -> N {:.0}, beta {}, alpha {}, gamma {}",
            fitted.population, fitted.beta, fitted.alpha, fitted.gamma
        );
        scenario.params = fitted;
    }
    if args.solve_rc {
        let solved = Runner::new(scenario.clone()).solve_rc()?;
        println!(
            "Threshold controls -> suppression {}, correction {}",
            solved.controls.suppression, solved.controls.correction
        );
        scenario.params = solved;
    }

    let runner = Runner::new(scenario.clone());
    let gui_bridge = GuiBridge::new(Arc::new(runner.clone()));

    if args.offline {
        let report = runner.execute()?;

        println!(
            "Offline run -> Rc {:.3}, chart points {}, sim peak {:.0} (day {:.1}), real peak {:.0} (day {})",
            report.rc,
            report.chart.len(),
            report.peak_sim_value,
            report.peak_sim_day,
            report.peak_real_value,
            report.peak_real_day
        );

        let model = DashboardModel::from_report(&report);
        gui_bridge.publish(&model)?;
        gui_bridge.metrics().record_simulation();
        gui_bridge.publish_status("Offline simulation results ready.");

        let summary = format!(
            "rc={:.4} sim_peak={:.0}@{:.2} real_peak={:.0}@{} chart_points={}\n",
            report.rc,
            report.peak_sim_value,
            report.peak_sim_day,
            report.peak_real_value,
            report.peak_real_day,
            report.chart.len()
        );
        let report_path = PathBuf::from("tools/data/offline_simulation.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)?;
        file.write_all(summary.as_bytes())?;

        if let Some(base_url) = args.advisor_url {
            let topic = args.topic.unwrap_or_else(|| "unspecified topic".into());
            let client = AdvisorClient::new(base_url).map_err(anyhow::Error::msg)?;
            let runtime = TokioBuilder::new_current_thread()
                .enable_all()
                .build()
                .context("creating runtime for the advisor calls")?;

            if let (Some(start), Some(end)) = (&args.trend_start, &args.trend_end) {
                let keywords = vec![topic.clone()];
                match runtime.block_on(client.fetch_trend_series(&keywords, start, end, "en")) {
                    Ok(trends) => {
                        println!("Trend series: {} points", trends.series.len());
                        if let Some(last) = trends.series.last() {
                            println!("Latest interest: {} on {}", last.value, last.date);
                        }
                        println!("{}", trends.narrative);
                    }
                    Err(err) => eprintln!("advisor error: {}", err),
                }
            }

            let request = NarrativeRequest {
                topic: &topic,
                params: &scenario.params,
                rc: report.rc,
                peak_sim_value: report.peak_sim_value,
                peak_real_value: report.peak_real_value,
            };
            match runtime.block_on(client.fetch_expert_narrative(&request)) {
                Ok(narrative) => println!("{}", narrative),
                Err(err) => eprintln!("advisor error: {}", err),
            }
        }
    }
    if args.serve {
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
