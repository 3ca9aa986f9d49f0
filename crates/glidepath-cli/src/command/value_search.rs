use std::path::PathBuf;

use glidepath_engine::flight::FlightModel;
use glidepath_training::policy_iteration::{
    PolicyIterationOptimizer, RoundReport, ValueSearchParams,
};
use serde::Serialize;

use super::FlightArg;
use crate::{model::FlightReport, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ValueSearchArg {
    #[clap(flatten)]
    flight: FlightArg,
    /// Number of coverage-fill and improvement rounds
    #[arg(long, default_value_t = 10)]
    rounds: usize,
    /// Frame cap of every coverage fill and rollout
    #[arg(long, default_value_t = ValueSearchParams::default().frames)]
    frames: usize,
    /// Feature distance beyond which a visited state gets its own entry
    #[arg(long, default_value_t = ValueSearchParams::default().accept_radius)]
    accept_radius: f32,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ValueSearchReport {
    entries: usize,
    rounds: Vec<RoundSummary>,
    rollout: FlightReport,
}

#[derive(Debug, Serialize)]
struct RoundSummary {
    added_entries: usize,
    total_entries: usize,
    passes: usize,
    updates: usize,
    max_height: f32,
}

impl From<RoundReport> for RoundSummary {
    fn from(report: RoundReport) -> Self {
        Self {
            added_entries: report.added_entries,
            total_entries: report.total_entries,
            passes: report.improvement.passes,
            updates: report.improvement.updates,
            max_height: report.max_height,
        }
    }
}

pub(crate) fn run(arg: &ValueSearchArg) -> anyhow::Result<()> {
    let ValueSearchArg {
        flight,
        rounds,
        frames,
        accept_radius,
        output,
    } = arg;

    let env = FlightModel;
    let params = ValueSearchParams {
        accept_radius: *accept_radius,
        frames: *frames,
        death_barrier: flight.death_barrier,
    };
    let launch = flight.launch().launch(&env);

    let mut optimizer = PolicyIterationOptimizer::new(&env, params);
    let round_reports = optimizer.train(&launch, *rounds);
    let rollout = FlightReport::from_heights(optimizer.rollout(&launch));

    eprintln!("Value search completed.");
    eprintln!("  Entries:    {}", optimizer.store().len());
    eprintln!("  Max height: {:.3}", rollout.metric.max_height);
    eprintln!("  Peaks:      {}", rollout.peaks.len());

    let report = ValueSearchReport {
        entries: optimizer.store().len(),
        rounds: round_reports.into_iter().map(RoundSummary::from).collect(),
        rollout,
    };
    Output::save_json(&report, output.clone())?;
    Ok(())
}
