use std::path::PathBuf;

use chrono::Utc;
use glidepath_engine::flight::FlightModel;
use glidepath_training::{
    table::ControlTable,
    table_search::{TableLocalSearch, TableSearchParams},
};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use super::FlightArg;
use crate::{
    model::{MetricSummary, TableModel},
    util::{Output, read_json_file},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TableSearchArg {
    #[clap(flatten)]
    flight: FlightArg,
    /// Stop once the best trajectory reaches this height
    #[arg(long, default_value_t = 3000.0, allow_negative_numbers = true)]
    target_height: f32,
    /// Stop after this many proposals
    #[arg(long, default_value_t = 100_000)]
    max_iterations: usize,
    /// Frame cap of every evaluation
    #[arg(long, default_value_t = TableSearchParams::default().frames)]
    frames: usize,
    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
    /// Continue from the table of a saved model
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Name stored in the saved model
    #[arg(long, default_value = "glider")]
    name: String,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TableSearchArg) -> anyhow::Result<()> {
    let TableSearchArg {
        flight,
        target_height,
        max_iterations,
        frames,
        seed,
        resume,
        name,
        output,
    } = arg;

    let table = match resume {
        Some(path) => read_json_file::<TableModel, _>("table model", path)?.entries,
        None => ControlTable::new(),
    };
    let mut rng = match seed {
        Some(seed) => Pcg32::seed_from_u64(*seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };

    let params = TableSearchParams {
        launch: flight.launch(),
        frames: *frames,
        death_barrier: flight.death_barrier,
        ..TableSearchParams::default()
    };
    let mut search = TableLocalSearch::new(&FlightModel, params, table);
    tracing::info!(
        entries = search.table().len(),
        max_height = search.best_metric().max_height,
        "starting table search"
    );
    let report = search.run(&mut rng, *target_height, *max_iterations);

    eprintln!("Table search completed.");
    eprintln!("  Iterations: {}", report.iterations);
    eprintln!("  Accepted:   {}", report.accepted);

    let model = TableModel {
        name: name.clone(),
        trained_at: Utc::now(),
        launch: params.launch,
        frames: params.frames,
        death_barrier: params.death_barrier,
        final_metric: MetricSummary::from(report.best_metric),
        entries: search.into_table(),
    };
    Output::save_json(&model, output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Max height: {:.3}", model.final_metric.max_height);
    eprintln!("  Entries: {} buckets", model.entries.len());

    Ok(())
}
