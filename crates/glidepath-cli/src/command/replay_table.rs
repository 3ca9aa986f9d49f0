use std::path::PathBuf;

use glidepath_engine::flight::FlightModel;
use glidepath_training::{
    table::ControlTable,
    table_search::{TableLocalSearch, TableSearchParams},
};

use crate::{
    model::{FlightReport, TableModel},
    util::{Output, read_json_file},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayTableArg {
    /// Saved table model
    model: PathBuf,
    /// Override the frame cap stored in the model
    #[arg(long)]
    frames: Option<usize>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ReplayTableArg) -> anyhow::Result<()> {
    let ReplayTableArg {
        model,
        frames,
        output,
    } = arg;

    let model: TableModel = read_json_file("table model", model)?;
    let params = TableSearchParams {
        launch: model.launch,
        frames: frames.unwrap_or(model.frames),
        death_barrier: model.death_barrier,
        ..TableSearchParams::default()
    };
    let search = TableLocalSearch::new(&FlightModel, params, model.entries);
    let rollout = search.evaluate(search.table(), &ControlTable::new());
    let report = FlightReport::from_heights(rollout.heights);

    eprintln!("Replayed {} ({} buckets)", model.name, search.table().len());
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Max height: {:.3}", report.metric.max_height);
    eprintln!("  Frames:     {}", report.metric.length);

    Output::save_json(&report, output.clone())?;
    Ok(())
}
