use clap::{Parser, Subcommand};
use glidepath_engine::{DEFAULT_DEATH_BARRIER, LaunchParams};

use self::{
    replay_table::ReplayTableArg, table_search::TableSearchArg, value_search::ValueSearchArg,
};

mod replay_table;
mod table_search;
mod value_search;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Learn a nearest-neighbor value function and fly it greedily
    ValueSearch(#[clap(flatten)] ValueSearchArg),
    /// Hill-climb a bucket-indexed control table
    TableSearch(#[clap(flatten)] TableSearchArg),
    /// Fly a saved control table and report the trajectory
    ReplayTable(#[clap(flatten)] ReplayTableArg),
}

/// Launch conditions and failure threshold shared by every subcommand.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct FlightArg {
    /// Forward velocity at launch
    #[arg(long, default_value_t = LaunchParams::default().forward_velocity)]
    forward_velocity: f32,
    /// Vertical position at launch
    #[arg(
        long,
        default_value_t = LaunchParams::default().vertical_position,
        allow_negative_numbers = true
    )]
    vertical_position: f32,
    /// Vertical position below which the flight fails
    #[arg(long, default_value_t = DEFAULT_DEATH_BARRIER, allow_negative_numbers = true)]
    death_barrier: f32,
}

impl FlightArg {
    fn launch(&self) -> LaunchParams {
        LaunchParams {
            forward_velocity: self.forward_velocity,
            vertical_position: self.vertical_position,
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::ValueSearch(arg) => value_search::run(&arg)?,
        Mode::TableSearch(arg) => table_search::run(&arg)?,
        Mode::ReplayTable(arg) => replay_table::run(&arg)?,
    }
    Ok(())
}
