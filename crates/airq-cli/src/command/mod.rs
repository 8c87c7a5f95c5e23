use std::path::PathBuf;

use clap::{Parser, Subcommand};

use self::{
    dashboard::DashboardArg, export::ExportArg, histogram::HistogramArg, summary::SummaryArg,
};
use crate::logging;

mod args;
mod dashboard;
mod export;
mod histogram;
mod summary;
mod table;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Also write log records to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Explore peak hours interactively in the terminal
    Dashboard(#[clap(flatten)] DashboardArg),
    /// Print box plot statistics per year and pollutant
    Summary(#[clap(flatten)] SummaryArg),
    /// Print the distribution of one year's readings
    Histogram(#[clap(flatten)] HistogramArg),
    /// Write statistics and histograms as JSON
    Export(#[clap(flatten)] ExportArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let log_to_stderr = !matches!(args.mode, Mode::Dashboard(_));
    let _log_guard = logging::init(args.log_file.as_deref(), log_to_stderr)?;

    match &args.mode {
        Mode::Dashboard(arg) => dashboard::run(arg)?,
        Mode::Summary(arg) => summary::run(arg)?,
        Mode::Histogram(arg) => histogram::run(arg)?,
        Mode::Export(arg) => export::run(arg)?,
    }
    Ok(())
}
