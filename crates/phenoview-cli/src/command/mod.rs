use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use phenoview_analysis::{batch::MeasurementBatch, cohort::ZygosityFilter};

use self::{frequencies::FrequenciesArg, summarize::SummarizeArg, swarm::SwarmArg};
use crate::util;

mod frequencies;
mod summarize;
mod swarm;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Print cohort statistics of a numeric parameter
    Summarize(#[clap(flatten)] SummarizeArg),
    /// Print option frequencies of a categorical parameter
    Frequencies(#[clap(flatten)] FrequenciesArg),
    /// Lay out the points of a numeric parameter as beeswarms
    Swarm(#[clap(flatten)] SwarmArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Summarize(arg) => summarize::run(&arg)?,
        Mode::Frequencies(arg) => frequencies::run(&arg)?,
        Mode::Swarm(arg) => swarm::run(&arg)?,
    }
    Ok(())
}

/// Input batch shared by every mode
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BatchArg {
    /// Path to the measurement batch JSON file
    pub batch: PathBuf,

    /// Path to a batch whose wildtype measurements are merged in as baseline
    #[arg(long)]
    pub baseline: Option<PathBuf>,
}

impl BatchArg {
    pub(crate) fn load(&self) -> anyhow::Result<MeasurementBatch> {
        util::read_batch_file(&self.batch, self.baseline.as_deref())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum ZygosityArg {
    #[default]
    All,
    Het,
    Hom,
    Hem,
}

impl From<ZygosityArg> for ZygosityFilter {
    fn from(arg: ZygosityArg) -> Self {
        match arg {
            ZygosityArg::All => Self::All,
            ZygosityArg::Het => Self::Heterozygous,
            ZygosityArg::Hom => Self::Homozygous,
            ZygosityArg::Hem => Self::Hemizygous,
        }
    }
}
