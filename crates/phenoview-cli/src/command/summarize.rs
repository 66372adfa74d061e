//! Cohort statistics command
//!
//! Computes the wildtype and mutant statistics of one zygosity view and prints
//! them per sex, either as tables or as JSON.

use std::{collections::BTreeSet, path::PathBuf};

use anyhow::Context;
use clap::Args;
use phenoview_analysis::{
    batch::{DatasetKey, QcStatus},
    cache::StatisticsCache,
    cohort::{CohortStatistics, SexFilter, SexSplit, ZygosityFilter},
    grouping::{Extent, PlotDataset},
    record::MetadataGroupId,
};
use phenoview_stats::descriptive::ColumnStatistics;
use serde::Serialize;
use tracing::info;

use crate::{
    command::{BatchArg, ZygosityArg},
    util::Output,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct SummarizeArg {
    #[clap(flatten)]
    input: BatchArg,

    /// Zygosity view of the mutant population
    #[arg(long, value_enum, default_value_t)]
    zygosity: ZygosityArg,

    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Write JSON output to this file instead of stdout
    #[arg(long, requires = "json")]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CohortSummary<'a> {
    dataset: &'a DatasetKey,
    qc_status: QcStatus,
    zygosity: ZygosityFilter,
    baseline_only: bool,
    wildtype: PopulationSummary,
    mutant: PopulationSummary,
}

#[derive(Debug, Serialize)]
struct PopulationSummary {
    combined: Option<DatasetSummary>,
    male: Option<DatasetSummary>,
    female: Option<DatasetSummary>,
}

impl PopulationSummary {
    fn new(split: &SexSplit<PlotDataset>) -> Self {
        let summary = |filter| split.get(filter).map(DatasetSummary::new);
        Self {
            combined: summary(SexFilter::Combined),
            male: summary(SexFilter::Male),
            female: summary(SexFilter::Female),
        }
    }

    fn sides(&self) -> [(&'static str, Option<&DatasetSummary>); 3] {
        [
            ("Combined", self.combined.as_ref()),
            ("Male", self.male.as_ref()),
            ("Female", self.female.as_ref()),
        ]
    }
}

#[derive(Debug, Serialize)]
struct DatasetSummary {
    specimens: usize,
    x: Extent,
    y: ColumnStatistics,
    columns: Vec<ColumnSummary>,
}

impl DatasetSummary {
    fn new(dataset: &PlotDataset) -> Self {
        let columns = dataset
            .columns
            .iter()
            .map(|group| ColumnSummary {
                x: group.key.0,
                statistics: group.statistics.clone(),
                metadata_groups: group.metadata_groups(),
            })
            .collect();
        Self {
            specimens: dataset.rows.len(),
            x: dataset.overall.x,
            y: dataset.overall.y.clone(),
            columns,
        }
    }
}

#[derive(Debug, Serialize)]
struct ColumnSummary {
    x: f64,
    statistics: ColumnStatistics,
    metadata_groups: BTreeSet<MetadataGroupId>,
}

pub(crate) fn run(arg: &SummarizeArg) -> anyhow::Result<()> {
    let batch = arg.input.load()?;
    let cache = StatisticsCache::new();
    let zygosity = ZygosityFilter::from(arg.zygosity);

    let statistics = cache
        .get_or_populate(&batch, zygosity)
        .context("Failed to compute cohort statistics")?
        .with_context(|| format!("No statistics computed for the {zygosity:?} view"))?;
    info!(views = cache.len(), "computed cohort statistics");

    let summary = summarize(&batch.key, batch.qc_status, &statistics);
    if arg.json {
        Output::save_json(&summary, arg.output.clone())?;
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn summarize<'a>(
    dataset: &'a DatasetKey,
    qc_status: QcStatus,
    statistics: &CohortStatistics,
) -> CohortSummary<'a> {
    CohortSummary {
        dataset,
        qc_status,
        zygosity: statistics.zygosity,
        baseline_only: statistics.is_baseline_only(),
        wildtype: PopulationSummary::new(&statistics.wildtype),
        mutant: PopulationSummary::new(&statistics.mutant),
    }
}

fn print_summary(summary: &CohortSummary<'_>) {
    let DatasetKey {
        genotype_id,
        strain_id,
        centre_id,
        parameter_key,
    } = summary.dataset;
    println!(
        "Cohort Statistics: {parameter_key} (genotype {genotype_id}, strain {strain_id}, centre {centre_id})"
    );
    println!("==========================================");
    println!("QC status      : {:?}", summary.qc_status);
    println!("Zygosity view  : {:?}", summary.zygosity);
    if summary.baseline_only {
        println!("Baseline only  : mutant statistics are the wildtype statistics");
    }
    println!();

    let populations = if summary.baseline_only {
        vec![("Wildtype", &summary.wildtype)]
    } else {
        vec![("Wildtype", &summary.wildtype), ("Mutant", &summary.mutant)]
    };
    for (population, stats) in populations {
        for (sex, dataset) in stats.sides() {
            println!("{population} / {sex}");
            match dataset {
                Some(dataset) => print_dataset(dataset),
                None => println!("  (no data)"),
            }
            println!();
        }
    }
}

fn print_dataset(dataset: &DatasetSummary) {
    println!(
        "  {} points, {} specimens, x in [{}, {}]",
        dataset.y.count, dataset.specimens, dataset.x.min, dataset.x.max
    );
    print_header();
    print_row("all", &dataset.y, None);
    for column in &dataset.columns {
        print_row(
            &column.x.to_string(),
            &column.statistics,
            Some(&column.metadata_groups),
        );
    }
}

fn print_header() {
    println!(
        "  {:<14} {:>5} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}  Groups",
        "X", "N", "Mean", "Median", "SD", "SE", "Q1", "Q3", "Min", "Max"
    );
    println!("  {}", "-".repeat(118));
}

fn print_row(label: &str, stats: &ColumnStatistics, groups: Option<&BTreeSet<MetadataGroupId>>) {
    let quartile = stats.quartile;
    let groups = groups.map_or_else(String::new, |groups| {
        let marker = if groups.len() > 1 { " (mixed)" } else { "" };
        let ids = groups.iter().map(ToString::to_string).collect::<Vec<_>>();
        format!("{}{marker}", ids.join(","))
    });
    println!(
        "  {:<14} {:>5} {:>10.3} {:>10.3} {:>10} {:>10} {:>10} {:>10} {:>10.3} {:>10.3}  {}",
        label,
        stats.count,
        stats.mean,
        stats.median,
        format_optional(stats.std_dev),
        format_optional(stats.std_err),
        format_optional(quartile.map(|q| q.q1)),
        format_optional(quartile.map(|q| q.q3)),
        stats.min,
        stats.max,
        groups,
    );
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_owned(), |value| format!("{value:.3}"))
}
