//! Beeswarm layout command
//!
//! Maps the y values of one zygosity view onto a vertical pixel range and lays
//! out every x column of the wildtype and mutant populations as a beeswarm
//! around its own anchor:
//!
//! ```text
//!   |<------------- column_spacing ------------->|
//!   |      wildtype slot     |     mutant slot     |
//!              ^ anchor               ^ anchor
//!
//!   slot_width = column_spacing / populations
//!   anchor_x   = column index * column_spacing + (slot + 0.5) * slot_width
//!   bound      = min(bound, slot_width / 2 - radius)
//!   y pixel    = linear(y; [y min, y max] -> [height, 0])
//! ```
//!
//! Column indices are shared by both populations, so equal x values line up.
//! Each population swarms inside its own slot of the column, so circles of
//! different populations never overlap as long as the radius fits the slot.

use std::{collections::BTreeSet, path::PathBuf};

use anyhow::{Context, ensure};
use clap::{Args, ValueEnum};
use phenoview_analysis::{
    cache::StatisticsCache,
    cohort::{SexFilter, ZygosityFilter},
    grouping::{PlotDataset, ValueKey},
    record::DataPoint,
};
use phenoview_layout::{
    beeswarm::{Beeswarm, Leaning, SwarmPoint},
    scale::LinearScale,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    command::{BatchArg, ZygosityArg},
    util::{self, Output},
};

/// Swarm geometry, loadable from a JSON file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SwarmConfig {
    /// Radius of every point in pixels
    pub radius: f64,
    /// Maximum horizontal displacement from a column anchor in pixels,
    /// further capped so every population stays inside its slot
    pub bound: f64,
    pub leaning: Leaning,
    /// Height of the plot area in pixels
    pub height: f64,
    /// Horizontal distance between column anchors in pixels
    pub column_spacing: f64,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            radius: 3.0,
            bound: 40.0,
            leaning: Leaning::None,
            height: 400.0,
            column_spacing: 100.0,
        }
    }
}

impl SwarmConfig {
    fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.radius > 0.0, "radius must be positive, got {}", self.radius);
        ensure!(self.bound >= 0.0, "bound must not be negative, got {}", self.bound);
        ensure!(self.height > 0.0, "height must be positive, got {}", self.height);
        ensure!(
            self.column_spacing > 0.0,
            "column spacing must be positive, got {}",
            self.column_spacing
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LeaningArg {
    None,
    Left,
    Right,
}

impl From<LeaningArg> for Leaning {
    fn from(arg: LeaningArg) -> Self {
        match arg {
            LeaningArg::None => Self::None,
            LeaningArg::Left => Self::Left,
            LeaningArg::Right => Self::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum SexArg {
    #[default]
    Combined,
    Male,
    Female,
}

impl From<SexArg> for SexFilter {
    fn from(arg: SexArg) -> Self {
        match arg {
            SexArg::Combined => Self::Combined,
            SexArg::Male => Self::Male,
            SexArg::Female => Self::Female,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct SwarmArg {
    #[clap(flatten)]
    input: BatchArg,

    /// Path to a JSON swarm geometry file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Point radius in pixels
    #[arg(long)]
    radius: Option<f64>,

    /// Maximum horizontal displacement from a column anchor in pixels
    #[arg(long)]
    bound: Option<f64>,

    /// Side of the anchor points may move to
    #[arg(long, value_enum)]
    leaning: Option<LeaningArg>,

    /// Plot area height in pixels
    #[arg(long)]
    height: Option<f64>,

    /// Distance between column anchors in pixels
    #[arg(long)]
    column_spacing: Option<f64>,

    /// Zygosity view of the mutant population
    #[arg(long, value_enum, default_value_t)]
    zygosity: ZygosityArg,

    /// Sex subset to lay out
    #[arg(long, value_enum, default_value_t)]
    sex: SexArg,

    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl SwarmArg {
    fn config(&self) -> anyhow::Result<SwarmConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file("swarm config", path)?,
            None => SwarmConfig::default(),
        };
        if let Some(radius) = self.radius {
            config.radius = radius;
        }
        if let Some(bound) = self.bound {
            config.bound = bound;
        }
        if let Some(leaning) = self.leaning {
            config.leaning = leaning.into();
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(column_spacing) = self.column_spacing {
            config.column_spacing = column_spacing;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
struct SwarmLayout<'a> {
    config: SwarmConfig,
    y_scale: LinearScale,
    populations: Vec<PopulationLayout<'a>>,
}

#[derive(Debug, Serialize)]
struct PopulationLayout<'a> {
    population: &'static str,
    columns: Vec<ColumnLayout<'a>>,
}

#[derive(Debug, Serialize)]
struct ColumnLayout<'a> {
    x: f64,
    anchor_x: f64,
    points: Vec<SwarmPoint<&'a DataPoint>>,
}

pub(crate) fn run(arg: &SwarmArg) -> anyhow::Result<()> {
    let config = arg.config()?;
    let batch = arg.input.load()?;
    let zygosity = ZygosityFilter::from(arg.zygosity);
    let sex = SexFilter::from(arg.sex);

    let cache = StatisticsCache::new();
    let statistics = cache
        .get_or_populate(&batch, zygosity)
        .context("Failed to compute cohort statistics")?
        .with_context(|| format!("No statistics computed for the {zygosity:?} view"))?;

    let mut populations = vec![("wildtype", statistics.wildtype.get(sex))];
    if !statistics.is_baseline_only() {
        populations.push(("mutant", statistics.mutant.get(sex)));
    }
    let datasets = populations
        .into_iter()
        .filter_map(|(population, dataset)| dataset.map(|dataset| (population, dataset)))
        .collect::<Vec<_>>();
    ensure!(
        !datasets.is_empty(),
        "No {sex:?} measurements in the {zygosity:?} view"
    );

    let layout = lay_out(&config, &datasets);
    let points = layout
        .populations
        .iter()
        .flat_map(|p| &p.columns)
        .map(|c| c.points.len())
        .sum::<usize>();
    info!(points, "laid out swarm");

    Output::save_json(&layout, arg.output.clone())?;
    Ok(())
}

fn lay_out<'a>(
    config: &SwarmConfig,
    datasets: &[(&'static str, &'a PlotDataset)],
) -> SwarmLayout<'a> {
    let y_min = datasets
        .iter()
        .map(|(_, dataset)| dataset.overall.y.min)
        .fold(f64::INFINITY, f64::min);
    let y_max = datasets
        .iter()
        .map(|(_, dataset)| dataset.overall.y.max)
        .fold(f64::NEG_INFINITY, f64::max);
    let y_scale = LinearScale::new((y_min, y_max), (config.height, 0.0));

    let column_keys = datasets
        .iter()
        .flat_map(|(_, dataset)| dataset.columns.iter().map(|group| group.key))
        .collect::<BTreeSet<ValueKey>>();
    #[expect(clippy::cast_precision_loss)]
    let slot_width = config.column_spacing / datasets.len().max(1) as f64;
    let bound = config.bound.min((slot_width / 2.0 - config.radius).max(0.0));
    #[expect(clippy::cast_precision_loss)]
    let anchor_of = |key: &ValueKey, slot: usize| {
        let index = column_keys.range(..*key).count();
        index as f64 * config.column_spacing + (slot as f64 + 0.5) * slot_width
    };

    let populations = datasets
        .iter()
        .enumerate()
        .map(|(slot, &(population, dataset))| {
            let columns = dataset
                .columns
                .iter()
                .map(|group| {
                    let swarm = Beeswarm {
                        anchor_x: anchor_of(&group.key, slot),
                        radius: config.radius,
                        bound,
                        leaning: config.leaning,
                    };
                    let points = swarm.layout(
                        group
                            .members
                            .iter()
                            .map(|point| (point, y_scale.apply(point.y))),
                    );
                    debug!(
                        population,
                        x = group.key.0,
                        points = points.len(),
                        "laid out column"
                    );
                    ColumnLayout {
                        x: group.key.0,
                        anchor_x: swarm.anchor_x,
                        points,
                    }
                })
                .collect();
            PopulationLayout {
                population,
                columns,
            }
        })
        .collect();

    SwarmLayout {
        config: *config,
        y_scale,
        populations,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use clap::Parser;
    use phenoview_analysis::grouping::prepare_dataset;
    use tempfile::NamedTempFile;

    use super::*;

    #[derive(Debug, Parser)]
    struct SwarmCli {
        #[clap(flatten)]
        arg: SwarmArg,
    }

    fn parse(args: &[&str]) -> SwarmArg {
        let args = std::iter::once("phenoview").chain(args.iter().copied());
        SwarmCli::try_parse_from(args).unwrap().arg
    }

    fn config_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    fn point(measurement_id: u64, x: f64, y: f64) -> DataPoint {
        DataPoint {
            measurement_id,
            specimen_id: measurement_id,
            metadata_group: 1,
            x,
            y,
        }
    }

    #[test]
    fn test_config_defaults_for_missing_fields() {
        let config: SwarmConfig = serde_json::from_str(r#"{"radius": 5.0}"#).unwrap();
        assert_eq!(config.radius, 5.0);
        assert_eq!(config.bound, SwarmConfig::default().bound);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_without_file_or_flags_is_default() {
        let config = parse(&["batch.json"]).config().unwrap();
        assert_eq!(config, SwarmConfig::default());
    }

    #[test]
    fn test_flags_override_config_file() {
        let file = config_file(r#"{"radius": 2.0, "bound": 10.0, "height": 300.0}"#);
        let path = file.path().to_str().unwrap();
        let arg = parse(&[
            "batch.json",
            "--config",
            path,
            "--radius",
            "6",
            "--leaning",
            "right",
        ]);
        let config = arg.config().unwrap();
        assert_eq!(config.radius, 6.0);
        assert_eq!(config.bound, 10.0);
        assert_eq!(config.height, 300.0);
        assert_eq!(config.leaning, Leaning::Right);
        assert_eq!(config.column_spacing, SwarmConfig::default().column_spacing);
    }

    #[test]
    fn test_invalid_flag_is_rejected_after_merge() {
        let file = config_file(r#"{"bound": 10.0}"#);
        let path = file.path().to_str().unwrap();
        let err = parse(&["batch.json", "--config", path, "--bound=-1"])
            .config()
            .unwrap_err();
        assert!(err.to_string().contains("bound must not be negative"));
    }

    #[test]
    fn test_flag_repairs_invalid_config_value() {
        let file = config_file(r#"{"radius": 0.0}"#);
        let path = file.path().to_str().unwrap();
        assert!(parse(&["batch.json", "--config", path]).config().is_err());
        let config = parse(&["batch.json", "--config", path, "--radius", "4"])
            .config()
            .unwrap();
        assert_eq!(config.radius, 4.0);
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let err = parse(&["batch.json", "--config", "/nonexistent/swarm.json"])
            .config()
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to open swarm config file"));
    }

    #[test]
    fn test_config_rejects_negative_bound() {
        let config = SwarmConfig {
            bound: -1.0,
            ..SwarmConfig::default()
        };
        assert!(config.validate().is_err());
    }

    fn all_points<'a, 'b>(layout: &'a SwarmLayout<'b>) -> Vec<&'a SwarmPoint<&'b DataPoint>> {
        layout
            .populations
            .iter()
            .flat_map(|p| &p.columns)
            .flat_map(|c| &c.points)
            .collect()
    }

    #[test]
    fn test_populations_get_own_slot_in_shared_columns() {
        let wildtype = prepare_dataset(vec![point(1, 1.0, 10.0), point(2, 3.0, 20.0)]).unwrap();
        let mutant = prepare_dataset(vec![point(3, 2.0, 15.0), point(4, 3.0, 30.0)]).unwrap();
        let config = SwarmConfig::default();
        let layout = lay_out(&config, &[("wildtype", &wildtype), ("mutant", &mutant)]);

        let anchors = |i: usize| {
            layout.populations[i]
                .columns
                .iter()
                .map(|c| (c.x, c.anchor_x))
                .collect::<Vec<_>>()
        };
        assert_eq!(anchors(0), [(1.0, 25.0), (3.0, 225.0)]);
        assert_eq!(anchors(1), [(2.0, 175.0), (3.0, 275.0)]);

        assert_eq!(layout.y_scale.apply(10.0), 400.0);
        assert_eq!(layout.y_scale.apply(30.0), 0.0);
    }

    #[test]
    fn test_equal_values_of_both_populations_do_not_overlap() {
        let wildtype = prepare_dataset(vec![point(1, 1.0, 10.0), point(2, 1.0, 20.0)]).unwrap();
        let mutant = prepare_dataset(vec![point(3, 1.0, 10.0), point(4, 1.0, 20.0)]).unwrap();
        let config = SwarmConfig::default();
        let layout = lay_out(&config, &[("wildtype", &wildtype), ("mutant", &mutant)]);

        let points = all_points(&layout);
        assert_eq!(points.len(), 4);
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                let distance = (a.x - b.x).hypot(a.y - b.y);
                assert!(
                    distance >= 2.0 * config.radius - 1e-9,
                    "({}, {}) and ({}, {}) overlap",
                    a.x,
                    a.y,
                    b.x,
                    b.y
                );
            }
        }
    }

    #[test]
    fn test_dense_columns_stay_in_their_slot() {
        let wildtype = prepare_dataset((1..=12).map(|id| point(id, 1.0, 5.0)).collect()).unwrap();
        let mutant = prepare_dataset((13..=24).map(|id| point(id, 1.0, 5.0)).collect()).unwrap();
        let config = SwarmConfig::default();
        let layout = lay_out(&config, &[("wildtype", &wildtype), ("mutant", &mutant)]);

        let half = config.column_spacing / 2.0;
        let column = |i: usize| &layout.populations[i].columns[0].points;
        assert!(column(0).iter().all(|p| p.x <= half - config.radius));
        assert!(column(1).iter().all(|p| p.x >= half + config.radius));
    }

    #[test]
    fn test_equal_values_are_spread_within_bound() {
        let dataset = prepare_dataset((1..=5).map(|id| point(id, 1.0, 7.0)).collect()).unwrap();
        let config = SwarmConfig {
            radius: 5.0,
            bound: 70.0,
            ..SwarmConfig::default()
        };
        let layout = lay_out(&config, &[("wildtype", &dataset)]);
        let column = &layout.populations[0].columns[0];
        assert_eq!(column.points.len(), 5);
        let mut xs = column.points.iter().map(|p| p.x).collect::<Vec<_>>();
        xs.sort_by(f64::total_cmp);
        for pair in xs.windows(2) {
            assert!(pair[1] - pair[0] >= 10.0 - 1e-9);
        }
        assert!(xs.iter().all(|x| (x - column.anchor_x).abs() <= 70.0));
    }
}
