use std::path::PathBuf;

use clap::Args;
use phenoview_analysis::{
    categorical::{CategoricalAnalysis, CategoryFrequencies, analyze_categorical},
    color::CategoryColorRegistry,
};
use tracing::{info, warn};

use crate::{command::BatchArg, util::Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct FrequenciesArg {
    #[clap(flatten)]
    input: BatchArg,

    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Write JSON output to this file instead of stdout
    #[arg(long, requires = "json")]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &FrequenciesArg) -> anyhow::Result<()> {
    let batch = arg.input.load()?;
    let numeric = batch
        .measurements
        .iter()
        .filter(|record| record.value.as_number().is_some())
        .count();
    if numeric > 0 {
        warn!(numeric, "numeric values are treated as category options");
    }

    let registry = CategoryColorRegistry::new();
    let analysis = analyze_categorical(&batch.measurements, &registry);
    info!(options = registry.len(), "computed option frequencies");

    if arg.json {
        Output::save_json(&analysis, arg.output.clone())?;
    } else {
        print_analysis(&analysis);
    }
    Ok(())
}

fn print_analysis(analysis: &CategoricalAnalysis) {
    println!("Options:");
    for option in &analysis.options {
        println!("  [{:>2}] {}", option.color_index, option.label);
    }
    println!();

    println!(
        "  {:<10} {:<5} {:>8}  {:<36} {:>8}  {:<36}",
        "Sex", "Zyg", "WT n", "WT frequencies", "Mut n", "Mut frequencies"
    );
    println!("  {}", "-".repeat(110));
    for (row, column, cell) in analysis.grid.iter() {
        if cell.wildtype.total == 0 && cell.mutant.total == 0 {
            continue;
        }
        println!(
            "  {:<10} {:<5} {:>8}  {:<36} {:>8}  {:<36}",
            row.label(),
            column.label(),
            cell.wildtype.total,
            format_percentages(&cell.wildtype),
            cell.mutant.total,
            format_percentages(&cell.mutant),
        );
    }
}

fn format_percentages(frequencies: &CategoryFrequencies) -> String {
    if frequencies.percentages.is_empty() {
        return "-".to_owned();
    }
    frequencies
        .percentages
        .iter()
        .map(|(option, percentage)| format!("{option} {percentage:.1}%"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use phenoview_analysis::{
        categorical::{HIGHLIGHTED_SPECIMEN, SexRow, ZygosityColumn},
        record::{Increment, MeasuredValue, MeasurementRecord, Sex, Zygosity},
    };

    use super::*;

    fn record(
        measurement_id: u64,
        genotype_id: u32,
        sex: Sex,
        value: &str,
    ) -> MeasurementRecord {
        MeasurementRecord {
            measurement_id,
            specimen_id: measurement_id,
            metadata_group: 1,
            increment: Increment::Number(0.0),
            value: MeasuredValue::Category(value.to_owned()),
            sex: Some(sex),
            zygosity: (genotype_id != 0).then_some(Zygosity::Heterozygous),
            genotype_id,
            strain_id: 1,
        }
    }

    #[test]
    fn test_analysis_json_shape() {
        let records = vec![
            record(1, 3, Sex::Female, "Normal"),
            record(2, 3, Sex::Male, "Abnormal"),
            record(3, 0, Sex::Female, "Normal"),
        ];
        let registry = CategoryColorRegistry::new();
        let value = serde_json::to_value(analyze_categorical(&records, &registry)).unwrap();

        let options = value["options"].as_array().unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(options[0]["label"], HIGHLIGHTED_SPECIMEN);
        assert_eq!(options[0]["color_index"], 0);
        assert_eq!(options[1]["label"], "Abnormal");
        assert_eq!(options[2]["label"], "Normal");

        let rows = value["grid"]["cells"].as_array().unwrap();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|row| row.as_array().unwrap().len() == 4));

        // female row, het column
        let cell = &rows[0][0];
        assert_eq!(cell["mutant"]["total"], 1);
        assert_eq!(cell["mutant"]["counts"]["Normal"], 1);
        assert_eq!(cell["wildtype"]["total"], 1);

        // all row, all column
        let cell = &rows[4][3];
        assert_eq!(cell["mutant"]["total"], 2);
        assert_eq!(cell["mutant"]["percentages"]["Abnormal"], 50.0);
        assert_eq!(cell["mutant"]["percentages"]["Normal"], 50.0);
    }

    #[test]
    fn test_percentages_format() {
        let records = vec![
            record(1, 3, Sex::Female, "A"),
            record(2, 3, Sex::Female, "A"),
            record(3, 3, Sex::Female, "B"),
        ];
        let analysis = analyze_categorical(&records, &CategoryColorRegistry::new());
        let cell = analysis
            .grid
            .cell(SexRow::Female, ZygosityColumn::Heterozygous);
        assert_eq!(format_percentages(&cell.mutant), "A 66.7%, B 33.3%");
        assert_eq!(format_percentages(&cell.wildtype), "-");
    }
}
