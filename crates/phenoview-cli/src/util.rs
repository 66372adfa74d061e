use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use phenoview_analysis::batch::MeasurementBatch;
use tracing::{info, warn};

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_owned(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self)
            .with_context(|| format!("Failed to write newline to {}", self.display_path()))?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read a measurement batch, optionally merging a baseline batch into it
///
/// # Arguments
///
/// * `path` - Path to the batch JSON file
/// * `baseline` - Path to a batch whose wildtype measurements are appended
///
/// # Errors
///
/// Returns error if a file cannot be opened or parsed, or if the resulting
/// batch has no measurements
pub fn read_batch_file<P>(path: P, baseline: Option<&Path>) -> anyhow::Result<MeasurementBatch>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut batch: MeasurementBatch = read_json_file("batch", path)?;
    info!(
        path = %path.display(),
        measurements = batch.measurements.len(),
        "loaded batch"
    );

    if let Some(baseline_path) = baseline {
        let baseline: MeasurementBatch = read_json_file("baseline batch", baseline_path)?;
        let merged = batch.merge_baseline(baseline.measurements);
        info!(path = %baseline_path.display(), merged, "merged baseline measurements");
    }

    if batch.measurements.is_empty() {
        bail!("No measurements found in {}", path.display());
    }
    if !batch.qc_status.is_done() {
        warn!(qc_status = ?batch.qc_status, "quality control is not complete for this batch");
    }
    if !batch.metadata_groups.is_empty() {
        for group in batch.referenced_metadata_groups() {
            if batch.metadata_group(group).is_none() {
                warn!(
                    metadata_group = group,
                    "measurements reference an undescribed metadata group"
                );
            }
        }
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use phenoview_analysis::{
        batch::{DatasetKey, QcStatus},
        record::{Increment, MeasuredValue, MeasurementRecord, Sex, Zygosity},
    };
    use tempfile::NamedTempFile;

    use super::*;

    fn record(measurement_id: u64, genotype_id: u32) -> MeasurementRecord {
        MeasurementRecord {
            measurement_id,
            specimen_id: measurement_id,
            metadata_group: 1,
            increment: Increment::Number(1.0),
            value: MeasuredValue::Number(20.0),
            sex: Some(Sex::Male),
            zygosity: (genotype_id != 0).then_some(Zygosity::Homozygous),
            genotype_id,
            strain_id: 1,
        }
    }

    fn batch(genotype_id: u32, measurements: Vec<MeasurementRecord>) -> MeasurementBatch {
        MeasurementBatch {
            key: DatasetKey {
                genotype_id,
                strain_id: 1,
                centre_id: 1,
                parameter_key: "IMPC_BWT_001_001".to_owned(),
            },
            qc_status: QcStatus::Done,
            metadata_groups: vec![],
            measurements,
        }
    }

    fn batch_file(batch: &MeasurementBatch) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        serde_json::to_writer(file.as_file(), batch).unwrap();
        file
    }

    #[test]
    fn test_read_batch_round_trips_file() {
        let expected = batch(7, vec![record(1, 7), record(2, 0)]);
        let file = batch_file(&expected);
        let loaded = read_batch_file(file.path(), None).unwrap();
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let file = batch_file(&batch(7, vec![]));
        let err = read_batch_file(file.path(), None).unwrap_err();
        assert!(err.to_string().contains("No measurements found"));
    }

    #[test]
    fn test_baseline_merges_wildtype_records() {
        let mutant = batch_file(&batch(7, vec![record(1, 7)]));
        let baseline = batch_file(&batch(0, vec![record(10, 0), record(11, 0), record(12, 5)]));

        let loaded = read_batch_file(mutant.path(), Some(baseline.path())).unwrap();
        let ids = loaded
            .measurements
            .iter()
            .map(|r| r.measurement_id)
            .collect::<Vec<_>>();
        assert_eq!(ids, [1, 10, 11]);
    }

    #[test]
    fn test_baseline_fills_empty_batch() {
        let mutant = batch_file(&batch(7, vec![]));
        let baseline = batch_file(&batch(0, vec![record(10, 0)]));
        let loaded = read_batch_file(mutant.path(), Some(baseline.path())).unwrap();
        assert_eq!(loaded.measurements.len(), 1);
    }

    #[test]
    fn test_malformed_batch_is_reported() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{\"key\": 1}").unwrap();
        let err = read_batch_file(file.path(), None).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse batch JSON file"));
    }
}
