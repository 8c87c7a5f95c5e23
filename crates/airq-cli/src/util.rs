use std::{
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, StdoutLock, Write},
    path::{Path, PathBuf},
};

use airq_analysis::dataset::{Dataset, DatasetSchema};
use anyhow::Context;
use serde::Serialize;
use tracing::info;

/// Where JSON output goes: a file, or stdout when no path is given.
#[derive(Debug)]
pub(crate) enum Output {
    Stdout(StdoutLock<'static>),
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    /// Writes `value` as pretty JSON followed by a newline.
    pub(crate) fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let mut output = Self::from_output_path(output_path)?;
        output.write_json(value)?;
        info!(%output, "wrote JSON");
        Ok(())
    }

    fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let Some(path) = output_path else {
            return Ok(Self::Stdout(io::stdout().lock()));
        };
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let result = match self {
            Self::Stdout(writer) => write_pretty_json(writer, value),
            Self::File { writer, .. } => write_pretty_json(writer, value),
        };
        result.with_context(|| format!("Failed to write JSON to {self}"))
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout(_) => f.write_str("stdout"),
            Self::File { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

fn write_pretty_json<W, T>(mut writer: W, value: &T) -> io::Result<()>
where
    W: Write,
    T: Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()
}

/// Read a pollution dataset from a CSV file
///
/// # Arguments
///
/// * `path` - Path to the CSV file
/// * `schema` - Column names to read
///
/// # Errors
///
/// Returns error if the file cannot be opened, a schema column is missing,
/// or a date cannot be parsed
pub fn read_dataset_file<P>(path: P, schema: &DatasetSchema) -> anyhow::Result<Dataset>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open dataset file: {}", path.display()))?;

    let dataset = Dataset::from_csv_reader(BufReader::new(file), schema)
        .with_context(|| format!("Failed to load dataset file: {}", path.display()))?;

    info!(
        path = %path.display(),
        observations = dataset.len(),
        regions = dataset.regions().len(),
        "loaded dataset"
    );
    Ok(dataset)
}
