use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::schema::sheet::EstimateSheet;

/// Destination of a command's JSON result.
///
/// Results go to stdout unless an output path is given, so progress messages
/// (on stderr) never mix with them.
#[derive(Debug)]
pub enum Output {
    Stdout(io::Stdout),
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    /// Writes `value` as pretty JSON to `output_path`, or to stdout when `None`.
    pub fn save_json<T>(value: &T, output_path: Option<&Path>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::create(output_path)?;
        output.write_json(value)?;
        if let Output::File { path, .. } = &output {
            eprintln!("Saved results to {}", path.display());
        }
        Ok(())
    }

    pub fn create(output_path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = output_path else {
            return Ok(Output::Stdout(io::stdout()));
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    fn display_path(&self) -> String {
        match self {
            Output::Stdout(_) => "stdout".to_owned(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Output::Stdout(stdout) => stdout,
            Output::File { writer, .. } => writer,
        }
    }

    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let destination = self.display_path();
        let writer = self.writer();
        serde_json::to_writer_pretty(&mut *writer, value)
            .with_context(|| format!("Failed to write JSON to {destination}"))?;
        writeln!(writer)
            .and_then(|()| writer.flush())
            .with_context(|| format!("Failed to finish writing to {destination}"))?;
        Ok(())
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

    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {} JSON file: {}", file_kind, path.display()))
}

/// Read an estimate sheet from a JSON file
///
/// # Errors
///
/// Returns error if file cannot be opened or parsed
pub fn read_sheet_file<P>(path: P) -> anyhow::Result<EstimateSheet>
where
    P: AsRef<Path>,
{
    read_json_file("estimate sheet", path)
}
