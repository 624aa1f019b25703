use std::{
    fs::{self, File},
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use evocar_training::Genotype;

/// Destination of a JSON document: a file when a path is given, otherwise stdout.
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File(BufWriter<File>, PathBuf),
}

impl Output {
    /// Writes `value` as pretty-printed JSON to `path`, or to stdout if `path` is `None`.
    pub fn save_json<T>(value: &T, path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match path {
            Some(path) => {
                let file = File::create(&path).with_context(|| {
                    format!("Failed to create output file: {}", path.display())
                })?;
                Output::File(BufWriter::new(file), path)
            }
            None => Output::Stdout(io::stdout().lock()),
        };
        output
            .write_json(value)
            .with_context(|| format!("Failed to write JSON to {}", output.target()))
    }

    fn target(&self) -> String {
        match self {
            Output::Stdout(_) => "stdout".to_owned(),
            Output::File(_, path) => path.display().to_string(),
        }
    }

    fn write_json<T>(&mut self, value: &T) -> io::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, value)?;
        writeln!(self)?;
        self.flush()
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(writer) => writer.write(buf),
            Output::File(writer, _) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(writer) => writer.flush(),
            Output::File(writer, _) => writer.flush(),
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
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} file: {}", path.display()))
}

/// Reads a genotype stored as a single `;`-separated text record.
pub fn read_genotype_file<P>(path: P) -> anyhow::Result<Genotype>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let record = fs::read_to_string(path)
        .with_context(|| format!("Failed to read genotype file: {}", path.display()))?;
    let genotype = Genotype::from_record(&record)
        .with_context(|| format!("Failed to parse genotype file: {}", path.display()))?;
    Ok(genotype)
}

/// Writes a genotype as a single `;`-separated text record.
pub fn write_genotype_file<P>(path: P, genotype: &Genotype) -> io::Result<()>
where
    P: AsRef<Path>,
{
    fs::write(path, genotype.to_record())
}
