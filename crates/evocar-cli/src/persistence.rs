//! Generation observers that persist training progress to disk.
//!
//! Both observers treat I/O failures as non-fatal: the error is logged and the observer
//! stops writing, while training continues.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use chrono::{DateTime, Local};
use evocar_training::{GenerationObserver, Genotype};
use tracing::{debug, error};

use crate::util;

/// Operator names recorded in the header of a statistics file.
#[derive(Debug, Clone)]
pub struct RunDescription {
    pub population_size: usize,
    pub track: String,
    pub selection: String,
    pub recombination: String,
    pub mutation: String,
    pub fitness_calculation: String,
}

/// Base name, without extension, of the statistics file of a session started at
/// `started_at`.
pub fn statistics_name(track: &str, started_at: DateTime<Local>) -> String {
    format!(
        "Evaluation - {track} {}",
        started_at.format("%Y_%m_%d_%H-%M-%S")
    )
}

/// Appends the best evaluation of every generation to a text file.
///
/// ```text
/// Population size: 30
/// Track: sine
/// Selection: remainder_stochastic_sampling
/// ...
///
/// 1	0.1325
/// 2	0.2875
/// ```
#[derive(Debug)]
pub struct StatisticsLog {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl StatisticsLog {
    /// Creates `<dir>/<name>.txt` and writes the header.
    pub fn create(dir: &Path, name: &str, run: &RunDescription) -> anyhow::Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        let path = dir.join(format!("{name}.txt"));
        let file = File::create(&path)
            .with_context(|| format!("Failed to create statistics file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        write_header(&mut writer, run)
            .and_then(|()| writer.flush())
            .with_context(|| format!("Failed to write statistics file: {}", path.display()))?;

        Ok(Self {
            path,
            writer: Some(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&mut self, generation: u32, best_evaluation: f64) {
        let Some(writer) = &mut self.writer else {
            return;
        };
        let result =
            writeln!(writer, "{generation}\t{best_evaluation}").and_then(|()| writer.flush());
        if let Err(err) = result {
            error!(path = %self.path.display(), %err, "failed to write statistics, disabling");
            self.writer = None;
        }
    }
}

fn write_header(writer: &mut impl io::Write, run: &RunDescription) -> io::Result<()> {
    writeln!(writer, "Population size: {}", run.population_size)?;
    writeln!(writer, "Track: {}", run.track)?;
    writeln!(writer, "Selection: {}", run.selection)?;
    writeln!(writer, "Recombination: {}", run.recombination)?;
    writeln!(writer, "Mutation: {}", run.mutation)?;
    writeln!(writer, "Fitness calculation: {}", run.fitness_calculation)?;
    writeln!(writer)
}

impl GenerationObserver for StatisticsLog {
    fn fitness_calculation_finished(&mut self, generation: u32, sorted: &[Genotype]) {
        let best = sorted
            .iter()
            .map(Genotype::evaluation)
            .fold(f64::NEG_INFINITY, f64::max);
        self.append(generation, best);
    }
}

/// Saves the first genotypes that finish the track.
///
/// A genotype has finished when its evaluation is at least 1. Files are named
/// `Genotype - Finished as <n>.txt`, numbered from 1 in order of discovery, and hold the
/// genotype's text record.
///
/// The limit and the numbering cover the saver's whole lifetime. Restarts of the genetic
/// algorithm do not reset them, so earlier files are never overwritten.
#[derive(Debug)]
pub struct FinishedGenotypeSaver {
    dir: PathBuf,
    limit: usize,
    saved: usize,
    failed: bool,
}

impl FinishedGenotypeSaver {
    pub fn new(dir: PathBuf, limit: usize) -> Self {
        Self {
            dir,
            limit,
            saved: 0,
            failed: false,
        }
    }

    #[cfg(test)]
    pub fn saved_count(&self) -> usize {
        self.saved
    }

    fn save(&self, number: usize, genotype: &Genotype) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("Genotype - Finished as {number}.txt"));
        util::write_genotype_file(&path, genotype)?;
        Ok(path)
    }
}

impl GenerationObserver for FinishedGenotypeSaver {
    fn fitness_calculation_finished(&mut self, generation: u32, sorted: &[Genotype]) {
        for genotype in sorted {
            if self.failed || self.saved >= self.limit || genotype.evaluation() < 1.0 {
                break;
            }
            match self.save(self.saved + 1, genotype) {
                Ok(path) => {
                    self.saved += 1;
                    debug!(generation, path = %path.display(), "saved finished genotype");
                }
                Err(err) => {
                    error!(dir = %self.dir.display(), %err, "failed to save genotype, disabling");
                    self.failed = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn genotype(id: f64, evaluation: f64) -> Genotype {
        let mut genotype = Genotype::new(vec![id, 0.5]);
        genotype.set_evaluation(evaluation);
        genotype
    }

    fn run() -> RunDescription {
        RunDescription {
            population_size: 3,
            track: "sine".to_owned(),
            selection: "elite_selection".to_owned(),
            recombination: "uniform_crossover".to_owned(),
            mutation: "uniform_mutation".to_owned(),
            fitness_calculation: "average_normalized".to_owned(),
        }
    }

    #[test]
    fn test_statistics_name() {
        let started_at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            statistics_name("sine", started_at),
            "Evaluation - sine 2024_03_09_07-05-01"
        );
    }

    #[test]
    fn test_statistics_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = StatisticsLog::create(dir.path(), "stats", &run()).unwrap();
        log.fitness_calculation_finished(1, &[genotype(0.0, 0.25), genotype(1.0, 0.75)]);
        log.fitness_calculation_finished(2, &[genotype(0.0, 1.0)]);

        let content = fs::read_to_string(log.path()).unwrap();
        let expected = "Population size: 3\n\
                        Track: sine\n\
                        Selection: elite_selection\n\
                        Recombination: uniform_crossover\n\
                        Mutation: uniform_mutation\n\
                        Fitness calculation: average_normalized\n\
                        \n\
                        1\t0.75\n\
                        2\t1\n";
        assert_eq!(content, expected);
    }

    #[test]
    fn test_statistics_log_in_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        let log = StatisticsLog::create(&nested, "stats", &run()).unwrap();
        assert!(log.path().starts_with(&nested));
    }

    #[test]
    fn test_saves_first_finished_genotypes() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("finished");
        let mut saver = FinishedGenotypeSaver::new(target.clone(), 3);

        // stops at the first unfinished genotype
        saver.fitness_calculation_finished(
            1,
            &[genotype(1.0, 1.0), genotype(2.0, 0.9), genotype(3.0, 1.0)],
        );
        assert_eq!(saver.saved_count(), 1);

        saver.fitness_calculation_finished(2, &vec![genotype(4.0, 1.0); 3]);
        assert_eq!(saver.saved_count(), 3);

        saver.fitness_calculation_finished(3, &[genotype(5.0, 1.0)]);
        assert_eq!(saver.saved_count(), 3);

        let first = util::read_genotype_file(target.join("Genotype - Finished as 1.txt")).unwrap();
        assert_eq!(first.parameters(), &[1.0, 0.5]);
        let third = util::read_genotype_file(target.join("Genotype - Finished as 3.txt")).unwrap();
        assert_eq!(third.parameters(), &[4.0, 0.5]);
        assert!(!target.join("Genotype - Finished as 4.txt").exists());
    }

    #[test]
    fn test_saver_limit_spans_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("finished");
        let mut saver = FinishedGenotypeSaver::new(target.clone(), 2);

        saver.fitness_calculation_finished(3, &[genotype(1.0, 1.0)]);
        saver.algorithm_terminated(3);
        // the next run starts over at generation 1
        saver.fitness_calculation_finished(1, &[genotype(2.0, 1.0), genotype(3.0, 1.0)]);
        assert_eq!(saver.saved_count(), 2);

        let first = util::read_genotype_file(target.join("Genotype - Finished as 1.txt")).unwrap();
        assert_eq!(first.parameters(), &[1.0, 0.5]);
        let second = util::read_genotype_file(target.join("Genotype - Finished as 2.txt")).unwrap();
        assert_eq!(second.parameters(), &[2.0, 0.5]);
        assert!(!target.join("Genotype - Finished as 3.txt").exists());
    }

    #[test]
    fn test_nothing_saved_without_finishers() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("finished");
        let mut saver = FinishedGenotypeSaver::new(target.clone(), 3);
        saver.fitness_calculation_finished(1, &[genotype(1.0, 0.99)]);
        assert_eq!(saver.saved_count(), 0);
        assert!(!target.exists());
    }

    #[test]
    fn test_io_error_disables_saver() {
        let dir = tempfile::tempdir().unwrap();
        // a file where the directory should be
        let target = dir.path().join("blocked");
        fs::write(&target, "").unwrap();
        let mut saver = FinishedGenotypeSaver::new(target, 3);
        saver.fitness_calculation_finished(1, &[genotype(1.0, 1.0)]);
        saver.fitness_calculation_finished(2, &[genotype(1.0, 1.0)]);
        assert_eq!(saver.saved_count(), 0);
    }
}
