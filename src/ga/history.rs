//! Per-generation fitness statistics.
//!
//! [`History`] is the record returned by [`Optimizer::fit`](super::Optimizer::fit):
//! one row per evaluated generation with the fixed columns
//! `iteration, max_fitness, min_fitness, fitness_avg, fitness_std`.
//! It can be written out as CSV, one row per generation.

use crate::error::Result;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Column names, in output order.
pub const HISTORY_KEYS: [&str; 5] = [
    "iteration",
    "max_fitness",
    "min_fitness",
    "fitness_avg",
    "fitness_std",
];

/// One generation's statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    /// Zero-based generation number.
    pub iteration: usize,
    /// Highest fitness in the generation.
    pub max_fitness: f64,
    /// Lowest fitness in the generation.
    pub min_fitness: f64,
    /// Mean fitness.
    pub fitness_avg: f64,
    /// Population standard deviation of fitness.
    pub fitness_std: f64,
}

/// Fitness statistics of an optimization run, stored column-wise.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct History {
    /// Generation numbers.
    pub iteration: Vec<usize>,
    /// Best fitness per generation.
    pub max_fitness: Vec<f64>,
    /// Worst fitness per generation.
    pub min_fitness: Vec<f64>,
    /// Mean fitness per generation.
    pub fitness_avg: Vec<f64>,
    /// Fitness standard deviation per generation.
    pub fitness_std: Vec<f64>,
    /// The run stopped because a generation reached fitness `1.0`.
    pub converged: bool,
    /// The run stopped because parallel evaluation exceeded its wait budget.
    pub timed_out: bool,
    /// The run stopped because it was cancelled externally.
    pub cancelled: bool,
}

impl History {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one generation.
    pub fn push(&mut self, stats: GenerationStats) {
        self.iteration.push(stats.iteration);
        self.max_fitness.push(stats.max_fitness);
        self.min_fitness.push(stats.min_fitness);
        self.fitness_avg.push(stats.fitness_avg);
        self.fitness_std.push(stats.fitness_std);
    }

    /// Number of recorded generations.
    pub fn len(&self) -> usize {
        self.iteration.len()
    }

    /// Returns `true` if no generation was recorded.
    pub fn is_empty(&self) -> bool {
        self.iteration.is_empty()
    }

    /// Statistics of the most recent generation.
    pub fn last(&self) -> Option<GenerationStats> {
        self.len().checked_sub(1).map(|i| self.row(i))
    }

    /// Iterates over recorded generations in order.
    pub fn rows(&self) -> impl Iterator<Item = GenerationStats> + '_ {
        (0..self.len()).map(move |i| self.row(i))
    }

    fn row(&self, i: usize) -> GenerationStats {
        GenerationStats {
            iteration: self.iteration[i],
            max_fitness: self.max_fitness[i],
            min_fitness: self.min_fitness[i],
            fitness_avg: self.fitness_avg[i],
            fitness_std: self.fitness_std[i],
        }
    }

    /// Key → column view with the fixed [`HISTORY_KEYS`].
    pub fn to_map(&self) -> BTreeMap<&'static str, Vec<f64>> {
        let mut map = BTreeMap::new();
        map.insert(
            HISTORY_KEYS[0],
            self.iteration.iter().map(|&i| i as f64).collect(),
        );
        map.insert(HISTORY_KEYS[1], self.max_fitness.clone());
        map.insert(HISTORY_KEYS[2], self.min_fitness.clone());
        map.insert(HISTORY_KEYS[3], self.fitness_avg.clone());
        map.insert(HISTORY_KEYS[4], self.fitness_std.clone());
        map
    }

    /// Writes a header line and one comma-separated row per generation.
    ///
    /// # Errors
    /// Propagates I/O errors from `writer`.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "{}", HISTORY_KEYS.join(","))?;
        for row in self.rows() {
            writeln!(
                writer,
                "{},{},{},{},{}",
                row.iteration, row.max_fitness, row.min_fitness, row.fitness_avg, row.fitness_std
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Saves the history as `history_<unix millis>.csv` inside `dir`.
    ///
    /// Returns the path of the written file.
    ///
    /// # Errors
    /// Propagates file creation and write errors.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let path = dir.as_ref().join(format!("history_{stamp}.csv"));
        let file = std::fs::File::create(&path)?;
        self.write_csv(std::io::BufWriter::new(file))?;
        log::debug!("saved {} history rows to {}", self.len(), path.display());
        Ok(path)
    }
}

impl std::fmt::Display for GenerationStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "iteration: {} // max_fitness: {} // min_fitness: {} // fitness_avg: {} // fitness_std: {}",
            self.iteration, self.max_fitness, self.min_fitness, self.fitness_avg, self.fitness_std
        )
    }
}
