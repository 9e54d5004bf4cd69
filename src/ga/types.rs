//! Core trait definitions for the GA toolkit.
//!
//! [`Gene`] describes one symbol of a genome; [`FitnessFunction`] is the
//! contract between the generic evolutionary loop and the problem being
//! optimized.
//!
//! # Adapters
//!
//! - [`Inverted`]: turns a loss (lower is better) into a fitness via `1 / (1 + loss)`
//! - [`Counted`]: counts evaluations, safe under parallel evaluation
//! - [`SquashedDims`]: sums equal-length chunks of the genome before scoring

use super::genotype::Genome;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A symbol that may occupy one position of a genome.
///
/// Genes are compared by equality only: the set of permitted values is
/// owned by each genotype and mutation operators draw replacements from it.
///
/// Built-in implementations cover the primitive integer and float types,
/// `bool`, and `char`.
pub trait Gene: Copy + PartialEq + Send + Sync + std::fmt::Debug + 'static {
    /// The value used for zero-initialized genomes.
    fn zero() -> Self;

    /// Converts the gene to `f64` for bounds checks and statistics.
    fn to_f64(self) -> f64;
}

macro_rules! impl_numeric_gene {
    ($($t:ty),*) => {
        $(
            impl Gene for $t {
                fn zero() -> Self {
                    0 as $t
                }

                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_numeric_gene!(u8, u16, u32, u64, usize, i8, i16, i32, i64, f32, f64);

impl Gene for bool {
    fn zero() -> Self {
        false
    }

    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }
}

impl Gene for char {
    fn zero() -> Self {
        '\0'
    }

    fn to_f64(self) -> f64 {
        self as u32 as f64
    }
}

/// Maps a genome to a scalar fitness.
///
/// Fitness is conventionally normalized to `[0, 1]`. A value of exactly
/// `1.0` marks a perfect solution and stops the optimizer early.
/// Higher fitness is better (maximization).
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: with parallel evaluation enabled
/// the optimizer calls [`evaluate`](FitnessFunction::evaluate) for many
/// genomes at once from a worker pool.
///
/// Any `Fn(&Genome<G>) -> f64` closure that is `Send + Sync` implements
/// this trait.
///
/// ```
/// use u_strand::ga::{FitnessFunction, Genome};
///
/// let target = [0, 1, 0, 1];
/// let matches = move |genome: &Genome<i32>| {
///     let hits = genome.iter().zip(target.iter()).filter(|(a, b)| a == b).count();
///     hits as f64 / target.len() as f64
/// };
///
/// let genome = Genome::new(vec![4], vec![0, 1, 1, 1]).unwrap();
/// assert_eq!(matches.evaluate(&genome), 0.75);
/// ```
pub trait FitnessFunction<G: Gene>: Send + Sync {
    /// Returns the fitness of `genome`.
    fn evaluate(&self, genome: &Genome<G>) -> f64;

    /// Whether `genome` is a known optimum of the problem.
    ///
    /// The optimizer checks the best individual of each generation and
    /// stops early when this returns `true`. Defaults to `false`.
    fn optimum_reached(&self, genome: &Genome<G>) -> bool {
        let _ = genome;
        false
    }
}

impl<G, F> FitnessFunction<G> for F
where
    G: Gene,
    F: Fn(&Genome<G>) -> f64 + Send + Sync,
{
    fn evaluate(&self, genome: &Genome<G>) -> f64 {
        self(genome)
    }
}

// ============================================================================
// Adapters
// ============================================================================

/// Maps a loss to a fitness in `(0, 1]` with `1 / (1 + loss)`.
///
/// A loss of `0.0` becomes fitness `1.0`, which ends the run.
#[derive(Debug, Clone)]
pub struct Inverted<F> {
    inner: F,
}

impl<F> Inverted<F> {
    /// Wraps a loss function.
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    /// The wrapped loss function.
    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<G: Gene, F: FitnessFunction<G>> FitnessFunction<G> for Inverted<F> {
    fn evaluate(&self, genome: &Genome<G>) -> f64 {
        1.0 / (1.0 + self.inner.evaluate(genome))
    }

    fn optimum_reached(&self, genome: &Genome<G>) -> bool {
        self.inner.optimum_reached(genome)
    }
}

/// Counts how many times the wrapped function was evaluated.
#[derive(Debug)]
pub struct Counted<F> {
    inner: F,
    evaluated: AtomicUsize,
}

impl<F> Counted<F> {
    /// Wraps a fitness function with a zeroed counter.
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            evaluated: AtomicUsize::new(0),
        }
    }

    /// Number of evaluations so far.
    pub fn evaluated(&self) -> usize {
        self.evaluated.load(Ordering::Relaxed)
    }

    /// The wrapped function.
    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<G: Gene, F: FitnessFunction<G>> FitnessFunction<G> for Counted<F> {
    fn evaluate(&self, genome: &Genome<G>) -> f64 {
        let value = self.inner.evaluate(genome);
        self.evaluated.fetch_add(1, Ordering::Relaxed);
        value
    }

    fn optimum_reached(&self, genome: &Genome<G>) -> bool {
        self.inner.optimum_reached(genome)
    }
}

/// Reduces a genome to `final_dimension` values before scoring.
///
/// The flat genome is split into `final_dimension` equal consecutive
/// chunks and each chunk is summed (as `f64`). The inner function sees a
/// one-dimensional `Genome<f64>`. Genomes whose length is not a multiple
/// of `final_dimension` score NaN, which the optimizer reports as
/// [`Error::InvalidFitness`](crate::Error::InvalidFitness).
#[derive(Debug, Clone)]
pub struct SquashedDims<F> {
    inner: F,
    final_dimension: usize,
}

impl<F> SquashedDims<F> {
    /// Wraps `inner`, squashing genomes to `final_dimension` values.
    pub fn new(inner: F, final_dimension: usize) -> Self {
        Self {
            inner,
            final_dimension,
        }
    }

    /// Splits and sums `genome`; `None` if it cannot be split evenly.
    pub fn squash<G: Gene>(&self, genome: &Genome<G>) -> Option<Genome<f64>> {
        let d = self.final_dimension;
        if d == 0 || genome.len() % d != 0 {
            return None;
        }
        let chunk = genome.len() / d;
        let sums: Vec<f64> = if chunk == 0 {
            vec![0.0; d]
        } else {
            genome
                .as_slice()
                .chunks(chunk)
                .map(|c| c.iter().map(|g| g.to_f64()).sum())
                .collect()
        };
        Genome::new(vec![d], sums).ok()
    }
}

impl<G: Gene, F: FitnessFunction<f64>> FitnessFunction<G> for SquashedDims<F> {
    fn evaluate(&self, genome: &Genome<G>) -> f64 {
        match self.squash(genome) {
            Some(squashed) => self.inner.evaluate(&squashed),
            None => f64::NAN,
        }
    }

    fn optimum_reached(&self, genome: &Genome<G>) -> bool {
        self.squash(genome)
            .is_some_and(|squashed| self.inner.optimum_reached(&squashed))
    }
}
