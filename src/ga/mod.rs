//! Genetic Algorithm toolkit over shaped discrete genomes.
//!
//! Candidate solutions are fixed-shape arrays of symbols drawn from a finite
//! alphabet. The user supplies only a fitness function; initialization,
//! selection, mutation and crossover are handled generically.
//!
//! # Core Traits
//!
//! - [`Gene`]: A symbol that can sit in a genome (integers, floats, `bool`, `char`)
//! - [`FitnessFunction`]: Scores a genome; higher is better, `1.0` is a perfect solution.
//!   [`Inverted`], [`Counted`] and [`SquashedDims`] adapt existing functions
//! - [`SelectionStrategy`]: Plug-in selection policy
//!
//! # Key Types
//!
//! - [`Genome`] / [`Genotype`]: A shaped gene array, and that array bundled with its alphabet
//! - [`Population`]: Ordered individuals with shared layout and fitness statistics
//! - [`Mutation`]: Point, block, permutation and shift operators
//! - [`OptimizerConfig`]: Algorithm parameters (budget, probabilities, presets)
//! - [`Optimizer`]: Executes the evolutionary loop
//! - [`History`]: Per-generation fitness statistics
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Syswerda (1989), *Uniform Crossover in Genetic Algorithms*

mod config;
mod genotype;
mod history;
pub mod operators;
mod population;
mod runner;
mod selection;
mod types;

pub use config::OptimizerConfig;
pub use genotype::{Genome, Genotype};
pub use history::{GenerationStats, History, HISTORY_KEYS};
pub use operators::Mutation;
pub use population::{ExpansionStrategy, Individual, Initialization, Population};
pub use runner::{EvaluationOutcome, Optimizer};
pub use selection::{Selection, SelectionStrategy};
pub use types::{Counted, FitnessFunction, Gene, Inverted, SquashedDims};
