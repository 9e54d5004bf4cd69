//! Genetic algorithm toolkit for discrete, array-shaped genomes.
//!
//! Provides the building blocks of a classic generational GA:
//!
//! - **Genomes**: Fixed-shape arrays of symbols from a finite alphabet,
//!   with random, zero or user-supplied initialization.
//! - **Operators**: Point, block, permutation and shift mutation plus
//!   uniform crossover.
//! - **Selection**: Roulette, elitism, random and identity strategies,
//!   addressable by name, or any user-defined [`ga::SelectionStrategy`].
//! - **Optimizer**: The generational loop with optional parallel fitness
//!   evaluation under a wait budget, and a per-generation [`ga::History`].
//!
//! # Quick start
//!
//! ```
//! use u_strand::ga::{Genome, Initialization, Optimizer, OptimizerConfig, Population};
//! use u_strand::random::create_rng;
//!
//! let mut rng = create_rng(1);
//! let population = Population::new(30, &[8], vec![0u8, 1], Initialization::Random, &mut rng).unwrap();
//! let ones = |g: &Genome<u8>| g.iter().filter(|&&x| x == 1).count() as f64 / 8.0;
//!
//! let config = OptimizerConfig::default().with_max_iterations(200).with_seed(1);
//! let history = Optimizer::new(population, ones, config).unwrap().fit().unwrap();
//! assert!(!history.is_empty());
//! ```
//!
//! # Features
//!
//! - `parallel` (default): rayon worker pool for fitness evaluation
//! - `serde`: (de)serialization of configs, genomes and histories

pub mod error;
pub mod ga;
pub mod random;

pub use error::{Error, Result};
