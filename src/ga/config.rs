//! Optimizer configuration.
//!
//! [`OptimizerConfig`] holds every parameter that controls the generational
//! loop. Strategy objects that cannot be expressed as plain data (custom
//! selections) are attached to the [`Optimizer`](super::Optimizer) itself.

use super::operators::Mutation;
use std::path::PathBuf;

/// Configuration for the [`Optimizer`](super::Optimizer).
///
/// # Defaults
///
/// ```
/// use u_strand::ga::OptimizerConfig;
///
/// let config = OptimizerConfig::default();
/// assert_eq!(config.max_iterations, 1000);
/// assert_eq!(config.selection_methods, vec!["roulette".to_string()]);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_strand::ga::{Mutation, OptimizerConfig};
///
/// let config = OptimizerConfig::default()
///     .with_max_iterations(500)
///     .with_mutation_ops(vec![Mutation::point(0.1), Mutation::block(0.05, 3)])
///     .with_crossover_prob(0.5)
///     .with_selection_methods(["roulette", "elitism"])
///     .with_selected_fraction(0.1)
///     .with_seed(42);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OptimizerConfig {
    /// Upper bound on the number of generations.
    pub max_iterations: usize,

    /// Point-mutation probability used when `mutation_ops` is empty.
    pub mutation_prob: f64,

    /// Mutation operators applied, in order, to every unprotected genotype.
    ///
    /// Empty means a single [`Mutation::point`] with `mutation_prob`.
    pub mutation_ops: Vec<Mutation>,

    /// Probability that an unprotected individual is crossed (0 disables).
    pub crossover_prob: f64,

    /// Named selection strategies applied each generation, in order.
    ///
    /// Recognized: `"roulette"`, `"elitism"`, `"random"`, `"identity"`.
    pub selection_methods: Vec<String>,

    /// Fraction of the population retained by each named strategy.
    pub selected_fraction: f64,

    /// Evaluate fitness on a worker pool.
    pub parallelize: bool,

    /// Worker threads for parallel evaluation. `None` uses one per core.
    pub num_threads: Option<usize>,

    /// Wait budget for one generation's parallel evaluation, in milliseconds.
    pub evaluation_timeout_ms: u64,

    /// Directory receiving the history CSV at the end of a run.
    pub log_path: Option<PathBuf>,

    /// Log every generation's statistics at info level (debug otherwise).
    pub verbose: bool,

    /// Random seed for reproducibility. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            mutation_prob: 0.001,
            mutation_ops: Vec::new(),
            crossover_prob: 0.0,
            selection_methods: vec!["roulette".to_string()],
            selected_fraction: 0.1,
            parallelize: false,
            num_threads: None,
            evaluation_timeout_ms: 5_000,
            log_path: None,
            verbose: false,
            seed: None,
        }
    }
}

impl OptimizerConfig {
    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the default point-mutation probability.
    pub fn with_mutation_prob(mut self, prob: f64) -> Self {
        self.mutation_prob = prob.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation operators.
    pub fn with_mutation_ops(mut self, ops: Vec<Mutation>) -> Self {
        self.mutation_ops = ops;
        self
    }

    /// Sets the crossover probability.
    pub fn with_crossover_prob(mut self, prob: f64) -> Self {
        self.crossover_prob = prob.clamp(0.0, 1.0);
        self
    }

    /// Sets the named selection strategies.
    pub fn with_selection_methods<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection_methods = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the fraction retained by named selection strategies.
    pub fn with_selected_fraction(mut self, fraction: f64) -> Self {
        self.selected_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallelize(mut self, parallelize: bool) -> Self {
        self.parallelize = parallelize;
        self
    }

    /// Sets the worker count for parallel evaluation.
    pub fn with_num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    /// Sets the parallel evaluation wait budget.
    pub fn with_evaluation_timeout_ms(mut self, ms: u64) -> Self {
        self.evaluation_timeout_ms = ms;
        self
    }

    /// Sets the history output directory.
    pub fn with_log_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Enables or disables per-generation info logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Mutation operators actually applied each generation.
    pub fn effective_mutation_ops(&self) -> Vec<Mutation> {
        if self.mutation_ops.is_empty() {
            vec![Mutation::point(self.mutation_prob)]
        } else {
            self.mutation_ops.clone()
        }
    }

    /// Preset for quick exploratory runs.
    ///
    /// - Iterations: 200, mutation 0.05, crossover 0.3
    /// - Selection: elitism + roulette at 10%
    pub fn fast() -> Self {
        Self {
            max_iterations: 200,
            mutation_prob: 0.05,
            crossover_prob: 0.3,
            selection_methods: vec!["elitism".to_string(), "roulette".to_string()],
            ..Self::default()
        }
    }

    /// Preset for long runs on larger genomes.
    ///
    /// - Iterations: 5000, mutation 0.1, crossover 0.5
    /// - Selection: elitism + roulette at 20%, parallel evaluation
    pub fn thorough() -> Self {
        Self {
            max_iterations: 5000,
            mutation_prob: 0.1,
            crossover_prob: 0.5,
            selection_methods: vec!["elitism".to_string(), "roulette".to_string()],
            selected_fraction: 0.2,
            parallelize: true,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    /// Selection names are resolved separately by the optimizer.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_iterations == 0 {
            return Err("max_iterations must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.mutation_prob) {
            return Err("mutation_prob must be in [0, 1]".into());
        }
        if !(0.0..=1.0).contains(&self.crossover_prob) {
            return Err("crossover_prob must be in [0, 1]".into());
        }
        if !(0.0..=1.0).contains(&self.selected_fraction) {
            return Err("selected_fraction must be in [0, 1]".into());
        }
        if let Some(op) = self
            .mutation_ops
            .iter()
            .find(|op| !(0.0..=1.0).contains(&op.probability()))
        {
            return Err(format!("mutation operator probability out of range: {op:?}"));
        }
        if self.num_threads == Some(0) {
            return Err("num_threads must be positive or None".into());
        }
        if self.parallelize && self.evaluation_timeout_ms == 0 {
            return Err("evaluation_timeout_ms must be positive".into());
        }
        Ok(())
    }
}
