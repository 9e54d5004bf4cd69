//! GA generational loop.
//!
//! [`Optimizer`] drives the run:
//! evaluate → record statistics → check termination → select → mutate →
//! crossover → repeat.
//!
//! The loop stops when a generation reaches a maximum fitness of exactly
//! `1.0` (or its best genome satisfies
//! [`FitnessFunction::optimum_reached`]), when the iteration budget is spent, when parallel evaluation
//! exceeds its wait budget, or when cancelled. None of these is an error;
//! the returned [`History`] records which one happened.

use super::config::OptimizerConfig;
use super::history::{GenerationStats, History};
use super::operators::Mutation;
use super::population::{ExpansionStrategy, Population};
use super::selection::Selection;
use super::types::{FitnessFunction, Gene};
use crate::error::{Error, Result};
use crate::random::{rng_from_seed, GaRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use std::panic::{self, AssertUnwindSafe};
#[cfg(feature = "parallel")]
use std::sync::mpsc;
#[cfg(feature = "parallel")]
use std::time::Duration;

/// Result of one call to [`Optimizer::evaluate_population`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationOutcome {
    /// Every individual received its fitness.
    Completed,
    /// Parallel evaluation exceeded its wait budget; no fitness was written.
    TimedOut,
}

/// Evolves a population against a fitness function.
///
/// # Usage
///
/// ```
/// use u_strand::ga::{Genome, Initialization, Optimizer, OptimizerConfig, Population};
/// use u_strand::random::create_rng;
///
/// let target = [0, 1, 0, 1, 0, 1, 0, 1, 0, 1];
/// let fitness = move |genome: &Genome<i32>| {
///     let hits = genome.iter().zip(target.iter()).filter(|(a, b)| a == b).count();
///     hits as f64 / target.len() as f64
/// };
///
/// let mut rng = create_rng(42);
/// let population = Population::new(100, &[10], vec![0, 1], Initialization::Random, &mut rng).unwrap();
/// let config = OptimizerConfig::default()
///     .with_max_iterations(1000)
///     .with_mutation_prob(0.1)
///     .with_crossover_prob(0.5)
///     .with_seed(42);
///
/// let mut optimizer = Optimizer::new(population, fitness, config).unwrap();
/// let history = optimizer.fit().unwrap();
/// assert!(history.len() <= 1000);
/// ```
pub struct Optimizer<G: Gene, F> {
    population: Population<G>,
    target_size: usize,
    fitness_fn: Arc<F>,
    config: OptimizerConfig,
    selections: Vec<Selection<G>>,
    mutation_ops: Vec<Mutation>,
    rng: GaRng,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl<G, F> Optimizer<G, F>
where
    G: Gene,
    F: FitnessFunction<G> + 'static,
{
    /// Creates an optimizer over `population`.
    ///
    /// Named selection methods are resolved here.
    ///
    /// # Errors
    /// - [`Error::InvalidConfig`] if the configuration does not validate
    ///   or the worker pool cannot be built
    /// - [`Error::UnknownSelection`] for an unrecognized selection name
    /// - [`Error::EmptyPopulation`] if `population` has no individuals
    pub fn new(population: Population<G>, fitness_fn: F, config: OptimizerConfig) -> Result<Self> {
        config.validate().map_err(Error::InvalidConfig)?;
        if population.is_empty() {
            return Err(Error::EmptyPopulation);
        }

        let selections = config
            .selection_methods
            .iter()
            .map(|name| Selection::from_name(name, config.selected_fraction))
            .collect::<Result<Vec<_>>>()?;

        #[cfg(feature = "parallel")]
        let pool = if config.parallelize {
            let mut builder = rayon::ThreadPoolBuilder::new();
            if let Some(n) = config.num_threads {
                builder = builder.num_threads(n);
            }
            Some(
                builder
                    .build()
                    .map_err(|e| Error::InvalidConfig(format!("worker pool: {e}")))?,
            )
        } else {
            None
        };

        #[cfg(not(feature = "parallel"))]
        if config.parallelize {
            log::warn!("built without the `parallel` feature; evaluating sequentially");
        }

        Ok(Self {
            target_size: population.population_size(),
            population,
            fitness_fn: Arc::new(fitness_fn),
            mutation_ops: config.effective_mutation_ops(),
            rng: rng_from_seed(config.seed),
            config,
            selections,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    /// Appends a selection strategy applied after the named ones.
    pub fn with_selection(mut self, selection: Selection<G>) -> Self {
        self.selections.push(selection);
        self
    }

    /// Appends a mutation operator.
    ///
    /// The first call replaces the default point mutation derived from
    /// `mutation_prob`.
    pub fn with_mutation(mut self, op: Mutation) -> Self {
        if self.config.mutation_ops.is_empty() {
            self.mutation_ops.clear();
        }
        self.config.mutation_ops.push(op);
        self.mutation_ops.push(op);
        self
    }

    /// The current population.
    pub fn population(&self) -> &Population<G> {
        &self.population
    }

    /// Consumes the optimizer, returning its population.
    pub fn into_population(self) -> Population<G> {
        self.population
    }

    /// The fitness function, e.g. to read a [`Counted`](super::Counted) total.
    pub fn fitness_fn(&self) -> &F {
        &self.fitness_fn
    }

    /// The configuration in use.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Selection strategies applied each generation, in order.
    pub fn selections(&self) -> &[Selection<G>] {
        &self.selections
    }

    /// Runs the generational loop.
    ///
    /// # Errors
    /// - [`Error::InvalidConfig`] if no selection strategy is configured
    /// - [`Error::InvalidFitness`] if the fitness function returns NaN
    /// - [`Error::EvaluationFailed`] if the fitness function panicked on the worker pool
    /// - [`Error::Io`] if the history cannot be written to `log_path`
    pub fn fit(&mut self) -> Result<History> {
        self.fit_with_cancel(None)
    }

    /// Runs the generational loop with an optional cancellation token.
    ///
    /// The flag is checked before each generation; when set, the run stops
    /// and the statistics gathered so far are returned.
    ///
    /// # Errors
    /// Same as [`fit`](Self::fit).
    pub fn fit_with_cancel(&mut self, cancel: Option<Arc<AtomicBool>>) -> Result<History> {
        if self.selections.is_empty() {
            return Err(Error::InvalidConfig("no selection strategy configured".into()));
        }

        let mut history = History::new();

        for iteration in 0..self.config.max_iterations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    history.cancelled = true;
                    break;
                }
            }

            if self.evaluate_population()? == EvaluationOutcome::TimedOut {
                log::warn!(
                    "population evaluation timed out after {} ms at iteration {iteration}",
                    self.config.evaluation_timeout_ms
                );
                history.timed_out = true;
                break;
            }

            let stats = self.record(iteration)?;
            history.push(stats);
            if self.config.verbose {
                log::info!("{stats}");
            } else {
                log::debug!("{stats}");
            }

            if stats.max_fitness == 1.0 || self.best_is_optimal() {
                history.converged = true;
                break;
            }
            if iteration + 1 == self.config.max_iterations {
                break;
            }

            self.select_genomes()?;
            self.population
                .mutate_genotypes(&self.mutation_ops, &mut self.rng);
            if self.config.crossover_prob > 0.0 {
                self.population
                    .cross_genomes(None, self.config.crossover_prob, &mut self.rng)?;
            }
        }

        if let Some(dir) = &self.config.log_path {
            history.save(dir)?;
        }

        Ok(history)
    }

    fn best_is_optimal(&self) -> bool {
        self.population
            .retrieve_best(1)
            .first()
            .is_some_and(|best| self.fitness_fn.optimum_reached(best.genotype.genome()))
    }

    fn record(&self, iteration: usize) -> Result<GenerationStats> {
        Ok(GenerationStats {
            iteration,
            max_fitness: self.population.max_fitness()?,
            min_fitness: self.population.min_fitness()?,
            fitness_avg: self.population.avg_fitness()?,
            fitness_std: self.population.fitness_std()?,
        })
    }

    /// Evaluates every individual and stores the results.
    ///
    /// With `parallelize` set, genomes are evaluated on the worker pool and
    /// the call waits at most `evaluation_timeout_ms`. On timeout nothing is
    /// written and [`EvaluationOutcome::TimedOut`] is returned; the
    /// abandoned work finishes in the background and is discarded.
    ///
    /// # Errors
    /// - [`Error::InvalidFitness`] if any value is NaN
    /// - [`Error::EvaluationFailed`] if the fitness function panicked on the
    ///   worker pool, or a worker died before reporting
    ///
    /// # Panics
    /// A panicking fitness function propagates when evaluation is sequential.
    pub fn evaluate_population(&mut self) -> Result<EvaluationOutcome> {
        #[cfg(feature = "parallel")]
        if let Some(pool) = &self.pool {
            let genomes: Vec<_> = self
                .population
                .genotypes()
                .map(|g| g.genome().clone())
                .collect();
            let fitness_fn = Arc::clone(&self.fitness_fn);
            let (tx, rx) = mpsc::channel();

            pool.spawn(move || {
                // A panic escaping a spawned job aborts the process
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    genomes
                        .par_iter()
                        .map(|g| fitness_fn.evaluate(g))
                        .collect::<Vec<f64>>()
                }));
                // The receiver is gone if the wait already timed out
                let _ = tx.send(outcome.map_err(|payload| panic_message(payload.as_ref())));
            });

            let budget = Duration::from_millis(self.config.evaluation_timeout_ms);
            return match rx.recv_timeout(budget) {
                Ok(Ok(values)) => {
                    self.population.assign_fitness(&values)?;
                    Ok(EvaluationOutcome::Completed)
                }
                Ok(Err(message)) => Err(Error::EvaluationFailed(format!(
                    "fitness function panicked: {message}"
                ))),
                Err(mpsc::RecvTimeoutError::Timeout) => Ok(EvaluationOutcome::TimedOut),
                Err(mpsc::RecvTimeoutError::Disconnected) => Err(Error::EvaluationFailed(
                    "worker exited without reporting results".into(),
                )),
            };
        }

        let values: Vec<f64> = self
            .population
            .genotypes()
            .map(|g| self.fitness_fn.evaluate(g.genome()))
            .collect();
        self.population.assign_fitness(&values)?;
        Ok(EvaluationOutcome::Completed)
    }

    /// Replaces the population with the selected pool, grown back to the
    /// original size by cloning.
    ///
    /// Strategies are applied in order and their outputs concatenated. A
    /// pool larger than the target keeps its first entries. An empty pool
    /// falls back to the whole current population.
    ///
    /// # Errors
    /// Propagates layout and expansion errors.
    pub fn select_genomes(&mut self) -> Result<()> {
        let mut next = self.population.empty_like();
        for selection in &self.selections {
            next.append_individuals(selection.select(&self.population, &mut self.rng))?;
        }

        if next.is_empty() {
            log::debug!("selection produced no individuals; keeping current population");
            next.append_individuals(self.population.individuals().to_vec())?;
        }
        if next.population_size() > self.target_size {
            let kept = next.individuals()[..self.target_size].to_vec();
            next.replace_individuals(kept)?;
        }

        next.expand_population(self.target_size, ExpansionStrategy::Clone, &mut self.rng)?;
        self.population = next;
        Ok(())
    }
}

#[cfg(feature = "parallel")]
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl<G: Gene, F> std::fmt::Debug for Optimizer<G, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Optimizer")
            .field("population_size", &self.population.population_size())
            .field("target_size", &self.target_size)
            .field("config", &self.config)
            .field("selections", &self.selections)
            .field("mutation_ops", &self.mutation_ops)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
