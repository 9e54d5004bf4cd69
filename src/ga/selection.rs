//! Selection strategies for the GA.
//!
//! A selection strategy reads the whole population and returns the records
//! that survive into the next generation's pool, possibly with repetition.
//! The returned pool is not population-sized; the optimizer concatenates
//! the output of every configured strategy and expands the result back to
//! the target size by cloning.
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - De Jong (1975), elitist strategies

use super::population::{Individual, Population};
use super::types::Gene;
use crate::error::{Error, Result};
use rand::{Rng, RngCore};
use std::sync::Arc;

/// A user-defined selection policy.
///
/// Implementations must not keep references into the population between
/// calls; everything they return is an owned copy.
pub trait SelectionStrategy<G: Gene>: Send + Sync + std::fmt::Debug {
    /// Chooses individuals from `population`.
    fn select(&self, population: &Population<G>, rng: &mut dyn RngCore) -> Vec<Individual<G>>;
}

/// Selection strategy with its configuration.
///
/// All built-in strategies assume **maximization** (higher fitness = better).
///
/// # Examples
///
/// ```
/// use u_strand::ga::Selection;
///
/// // Keep the top 10% unchanged and protected for one generation
/// let elite: Selection<i32> = Selection::Elitism { fraction: 0.1 };
///
/// // Fitness-proportionate draw of 10% of the population
/// let roulette: Selection<i32> = Selection::from_name("roulette", 0.1).unwrap();
/// ```
#[derive(Debug, Clone)]
pub enum Selection<G> {
    /// Every individual, unchanged.
    Identity,

    /// Each individual independently with fixed `probability`.
    ///
    /// The output size is binomially distributed around
    /// `probability * population_size`.
    Random {
        /// Inclusion probability per individual.
        probability: f64,
    },

    /// Fitness-proportionate (roulette wheel) selection with replacement.
    ///
    /// Draws `floor(population_size * fraction)` individuals, each with
    /// probability `fitness / sum(fitness)`. Negative fitness counts as 0.
    /// When no individual has positive fitness the draw is uniform.
    ///
    /// # Complexity
    /// O(n) per draw (linear scan)
    Roulette {
        /// Fraction of the population to draw.
        fraction: f64,
    },

    /// The `floor(population_size * fraction)` fittest individuals.
    ///
    /// Returned genotypes are marked protected, exempting them from
    /// mutation and crossover for one generation.
    Elitism {
        /// Fraction of the population to keep.
        fraction: f64,
    },

    /// A user-supplied strategy.
    Custom(Arc<dyn SelectionStrategy<G>>),
}

impl<G: Gene> Selection<G> {
    /// Maps a method name to a strategy.
    ///
    /// Recognized names: `"roulette"` and `"elitism"` (both taking
    /// `fraction`), `"random"` (taking `fraction` as its probability) and
    /// `"identity"`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownSelection`] for any other name.
    pub fn from_name(name: &str, fraction: f64) -> Result<Self> {
        match name {
            "roulette" => Ok(Selection::Roulette { fraction }),
            "elitism" => Ok(Selection::Elitism { fraction }),
            "random" => Ok(Selection::Random {
                probability: fraction,
            }),
            "identity" => Ok(Selection::Identity),
            other => Err(Error::UnknownSelection(other.to_string())),
        }
    }

    /// Wraps a custom strategy.
    pub fn custom<S: SelectionStrategy<G> + 'static>(strategy: S) -> Self {
        Selection::Custom(Arc::new(strategy))
    }

    /// Selects individuals from `population`.
    ///
    /// Every returned record is an independent copy.
    pub fn select<R: Rng>(&self, population: &Population<G>, rng: &mut R) -> Vec<Individual<G>> {
        match self {
            Selection::Identity => population.individuals().to_vec(),
            Selection::Random { probability } => random(population, *probability, rng),
            Selection::Roulette { fraction } => roulette(population, *fraction, rng),
            Selection::Elitism { fraction } => elitism(population, *fraction),
            Selection::Custom(strategy) => strategy.select(population, rng),
        }
    }
}

/// `floor(population_size * fraction)`, clamped to the population size.
fn fraction_count(population_size: usize, fraction: f64) -> usize {
    let count = (population_size as f64 * fraction.max(0.0)).floor() as usize;
    count.min(population_size)
}

/// Copy of a selected record that later operators may alter.
fn unprotected<G: Gene>(individual: &Individual<G>) -> Individual<G> {
    let mut copy = individual.clone();
    copy.genotype.set_protected(false);
    copy
}

fn random<G: Gene, R: Rng>(population: &Population<G>, probability: f64, rng: &mut R) -> Vec<Individual<G>> {
    population
        .individuals()
        .iter()
        .filter(|_| rng.random_range(0.0..1.0) < probability)
        .map(unprotected)
        .collect()
}

/// Roulette wheel over non-negative fitness with uniform fallback.
fn roulette<G: Gene, R: Rng>(population: &Population<G>, fraction: f64, rng: &mut R) -> Vec<Individual<G>> {
    let individuals = population.individuals();
    let n = individuals.len();
    let count = fraction_count(n, fraction);
    if count == 0 {
        return Vec::new();
    }

    let weights: Vec<f64> = individuals.iter().map(|ind| ind.fitness.max(0.0)).collect();
    let total: f64 = weights.iter().sum();

    let mut selected = Vec::with_capacity(count);
    for _ in 0..count {
        let idx = if total <= 0.0 || !total.is_finite() {
            rng.random_range(0..n)
        } else {
            spin(&weights, total, rng)
        };
        selected.push(unprotected(&individuals[idx]));
    }
    selected
}

fn spin<R: Rng>(weights: &[f64], total: f64, rng: &mut R) -> usize {
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }

    // floating-point fallback: last individual with positive weight
    weights.iter().rposition(|&w| w > 0.0).unwrap_or(weights.len() - 1)
}

fn elitism<G: Gene>(population: &Population<G>, fraction: f64) -> Vec<Individual<G>> {
    let count = fraction_count(population.population_size(), fraction);
    let mut elites = population.retrieve_best(count);
    for elite in elites.iter_mut() {
        elite.genotype.set_protected(true);
    }
    elites
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::{Genome, Genotype, Initialization};
    use crate::random::create_rng;

    fn population_with_fitness(fitness: &[f64]) -> Population<i32> {
        let mut rng = create_rng(0);
        let mut pop = Population::new(
            fitness.len(),
            &[1],
            (0..fitness.len() as i32).collect(),
            Initialization::Zeros,
            &mut rng,
        )
        .unwrap();
        // Tag each genome with its index so selections can be traced back
        let individuals = pop
            .individuals()
            .iter()
            .enumerate()
            .map(|(i, ind)| {
                let genome = Genome::new(vec![1], vec![i as i32]).unwrap();
                let mut genotype = Genotype::from_genome(genome, ind.genotype.gene_vals().to_vec());
                genotype.set_fitness(fitness[i]).unwrap();
                Individual::new(genotype)
            })
            .collect();
        pop.replace_individuals(individuals).unwrap();
        pop
    }

    fn tag(ind: &Individual<i32>) -> usize {
        ind.genotype.genome()[0] as usize
    }

    #[test]
    fn test_identity_returns_everything() {
        let pop = population_with_fitness(&[0.1, 0.2, 0.3]);
        let mut rng = create_rng(1);
        let selected = Selection::Identity.select(&pop, &mut rng);
        assert_eq!(selected.as_slice(), pop.individuals());
    }

    #[test]
    fn test_random_selection_size() {
        let pop = population_with_fitness(&vec![0.5; 2000]);
        let mut rng = create_rng(2);
        for p in [0.1, 0.5, 0.9] {
            let selected = Selection::Random { probability: p }.select(&pop, &mut rng);
            let ratio = selected.len() as f64 / 2000.0;
            assert!((ratio - p).abs() < 0.05, "p={p}, ratio={ratio}");
        }
    }

    #[test]
    fn test_roulette_count() {
        let pop = population_with_fitness(&[0.1; 100]);
        let mut rng = create_rng(3);
        assert_eq!(Selection::Roulette { fraction: 0.1 }.select(&pop, &mut rng).len(), 10);
        assert_eq!(Selection::Roulette { fraction: 0.0 }.select(&pop, &mut rng).len(), 0);
        assert_eq!(Selection::Roulette { fraction: 0.25 }.select(&pop, &mut rng).len(), 25);
    }

    #[test]
    fn test_roulette_zero_fitness_is_uniform() {
        let pop = population_with_fitness(&[0.0; 4]);
        let mut rng = create_rng(4);
        let mut counts = [0u32; 4];
        let trials = 5000;
        for _ in 0..trials {
            for ind in (Selection::Roulette { fraction: 1.0 }).select(&pop, &mut rng) {
                counts[tag(&ind)] += 1;
            }
        }
        let total = (trials * 4) as f64;
        for &c in &counts {
            let freq = c as f64 / total;
            assert!((freq - 0.25).abs() < 0.02, "expected uniform, got {counts:?}");
        }
    }

    #[test]
    fn test_roulette_proportional() {
        let pop = population_with_fitness(&[1.0, 3.0]);
        let mut rng = create_rng(5);
        let mut counts = [0u32; 2];
        for _ in 0..5000 {
            for ind in (Selection::Roulette { fraction: 1.0 }).select(&pop, &mut rng) {
                counts[tag(&ind)] += 1;
            }
        }
        let freq = counts[1] as f64 / 10000.0;
        assert!((freq - 0.75).abs() < 0.03, "expected ~0.75, got {freq}");
    }

    #[test]
    fn test_roulette_keeps_dominant_individual() {
        let mut fitness = vec![0.0; 50];
        fitness[17] = 1.0;
        let pop = population_with_fitness(&fitness);
        let mut rng = create_rng(6);
        let selected = Selection::Roulette { fraction: 0.1 }.select(&pop, &mut rng);
        assert_eq!(selected.len(), 5);
        assert!(selected.iter().all(|ind| tag(ind) == 17));
        assert!(selected.iter().all(|ind| ind.fitness == 1.0));
    }

    #[test]
    fn test_roulette_negative_fitness_ignored() {
        let pop = population_with_fitness(&[-5.0, 2.0, -1.0]);
        let mut rng = create_rng(7);
        let selected = Selection::Roulette { fraction: 1.0 }.select(&pop, &mut rng);
        assert!(selected.iter().all(|ind| tag(ind) == 1));
    }

    #[test]
    fn test_roulette_copies_are_independent() {
        let mut fitness = vec![0.0; 10];
        fitness[3] = 1.0;
        let pop = population_with_fitness(&fitness);
        let mut rng = create_rng(8);
        let mut selected = Selection::Roulette { fraction: 0.5 }.select(&pop, &mut rng);
        selected[0].genotype.genome_mut()[0] = 9;
        assert_eq!(tag(&selected[1]), 3);
        assert_eq!(tag(&pop.individuals()[3]), 3);
    }

    #[test]
    fn test_elitism_takes_best_and_protects() {
        let pop = population_with_fitness(&[0.1, 0.9, 0.4, 0.8, 0.2, 0.7, 0.3, 0.6, 0.5, 0.0]);
        let mut rng = create_rng(9);
        let elites = Selection::Elitism { fraction: 0.3 }.select(&pop, &mut rng);
        let tags: Vec<usize> = elites.iter().map(tag).collect();
        assert_eq!(tags, vec![1, 3, 5]);
        assert!(elites.iter().all(|ind| ind.genotype.is_protected()));
        // Live population is untouched
        assert!(pop.genotypes().all(|g| !g.is_protected()));
    }

    #[test]
    fn test_from_name() {
        assert!(matches!(
            Selection::<i32>::from_name("roulette", 0.2),
            Ok(Selection::Roulette { fraction }) if fraction == 0.2
        ));
        assert!(matches!(
            Selection::<i32>::from_name("elitism", 0.1),
            Ok(Selection::Elitism { .. })
        ));
        assert!(matches!(
            Selection::<i32>::from_name("tournament", 0.1),
            Err(Error::UnknownSelection(name)) if name == "tournament"
        ));
    }

    #[derive(Debug)]
    struct FirstOnly;

    impl SelectionStrategy<i32> for FirstOnly {
        fn select(&self, population: &Population<i32>, _rng: &mut dyn RngCore) -> Vec<Individual<i32>> {
            population.individuals().iter().take(1).cloned().collect()
        }
    }

    #[test]
    fn test_custom_strategy() {
        let pop = population_with_fitness(&[0.3, 0.6]);
        let mut rng = create_rng(10);
        let selected = Selection::custom(FirstOnly).select(&pop, &mut rng);
        assert_eq!(selected.len(), 1);
        assert_eq!(tag(&selected[0]), 0);
    }

    #[test]
    fn test_empty_population() {
        let pop = population_with_fitness(&[]);
        let mut rng = create_rng(11);
        assert!(Selection::Roulette { fraction: 0.5 }.select(&pop, &mut rng).is_empty());
        assert!(Selection::Elitism { fraction: 0.5 }.select(&pop, &mut rng).is_empty());
        assert!(Selection::Random { probability: 1.0 }.select(&pop, &mut rng).is_empty());
    }
}
