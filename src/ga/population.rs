//! Populations of evaluated genotypes.
//!
//! A [`Population`] owns an ordered list of [`Individual`] records and the
//! configuration needed to synthesize new ones. Bulk operations (mutation,
//! crossover, expansion, best-of retrieval, fitness statistics) live here so
//! the optimizer only sequences them.

use super::genotype::{Genome, Genotype};
use super::operators::Mutation;
use super::types::Gene;
use crate::error::{Error, Result};
use rand::Rng;

/// One population slot: a genotype and its recorded fitness.
///
/// The record fitness and the genotype's own fitness are kept in step by
/// [`Individual::set_fitness`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(deserialize = "G: Gene + serde::Deserialize<'de>"))
)]
pub struct Individual<G> {
    /// Fitness recorded by the last evaluation.
    pub fitness: f64,
    /// The candidate solution.
    pub genotype: Genotype<G>,
}

impl<G: Gene> Individual<G> {
    /// Wraps a genotype, taking its current fitness as the record fitness.
    pub fn new(genotype: Genotype<G>) -> Self {
        Self {
            fitness: genotype.fitness(),
            genotype,
        }
    }

    /// Sets the fitness on both the record and the genotype.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFitness`] if `fitness` is NaN.
    pub fn set_fitness(&mut self, fitness: f64) -> Result<()> {
        self.genotype.set_fitness(fitness)?;
        self.fitness = fitness;
        Ok(())
    }
}

/// How genomes are filled when a population synthesizes individuals.
#[derive(Debug, Clone, PartialEq)]
pub enum Initialization<G> {
    /// Genes drawn uniformly from the gene values.
    Random,
    /// Every gene set to [`Gene::zero`].
    Zeros,
    /// Copies of the given genome.
    Default(Genome<G>),
}

/// How [`Population::expand_population`] creates the missing individuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpansionStrategy {
    /// Clone randomly chosen existing individuals (with replacement).
    ///
    /// Clones have their protection flag cleared.
    #[default]
    Clone,
    /// Synthesize fresh individuals from the initialization settings.
    Random,
}

/// An ordered collection of individuals evolved together.
///
/// # Examples
///
/// ```
/// use u_strand::ga::{Initialization, Population};
/// use u_strand::random::create_rng;
///
/// let mut rng = create_rng(42);
/// let population = Population::new(50, &[10], vec![0, 1], Initialization::Random, &mut rng).unwrap();
/// assert_eq!(population.population_size(), 50);
/// ```
#[derive(Debug, Clone)]
pub struct Population<G> {
    individuals: Vec<Individual<G>>,
    genome_shapes: Vec<Vec<usize>>,
    gene_values: Vec<G>,
    initialization: Initialization<G>,
}

impl<G: Gene> Population<G> {
    /// Creates `size` individuals sharing one genome shape.
    ///
    /// # Errors
    /// - [`Error::EmptyGeneValues`] for random init with no gene values
    /// - [`Error::ShapeMismatch`] if a default genome has another shape
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        shape: &[usize],
        gene_values: Vec<G>,
        initialization: Initialization<G>,
        rng: &mut R,
    ) -> Result<Self> {
        let mut population =
            Self::with_shapes(vec![shape.to_vec(); size], gene_values, initialization, rng)?;
        if size == 0 {
            population.genome_shapes = vec![shape.to_vec()];
        }
        Ok(population)
    }

    /// Creates one individual per entry of `genome_shapes`.
    ///
    /// # Errors
    /// Same as [`Population::new`].
    pub fn with_shapes<R: Rng + ?Sized>(
        genome_shapes: Vec<Vec<usize>>,
        gene_values: Vec<G>,
        initialization: Initialization<G>,
        rng: &mut R,
    ) -> Result<Self> {
        let mut population = Self {
            individuals: Vec::with_capacity(genome_shapes.len()),
            genome_shapes,
            gene_values,
            initialization,
        };
        for slot in 0..population.genome_shapes.len() {
            let genotype = population.synthesize(slot, rng)?;
            population.individuals.push(Individual::new(genotype));
        }
        Ok(population)
    }

    /// Builds a population around already existing individuals.
    ///
    /// New individuals synthesized later use `shape` and random init.
    ///
    /// # Errors
    /// Returns [`Error::LayoutMismatch`] if an individual does not fit the
    /// shape or gene values.
    pub fn from_individuals(
        individuals: Vec<Individual<G>>,
        shape: &[usize],
        gene_values: Vec<G>,
    ) -> Result<Self> {
        let mut population = Self {
            individuals: Vec::new(),
            genome_shapes: vec![shape.to_vec()],
            gene_values,
            initialization: Initialization::Random,
        };
        population.replace_individuals(individuals)?;
        Ok(population)
    }

    /// An empty population with the same shapes, gene values and
    /// initialization settings.
    pub fn empty_like(&self) -> Self {
        Self {
            individuals: Vec::new(),
            genome_shapes: self.genome_shapes.clone(),
            gene_values: self.gene_values.clone(),
            initialization: self.initialization.clone(),
        }
    }

    fn synthesize<R: Rng + ?Sized>(&self, slot: usize, rng: &mut R) -> Result<Genotype<G>> {
        let shape = self.slot_shape(slot);
        match &self.initialization {
            Initialization::Random => Genotype::random(shape, self.gene_values.clone(), rng),
            Initialization::Zeros => Ok(Genotype::new(shape, self.gene_values.clone())),
            Initialization::Default(genome) => {
                Genotype::construct(shape, false, self.gene_values.clone(), Some(genome), rng)
            }
        }
    }

    fn slot_shape(&self, slot: usize) -> &[usize] {
        if self.genome_shapes.is_empty() {
            &[]
        } else {
            &self.genome_shapes[slot % self.genome_shapes.len()]
        }
    }

    // ---- Accessors ----

    /// Number of individuals.
    pub fn population_size(&self) -> usize {
        self.individuals.len()
    }

    /// Returns `true` if there are no individuals.
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// The individuals, in population order.
    pub fn individuals(&self) -> &[Individual<G>] {
        &self.individuals
    }

    /// Genotypes in population order.
    pub fn genotypes(&self) -> impl Iterator<Item = &Genotype<G>> {
        self.individuals.iter().map(|ind| &ind.genotype)
    }

    /// Configured genome shape per slot.
    pub fn genome_shapes(&self) -> &[Vec<usize>] {
        &self.genome_shapes
    }

    /// Gene values shared by the population.
    pub fn gene_values(&self) -> &[G] {
        &self.gene_values
    }

    // ---- Replacement ----

    /// Replaces all individuals.
    ///
    /// On error the current individuals are left untouched.
    ///
    /// # Errors
    /// Returns [`Error::LayoutMismatch`] if any incoming individual has a
    /// genome shape not configured for this population, different gene
    /// values, or a NaN fitness.
    pub fn replace_individuals(&mut self, individuals: Vec<Individual<G>>) -> Result<()> {
        self.check_layout(&individuals)?;
        self.individuals = individuals;
        Ok(())
    }

    /// Appends individuals after validating them like
    /// [`replace_individuals`](Self::replace_individuals).
    ///
    /// # Errors
    /// Returns [`Error::LayoutMismatch`] on an incompatible individual.
    pub fn append_individuals(&mut self, individuals: Vec<Individual<G>>) -> Result<()> {
        self.check_layout(&individuals)?;
        self.individuals.extend(individuals);
        Ok(())
    }

    fn check_layout(&self, individuals: &[Individual<G>]) -> Result<()> {
        for (i, ind) in individuals.iter().enumerate() {
            let shape = ind.genotype.shape();
            if !self.genome_shapes.is_empty() && !self.genome_shapes.iter().any(|s| s == shape) {
                return Err(Error::LayoutMismatch(format!(
                    "individual {i} has genome shape {shape:?}, expected one of {:?}",
                    self.genome_shapes
                )));
            }
            if ind.genotype.gene_vals() != self.gene_values.as_slice() {
                return Err(Error::LayoutMismatch(format!(
                    "individual {i} has gene values {:?}, expected {:?}",
                    ind.genotype.gene_vals(),
                    self.gene_values
                )));
            }
            if ind.fitness.is_nan() {
                return Err(Error::LayoutMismatch(format!("individual {i} has NaN fitness")));
            }
        }
        Ok(())
    }

    /// Writes one fitness value per individual, in order.
    ///
    /// Either every value is committed or none is.
    ///
    /// # Errors
    /// - [`Error::LayoutMismatch`] if the number of values differs
    /// - [`Error::InvalidFitness`] if any value is NaN
    pub fn assign_fitness(&mut self, fitness: &[f64]) -> Result<()> {
        if fitness.len() != self.individuals.len() {
            return Err(Error::LayoutMismatch(format!(
                "{} fitness values for {} individuals",
                fitness.len(),
                self.individuals.len()
            )));
        }
        if let Some(&bad) = fitness.iter().find(|f| f.is_nan()) {
            return Err(Error::InvalidFitness(bad));
        }
        for (ind, &f) in self.individuals.iter_mut().zip(fitness) {
            ind.set_fitness(f)?;
        }
        Ok(())
    }

    // ---- Genetic operators ----

    /// Applies every operator in `operators`, in order, to each unprotected
    /// genotype.
    pub fn mutate_genotypes<R: Rng + ?Sized>(&mut self, operators: &[Mutation], rng: &mut R) {
        for ind in self.individuals.iter_mut() {
            if ind.genotype.is_protected() {
                continue;
            }
            for op in operators {
                ind.genotype.mutate(op, rng);
            }
        }
    }

    /// Crosses unprotected individuals with random partners.
    ///
    /// Each unprotected individual is, with probability `crossover_prob`,
    /// replaced by its crossover with a partner drawn uniformly from
    /// `secondary` (or from a snapshot of this population's genotypes when
    /// `None`, so an individual may be paired with itself). Partners with a
    /// different genome shape are not considered.
    ///
    /// # Errors
    /// - [`Error::LayoutMismatch`] if a `secondary` partner draws from
    ///   other gene values; nothing is crossed in that case
    /// - other crossover errors are propagated
    pub fn cross_genomes<R: Rng + ?Sized>(
        &mut self,
        secondary: Option<&[Genotype<G>]>,
        crossover_prob: f64,
        rng: &mut R,
    ) -> Result<()> {
        if crossover_prob <= 0.0 {
            return Ok(());
        }

        let snapshot: Vec<Genotype<G>>;
        let partners = match secondary {
            Some(partners) => {
                if let Some((i, p)) = partners
                    .iter()
                    .enumerate()
                    .find(|(_, p)| p.gene_vals() != self.gene_values.as_slice())
                {
                    return Err(Error::LayoutMismatch(format!(
                        "partner {i} has gene values {:?}, expected {:?}",
                        p.gene_vals(),
                        self.gene_values
                    )));
                }
                partners
            }
            None => {
                snapshot = self.genotypes().cloned().collect();
                &snapshot
            }
        };

        // Single-shape populations share one candidate list
        let shared: Option<Vec<&Genotype<G>>> = match self.genome_shapes.as_slice() {
            [shape] => Some(
                partners
                    .iter()
                    .filter(|p| p.shape() == shape.as_slice())
                    .collect(),
            ),
            _ => None,
        };

        for ind in self.individuals.iter_mut() {
            if ind.genotype.is_protected() || rng.random_range(0.0..1.0) >= crossover_prob {
                continue;
            }
            let filtered: Vec<&Genotype<G>>;
            let candidates = match &shared {
                Some(candidates) => candidates.as_slice(),
                None => {
                    filtered = partners
                        .iter()
                        .filter(|p| p.shape() == ind.genotype.shape())
                        .collect();
                    filtered.as_slice()
                }
            };
            if candidates.is_empty() {
                continue;
            }
            let partner = candidates[rng.random_range(0..candidates.len())];
            let descendant = ind.genotype.crossover(partner, rng)?;
            *ind = Individual::new(descendant);
        }
        Ok(())
    }

    /// Grows the population to `target_size` individuals.
    ///
    /// Does nothing if the population is already at least that large.
    ///
    /// # Errors
    /// - [`Error::EmptyPopulation`] when cloning from an empty population
    /// - construction errors from [`ExpansionStrategy::Random`]
    pub fn expand_population<R: Rng + ?Sized>(
        &mut self,
        target_size: usize,
        strategy: ExpansionStrategy,
        rng: &mut R,
    ) -> Result<()> {
        let current = self.individuals.len();
        if target_size <= current {
            return Ok(());
        }
        let missing = target_size - current;
        self.individuals.reserve(missing);

        match strategy {
            ExpansionStrategy::Clone => {
                if current == 0 {
                    return Err(Error::EmptyPopulation);
                }
                for _ in 0..missing {
                    let source = &self.individuals[rng.random_range(0..current)];
                    let mut genotype = source.genotype.clone_genotype();
                    genotype.set_protected(false);
                    self.individuals.push(Individual::new(genotype));
                }
            }
            ExpansionStrategy::Random => {
                for slot in current..target_size {
                    let genotype = self.synthesize(slot, rng)?;
                    self.individuals.push(Individual::new(genotype));
                }
            }
        }
        Ok(())
    }

    /// The `n` fittest individuals, best first, as independent copies.
    ///
    /// Ties keep population order. Returns fewer than `n` if the population
    /// is smaller.
    pub fn retrieve_best(&self, n: usize) -> Vec<Individual<G>> {
        let mut order: Vec<usize> = (0..self.individuals.len()).collect();
        // Stable sort: equal fitness keeps original order
        order.sort_by(|&a, &b| {
            self.individuals[b]
                .fitness
                .partial_cmp(&self.individuals[a].fitness)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order
            .into_iter()
            .take(n)
            .map(|i| self.individuals[i].clone())
            .collect()
    }

    // ---- Statistics ----

    fn fitness_values(&self) -> Result<impl Iterator<Item = f64> + '_> {
        if self.individuals.is_empty() {
            return Err(Error::EmptyPopulation);
        }
        Ok(self.individuals.iter().map(|ind| ind.fitness))
    }

    /// Mean fitness.
    ///
    /// # Errors
    /// Returns [`Error::EmptyPopulation`] if there are no individuals.
    pub fn avg_fitness(&self) -> Result<f64> {
        let sum: f64 = self.fitness_values()?.sum();
        Ok(sum / self.individuals.len() as f64)
    }

    /// Highest fitness.
    ///
    /// # Errors
    /// Returns [`Error::EmptyPopulation`] if there are no individuals.
    pub fn max_fitness(&self) -> Result<f64> {
        Ok(self.fitness_values()?.fold(f64::NEG_INFINITY, f64::max))
    }

    /// Lowest fitness.
    ///
    /// # Errors
    /// Returns [`Error::EmptyPopulation`] if there are no individuals.
    pub fn min_fitness(&self) -> Result<f64> {
        Ok(self.fitness_values()?.fold(f64::INFINITY, f64::min))
    }

    /// Population standard deviation of fitness.
    ///
    /// # Errors
    /// Returns [`Error::EmptyPopulation`] if there are no individuals.
    pub fn fitness_std(&self) -> Result<f64> {
        let mean = self.avg_fitness()?;
        let var: f64 = self
            .fitness_values()?
            .map(|f| (f - mean) * (f - mean))
            .sum::<f64>()
            / self.individuals.len() as f64;
        Ok(var.sqrt())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn binary_population(size: usize, len: usize, seed: u64) -> Population<i32> {
        let mut rng = create_rng(seed);
        Population::new(size, &[len], vec![0, 1], Initialization::Random, &mut rng).unwrap()
    }

    fn with_fitness(population: &mut Population<i32>, fitness: &[f64]) {
        population.assign_fitness(fitness).unwrap();
    }

    #[test]
    fn test_construction_modes() {
        let mut rng = create_rng(1);

        let zeros = Population::new(5, &[3, 2], vec![0, 1], Initialization::Zeros, &mut rng).unwrap();
        assert_eq!(zeros.population_size(), 5);
        assert!(zeros.genotypes().all(|g| g.genome().iter().all(|&x| x == 0)));
        assert!(zeros.genotypes().all(|g| g.shape() == [3, 2]));

        let seed = Genome::new(vec![3], vec![1, 0, 1]).unwrap();
        let seeded = Population::new(
            4,
            &[3],
            vec![0, 1],
            Initialization::Default(seed.clone()),
            &mut rng,
        )
        .unwrap();
        assert!(seeded.genotypes().all(|g| g.genome() == &seed));

        let random = Population::new(10, &[8], vec![2, 5], Initialization::Random, &mut rng).unwrap();
        assert!(random
            .genotypes()
            .all(|g| g.genome().iter().all(|x| [2, 5].contains(x))));
    }

    #[test]
    fn test_heterogeneous_shapes() {
        let mut rng = create_rng(1);
        let shapes = vec![vec![2], vec![3], vec![2, 2]];
        let pop = Population::with_shapes(shapes.clone(), vec![0, 1], Initialization::Random, &mut rng)
            .unwrap();
        let actual: Vec<Vec<usize>> = pop.genotypes().map(|g| g.shape().to_vec()).collect();
        assert_eq!(actual, shapes);
    }

    #[test]
    fn test_mismatched_default_genome_fails() {
        let mut rng = create_rng(1);
        let seed = Genome::new(vec![2], vec![1, 0]).unwrap();
        let result = Population::new(3, &[3], vec![0, 1], Initialization::Default(seed), &mut rng);
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_replace_with_wrong_layout_keeps_individuals() {
        let mut pop = binary_population(6, 4, 2);
        let before: Vec<Individual<i32>> = pop.individuals().to_vec();

        let wrong_shape = vec![Individual::new(Genotype::new(&[5], vec![0, 1]))];
        assert!(matches!(
            pop.replace_individuals(wrong_shape),
            Err(Error::LayoutMismatch(_))
        ));

        let wrong_vals = vec![Individual::new(Genotype::new(&[4], vec![0, 1, 2]))];
        assert!(matches!(
            pop.replace_individuals(wrong_vals),
            Err(Error::LayoutMismatch(_))
        ));

        assert_eq!(pop.individuals(), before.as_slice());
    }

    #[test]
    fn test_append_individuals() {
        let mut pop = binary_population(3, 4, 2);
        let extra = vec![Individual::new(Genotype::new(&[4], vec![0, 1])); 2];
        pop.append_individuals(extra).unwrap();
        assert_eq!(pop.population_size(), 5);

        let bad = vec![Individual::new(Genotype::new(&[9], vec![0, 1]))];
        assert!(pop.append_individuals(bad).is_err());
        assert_eq!(pop.population_size(), 5);
    }

    #[test]
    fn test_assign_fitness_all_or_nothing() {
        let mut pop = binary_population(3, 4, 2);
        assert!(pop.assign_fitness(&[0.1, 0.2]).is_err());
        assert!(pop.assign_fitness(&[0.1, f64::NAN, 0.3]).is_err());
        assert!(pop.individuals().iter().all(|ind| ind.fitness == 0.0));

        pop.assign_fitness(&[0.1, 0.2, 0.3]).unwrap();
        assert_eq!(pop.individuals()[2].fitness, 0.3);
        assert_eq!(pop.individuals()[2].genotype.fitness(), 0.3);
    }

    #[test]
    fn test_statistics() {
        let mut pop = binary_population(4, 2, 3);
        with_fitness(&mut pop, &[0.0, 0.5, 1.0, 0.5]);
        assert_eq!(pop.max_fitness().unwrap(), 1.0);
        assert_eq!(pop.min_fitness().unwrap(), 0.0);
        assert!((pop.avg_fitness().unwrap() - 0.5).abs() < 1e-12);
        assert!((pop.fitness_std().unwrap() - 0.125f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_statistics_empty_population() {
        let pop = binary_population(0, 2, 3);
        assert!(matches!(pop.avg_fitness(), Err(Error::EmptyPopulation)));
        assert!(matches!(pop.max_fitness(), Err(Error::EmptyPopulation)));
        assert!(matches!(pop.min_fitness(), Err(Error::EmptyPopulation)));
        assert!(matches!(pop.fitness_std(), Err(Error::EmptyPopulation)));
    }

    #[test]
    fn test_retrieve_best_order_and_ties() {
        let mut pop = binary_population(5, 3, 4);
        with_fitness(&mut pop, &[0.2, 0.9, 0.5, 0.9, 0.1]);
        let originals: Vec<Genotype<i32>> = pop.genotypes().cloned().collect();

        let best = pop.retrieve_best(3);
        let fitness: Vec<f64> = best.iter().map(|ind| ind.fitness).collect();
        assert_eq!(fitness, vec![0.9, 0.9, 0.5]);
        // Tie keeps population order: index 1 before index 3
        assert_eq!(best[0].genotype.genome(), originals[1].genome());
        assert_eq!(best[1].genotype.genome(), originals[3].genome());

        assert_eq!(pop.retrieve_best(10).len(), 5);
    }

    #[test]
    fn test_retrieve_best_returns_copies() {
        let mut rng = create_rng(9);
        let mut pop = binary_population(4, 6, 4);
        with_fitness(&mut pop, &[0.1, 0.2, 0.3, 0.4]);
        let snapshot: Vec<Individual<i32>> = pop.individuals().to_vec();

        let mut best = pop.retrieve_best(2);
        for ind in best.iter_mut() {
            ind.genotype.set_protected(true);
            Mutation::point(1.0).apply(&mut ind.genotype, &mut rng);
        }
        assert_eq!(pop.individuals(), snapshot.as_slice());
    }

    #[test]
    fn test_mutate_skips_protected() {
        let mut rng = create_rng(5);
        let mut pop = binary_population(10, 8, 5);
        let mut individuals = pop.individuals().to_vec();
        individuals[0].genotype.set_protected(true);
        pop.replace_individuals(individuals).unwrap();
        let before: Vec<Genotype<i32>> = pop.genotypes().cloned().collect();

        pop.mutate_genotypes(&[Mutation::point(1.0)], &mut rng);

        let after: Vec<&Genotype<i32>> = pop.genotypes().collect();
        assert_eq!(after[0], &before[0]);
        for i in 1..10 {
            assert_ne!(after[i].genome(), before[i].genome());
        }
    }

    #[test]
    fn test_cross_genomes_respects_probability_and_protection() {
        let mut rng = create_rng(6);
        let mut pop = binary_population(20, 16, 6);
        let before: Vec<Genotype<i32>> = pop.genotypes().cloned().collect();

        pop.cross_genomes(None, 0.0, &mut rng).unwrap();
        let unchanged: Vec<Genotype<i32>> = pop.genotypes().cloned().collect();
        assert_eq!(unchanged, before);

        let mut individuals = pop.individuals().to_vec();
        for ind in individuals.iter_mut() {
            ind.genotype.set_protected(true);
        }
        pop.replace_individuals(individuals).unwrap();
        pop.cross_genomes(None, 1.0, &mut rng).unwrap();
        let genomes: Vec<&Genome<i32>> = pop.genotypes().map(|g| g.genome()).collect();
        let before_genomes: Vec<&Genome<i32>> = before.iter().map(|g| g.genome()).collect();
        assert_eq!(genomes, before_genomes);
    }

    #[test]
    fn test_cross_genomes_with_secondary() {
        let mut rng = create_rng(6);
        let mut pop =
            Population::new(10, &[32], vec![0, 1], Initialization::Zeros, &mut rng).unwrap();
        let ones = vec![Genotype::from_genome(Genome::new(vec![32], vec![1; 32]).unwrap(), vec![0, 1])];

        pop.cross_genomes(Some(&ones), 1.0, &mut rng).unwrap();

        assert_eq!(pop.population_size(), 10);
        for g in pop.genotypes() {
            let count = g.genome().iter().filter(|&&x| x == 1).count();
            assert!(count > 0 && count < 32, "mask should mix parents, got {count}");
        }
    }

    #[test]
    fn test_cross_genomes_rejects_foreign_partners() {
        let mut rng = create_rng(6);
        let mut pop =
            Population::new(10, &[8], vec![0, 1], Initialization::Zeros, &mut rng).unwrap();
        let before: Vec<Genotype<i32>> = pop.genotypes().cloned().collect();
        let sevens = vec![Genotype::from_genome(Genome::new(vec![8], vec![7; 8]).unwrap(), vec![7])];

        assert!(matches!(
            pop.cross_genomes(Some(&sevens), 1.0, &mut rng),
            Err(Error::LayoutMismatch(_))
        ));
        let after: Vec<Genotype<i32>> = pop.genotypes().cloned().collect();
        assert_eq!(after, before);
        assert!(pop
            .genotypes()
            .all(|g| g.genome().iter().all(|v| g.gene_vals().contains(v))));
    }

    #[test]
    fn test_cross_genomes_mixed_shapes_pairs_by_shape() {
        let mut rng = create_rng(12);
        let mut pop = Population::with_shapes(
            vec![vec![4], vec![2, 3], vec![4], vec![2, 3]],
            vec![0, 1],
            Initialization::Random,
            &mut rng,
        )
        .unwrap();

        pop.cross_genomes(None, 1.0, &mut rng).unwrap();

        let shapes: Vec<&[usize]> = pop.genotypes().map(|g| g.shape()).collect();
        assert_eq!(shapes, vec![&[4][..], &[2, 3][..], &[4][..], &[2, 3][..]]);
    }

    #[test]
    fn test_expand_clone_reaches_target_and_unprotects() {
        let mut rng = create_rng(7);
        let mut pop = binary_population(3, 4, 7);
        let mut individuals = pop.individuals().to_vec();
        for ind in individuals.iter_mut() {
            ind.genotype.set_protected(true);
        }
        pop.replace_individuals(individuals).unwrap();

        pop.expand_population(10, ExpansionStrategy::Clone, &mut rng).unwrap();
        assert_eq!(pop.population_size(), 10);
        assert!(pop.individuals()[..3].iter().all(|ind| ind.genotype.is_protected()));
        assert!(pop.individuals()[3..].iter().all(|ind| !ind.genotype.is_protected()));
    }

    #[test]
    fn test_expand_clone_resets_fitness() {
        let mut rng = create_rng(8);
        let mut pop = binary_population(3, 4, 8);
        with_fitness(&mut pop, &[0.25, 0.5, 0.75]);

        pop.expand_population(12, ExpansionStrategy::Clone, &mut rng).unwrap();

        assert_eq!(pop.individuals()[2].fitness, 0.75);
        for ind in &pop.individuals()[3..] {
            assert_eq!(ind.fitness, 0.0);
            assert_eq!(ind.genotype.fitness(), 0.0);
            assert!(pop.individuals()[..3]
                .iter()
                .any(|src| src.genotype.genome() == ind.genotype.genome()));
        }
    }

    #[test]
    fn test_expand_random() {
        let mut rng = create_rng(7);
        let mut pop = binary_population(2, 4, 7);
        pop.expand_population(9, ExpansionStrategy::Random, &mut rng).unwrap();
        assert_eq!(pop.population_size(), 9);
        assert!(pop.genotypes().all(|g| g.shape() == [4]));
    }

    #[test]
    fn test_expand_never_shrinks() {
        let mut rng = create_rng(7);
        let mut pop = binary_population(8, 4, 7);
        pop.expand_population(5, ExpansionStrategy::Clone, &mut rng).unwrap();
        assert_eq!(pop.population_size(), 8);
    }

    #[test]
    fn test_expand_clone_from_empty_fails() {
        let mut rng = create_rng(7);
        let mut pop = binary_population(0, 4, 7);
        assert!(matches!(
            pop.expand_population(5, ExpansionStrategy::Clone, &mut rng),
            Err(Error::EmptyPopulation)
        ));
        // Random strategy works from nothing
        pop.expand_population(5, ExpansionStrategy::Random, &mut rng).unwrap();
        assert_eq!(pop.population_size(), 5);
    }

    #[test]
    fn test_from_individuals() {
        let pop = binary_population(4, 3, 8);
        let seeded =
            Population::from_individuals(pop.individuals().to_vec(), &[3], vec![0, 1]).unwrap();
        assert_eq!(seeded.population_size(), 4);

        assert!(Population::from_individuals(pop.individuals().to_vec(), &[4], vec![0, 1]).is_err());
    }

    #[test]
    fn test_empty_like_keeps_configuration() {
        let pop = binary_population(4, 3, 8);
        let empty = pop.empty_like();
        assert!(empty.is_empty());
        assert_eq!(empty.genome_shapes(), pop.genome_shapes());
        assert_eq!(empty.gene_values(), pop.gene_values());
    }
}
