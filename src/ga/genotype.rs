//! Fixed-shape genomes and the genotypes that carry them.
//!
//! A [`Genome`] is an owned, row-major buffer of genes whose shape is fixed
//! at construction. A [`Genotype`] wraps a genome together with the set of
//! permitted gene values, a fitness score, and a protection flag that
//! exempts it from mutation and crossover.

use super::types::Gene;
use crate::error::{Error, Result};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::ops::{Index, IndexMut};

/// Fixed-shape, row-major array of genes.
///
/// The shape never changes after construction; only the contents do.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "RawGenome<G>",
        bound(deserialize = "G: Gene + serde::Deserialize<'de>")
    )
)]
pub struct Genome<G> {
    shape: Vec<usize>,
    genes: Vec<G>,
}

/// Unchecked wire form of [`Genome`]; deserialization goes through
/// [`Genome::new`] so the element count always matches the shape.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawGenome<G> {
    shape: Vec<usize>,
    genes: Vec<G>,
}

#[cfg(feature = "serde")]
impl<G: Gene> TryFrom<RawGenome<G>> for Genome<G> {
    type Error = Error;

    fn try_from(raw: RawGenome<G>) -> Result<Self> {
        Genome::new(raw.shape, raw.genes)
    }
}

impl<G: Gene> Genome<G> {
    /// Creates a genome from a shape and its row-major contents.
    ///
    /// # Errors
    /// Returns [`Error::LengthMismatch`] if the number of genes is not the
    /// product of the shape's dimensions.
    pub fn new(shape: Vec<usize>, genes: Vec<G>) -> Result<Self> {
        let expected = element_count(&shape);
        if expected != genes.len() {
            return Err(Error::LengthMismatch {
                expected,
                actual: genes.len(),
            });
        }
        Ok(Self { shape, genes })
    }

    /// Creates a genome of the given shape filled with [`Gene::zero`].
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            genes: vec![G::zero(); element_count(shape)],
            shape: shape.to_vec(),
        }
    }

    /// Creates a genome whose genes are drawn uniformly from `gene_vals`.
    ///
    /// # Errors
    /// Returns [`Error::EmptyGeneValues`] if `gene_vals` is empty and the
    /// shape holds at least one gene.
    pub fn random<R: Rng + ?Sized>(shape: &[usize], gene_vals: &[G], rng: &mut R) -> Result<Self> {
        let n = element_count(shape);
        if n > 0 && gene_vals.is_empty() {
            return Err(Error::EmptyGeneValues);
        }
        let genes = (0..n)
            .map(|_| gene_vals[rng.random_range(0..gene_vals.len())])
            .collect();
        Ok(Self {
            shape: shape.to_vec(),
            genes,
        })
    }

    /// Shape of the genome, one entry per axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Returns `true` if the genome holds no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Flat, row-major view of the genes.
    pub fn as_slice(&self) -> &[G] {
        &self.genes
    }

    /// Mutable flat view. The shape cannot be changed through it.
    pub fn as_mut_slice(&mut self) -> &mut [G] {
        &mut self.genes
    }

    /// Iterates over genes in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, G> {
        self.genes.iter()
    }

    /// Gene at a multi-dimensional index, or `None` if out of bounds.
    pub fn get(&self, index: &[usize]) -> Option<&G> {
        self.flat_index(index).map(|i| &self.genes[i])
    }

    /// Mutable gene at a multi-dimensional index.
    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut G> {
        self.flat_index(index).map(move |i| &mut self.genes[i])
    }

    fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0;
        for (&i, &dim) in index.iter().zip(self.shape.iter()) {
            if i >= dim {
                return None;
            }
            flat = flat * dim + i;
        }
        Some(flat)
    }
}

impl<G> Index<usize> for Genome<G> {
    type Output = G;

    fn index(&self, index: usize) -> &G {
        &self.genes[index]
    }
}

impl<G> IndexMut<usize> for Genome<G> {
    fn index_mut(&mut self, index: usize) -> &mut G {
        &mut self.genes[index]
    }
}

/// Number of genes held by a genome of `shape`.
pub(crate) fn element_count(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// A genome plus its metadata.
///
/// Every gene of the genome is drawn from `gene_vals`; operators only ever
/// substitute values taken from that set. `fitness` defaults to `0.0` and
/// is written by the evaluation step. While `protected` is set, the
/// population skips this genotype during mutation and crossover.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(deserialize = "G: Gene + serde::Deserialize<'de>"))
)]
pub struct Genotype<G> {
    genome: Genome<G>,
    gene_vals: Vec<G>,
    fitness: f64,
    protected: bool,
}

impl<G: Gene> Genotype<G> {
    /// Creates a zero-initialized genotype.
    pub fn new(shape: &[usize], gene_vals: Vec<G>) -> Self {
        Self::from_parts(Genome::zeros(shape), gene_vals)
    }

    /// Creates a genotype with genes drawn uniformly from `gene_vals`.
    ///
    /// # Errors
    /// Returns [`Error::EmptyGeneValues`] for an empty value set.
    pub fn random<R: Rng + ?Sized>(shape: &[usize], gene_vals: Vec<G>, rng: &mut R) -> Result<Self> {
        let genome = Genome::random(shape, &gene_vals, rng)?;
        Ok(Self::from_parts(genome, gene_vals))
    }

    /// Wraps an existing genome.
    pub fn from_genome(genome: Genome<G>, gene_vals: Vec<G>) -> Self {
        Self::from_parts(genome, gene_vals)
    }

    /// General constructor.
    ///
    /// With `random_init` the genes are drawn uniformly from `gene_vals`.
    /// Otherwise `default_genome` is copied if given, and the genome is
    /// zero-filled if not.
    ///
    /// # Errors
    /// - [`Error::ShapeMismatch`] if `default_genome` has a different shape
    /// - [`Error::EmptyGeneValues`] for random init with no gene values
    pub fn construct<R: Rng + ?Sized>(
        shape: &[usize],
        random_init: bool,
        gene_vals: Vec<G>,
        default_genome: Option<&Genome<G>>,
        rng: &mut R,
    ) -> Result<Self> {
        if random_init {
            return Self::random(shape, gene_vals, rng);
        }
        match default_genome {
            Some(genome) if genome.shape() != shape => Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                actual: genome.shape().to_vec(),
            }),
            Some(genome) => Ok(Self::from_parts(genome.clone(), gene_vals)),
            None => Ok(Self::new(shape, gene_vals)),
        }
    }

    fn from_parts(genome: Genome<G>, gene_vals: Vec<G>) -> Self {
        Self {
            genome,
            gene_vals,
            fitness: 0.0,
            protected: false,
        }
    }

    /// The genome.
    pub fn genome(&self) -> &Genome<G> {
        &self.genome
    }

    /// Mutable access to the genome contents.
    pub fn genome_mut(&mut self) -> &mut Genome<G> {
        &mut self.genome
    }

    /// Shape of the genome.
    pub fn shape(&self) -> &[usize] {
        self.genome.shape()
    }

    /// Permitted gene values.
    pub fn gene_vals(&self) -> &[G] {
        &self.gene_vals
    }

    /// Last assigned fitness (`0.0` until evaluated).
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Assigns the fitness score.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFitness`] if `fitness` is NaN.
    pub fn set_fitness(&mut self, fitness: f64) -> Result<()> {
        if fitness.is_nan() {
            return Err(Error::InvalidFitness(fitness));
        }
        self.fitness = fitness;
        Ok(())
    }

    /// Whether the genotype is exempt from mutation and crossover.
    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// Sets or clears the protection flag.
    pub fn set_protected(&mut self, protected: bool) {
        self.protected = protected;
    }

    /// Applies a mutation operator in place.
    ///
    /// The protection flag is not consulted here; the population skips
    /// protected genotypes before calling this.
    pub fn mutate<R: Rng + ?Sized>(&mut self, operator: &super::operators::Mutation, rng: &mut R) {
        operator.apply(self, rng);
    }

    /// Crosses with `partner` using a freshly drawn mask.
    ///
    /// Each position is taken from `partner` with probability 0.5.
    ///
    /// # Errors
    /// Same as [`crossover_with_mask`](Self::crossover_with_mask).
    pub fn crossover<R: Rng + ?Sized>(&self, partner: &Genotype<G>, rng: &mut R) -> Result<Self> {
        let mask: Vec<bool> = (0..self.genome.len()).map(|_| rng.random_bool(0.5)).collect();
        self.crossover_with_mask(partner, &mask)
    }

    /// Returns a descendant equal to `self` except where `mask` is `true`,
    /// where genes are copied from `partner`.
    ///
    /// Neither parent is modified.
    ///
    /// # Errors
    /// - [`Error::ShapeMismatch`] if the partner's shape differs
    /// - [`Error::LayoutMismatch`] if the partner draws from other gene values
    /// - [`Error::LengthMismatch`] if the mask length is not the genome length
    pub fn crossover_with_mask(&self, partner: &Genotype<G>, mask: &[bool]) -> Result<Self> {
        if partner.shape() != self.shape() {
            return Err(Error::ShapeMismatch {
                expected: self.shape().to_vec(),
                actual: partner.shape().to_vec(),
            });
        }
        if partner.gene_vals() != self.gene_vals() {
            return Err(Error::LayoutMismatch(format!(
                "crossover partner has gene values {:?}, expected {:?}",
                partner.gene_vals(),
                self.gene_vals()
            )));
        }
        if mask.len() != self.genome.len() {
            return Err(Error::LengthMismatch {
                expected: self.genome.len(),
                actual: mask.len(),
            });
        }

        let mut descendant = self.clone_genotype();
        for (i, &take) in mask.iter().enumerate() {
            if take {
                descendant.genome[i] = partner.genome[i];
            }
        }
        Ok(descendant)
    }

    /// Deep copy with fitness reset to `0.0`.
    ///
    /// Genome contents, gene values, and the protection flag are preserved.
    /// Use [`Clone::clone`] to carry the fitness over as well.
    pub fn clone_genotype(&self) -> Self {
        Self {
            genome: self.genome.clone(),
            gene_vals: self.gene_vals.clone(),
            fitness: 0.0,
            protected: self.protected,
        }
    }

    /// Picks one value from `gene_vals` uniformly, or `None` if empty.
    pub(crate) fn random_gene<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<G> {
        self.gene_vals.choose(rng).copied()
    }
}
