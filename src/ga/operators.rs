//! Mutation operators for symbolic genomes.
//!
//! Each operator fires with its configured probability and otherwise
//! leaves the genotype untouched. Replacement values are always drawn from
//! the genotype's own gene values, so a mutated genome never leaves its
//! domain. Genomes with no genes are never altered.
//!
//! # Operators
//!
//! - [`Mutation::Point`]: change one gene to a *different* permitted value, O(|V|)
//! - [`Mutation::Block`]: redraw `k` consecutive genes, wrapping around, O(k)
//! - [`Mutation::Permutation`]: shuffle sub-arrays along one axis, O(n)
//! - [`Mutation::Shift`]: rotate the flat genome and redraw the vacated head, O(n)
//!
//! Permutation only reorders existing genes. Combine it with an operator
//! that introduces new values to explore the whole gene domain.

use super::genotype::{Genome, Genotype};
use super::types::Gene;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

/// A mutation operator with its configuration.
///
/// # Examples
///
/// ```
/// use u_strand::ga::{Genotype, Mutation};
/// use u_strand::random::create_rng;
///
/// let mut rng = create_rng(42);
/// let mut genotype = Genotype::random(&[10], vec![0, 1, 2], &mut rng).unwrap();
/// let before = genotype.clone();
///
/// Mutation::point(1.0).apply(&mut genotype, &mut rng);
/// assert_ne!(genotype.genome(), before.genome());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mutation {
    /// Leaves the genotype unchanged.
    Identity,

    /// Replaces one random gene with a different value from the gene set.
    ///
    /// When the gene set holds no value other than the current one, nothing
    /// changes.
    Point {
        /// Probability that the operator fires (0.0–1.0).
        probability: f64,
    },

    /// Redraws `block_size` consecutive genes starting at a random position.
    ///
    /// The block wraps past the end of the flat genome and is clamped to the
    /// genome length. New values may coincide with the old ones.
    Block {
        /// Probability that the operator fires (0.0–1.0).
        probability: f64,
        /// Number of consecutive genes to redraw.
        block_size: usize,
    },

    /// Shuffles the sub-arrays of the genome along `axis`.
    ///
    /// An axis beyond the genome's dimensionality makes this a no-op.
    Permutation {
        /// Probability that the operator fires (0.0–1.0).
        probability: f64,
        /// Axis along which sub-arrays are reordered.
        axis: usize,
    },

    /// Rotates the flat genome right by `offset` and redraws the first
    /// `offset` genes.
    Shift {
        /// Probability that the operator fires (0.0–1.0).
        probability: f64,
        /// Rotation distance, clamped to the genome length.
        offset: usize,
    },
}

impl Default for Mutation {
    fn default() -> Self {
        Mutation::point(0.001)
    }
}

impl Mutation {
    /// Point mutation firing with `probability`.
    pub fn point(probability: f64) -> Self {
        Mutation::Point {
            probability: probability.clamp(0.0, 1.0),
        }
    }

    /// Block mutation redrawing `block_size` genes.
    pub fn block(probability: f64, block_size: usize) -> Self {
        Mutation::Block {
            probability: probability.clamp(0.0, 1.0),
            block_size,
        }
    }

    /// Permutation along `axis`.
    pub fn permutation(probability: f64, axis: usize) -> Self {
        Mutation::Permutation {
            probability: probability.clamp(0.0, 1.0),
            axis,
        }
    }

    /// Shift by `offset` positions.
    pub fn shift(probability: f64, offset: usize) -> Self {
        Mutation::Shift {
            probability: probability.clamp(0.0, 1.0),
            offset,
        }
    }

    /// Firing probability (`0.0` for [`Mutation::Identity`]).
    pub fn probability(&self) -> f64 {
        match *self {
            Mutation::Identity => 0.0,
            Mutation::Point { probability }
            | Mutation::Block { probability, .. }
            | Mutation::Permutation { probability, .. }
            | Mutation::Shift { probability, .. } => probability,
        }
    }

    /// Applies the operator to `genotype` in place.
    pub fn apply<G: Gene, R: Rng + ?Sized>(&self, genotype: &mut Genotype<G>, rng: &mut R) {
        if genotype.genome().is_empty() {
            return;
        }
        if rng.random_range(0.0..1.0) >= self.probability() {
            return;
        }

        match *self {
            Mutation::Identity => {}
            Mutation::Point { .. } => point(genotype, rng),
            Mutation::Block { block_size, .. } => block(genotype, block_size, rng),
            Mutation::Permutation { axis, .. } => permute_axis(genotype.genome_mut(), axis, rng),
            Mutation::Shift { offset, .. } => shift(genotype, offset, rng),
        }
    }
}

fn point<G: Gene, R: Rng + ?Sized>(genotype: &mut Genotype<G>, rng: &mut R) {
    let n = genotype.genome().len();
    let position = rng.random_range(0..n);
    let current = genotype.genome()[position];

    let alternatives: Vec<G> = genotype
        .gene_vals()
        .iter()
        .copied()
        .filter(|&v| v != current)
        .collect();

    if let Some(&value) = alternatives.choose(rng) {
        genotype.genome_mut()[position] = value;
    }
}

fn block<G: Gene, R: Rng + ?Sized>(genotype: &mut Genotype<G>, block_size: usize, rng: &mut R) {
    let n = genotype.genome().len();
    let count = block_size.min(n);
    let start = rng.random_range(0..n);

    for step in 0..count {
        let Some(value) = genotype.random_gene(rng) else {
            return;
        };
        genotype.genome_mut()[(start + step) % n] = value;
    }
}

fn shift<G: Gene, R: Rng + ?Sized>(genotype: &mut Genotype<G>, offset: usize, rng: &mut R) {
    let n = genotype.genome().len();
    let offset = offset.min(n);

    genotype.genome_mut().as_mut_slice().rotate_right(offset);
    for i in 0..offset {
        let Some(value) = genotype.random_gene(rng) else {
            return;
        };
        genotype.genome_mut()[i] = value;
    }
}

/// Reorders the sub-arrays of `genome` along `axis` with one shared
/// permutation for every outer slice.
fn permute_axis<G: Gene, R: Rng + ?Sized>(genome: &mut Genome<G>, axis: usize, rng: &mut R) {
    let shape = genome.shape();
    if axis >= shape.len() {
        return;
    }

    let outer: usize = shape[..axis].iter().product();
    let len = shape[axis];
    let inner: usize = shape[axis + 1..].iter().product();
    if len < 2 {
        return;
    }

    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);

    let source = genome.as_slice().to_vec();
    let target = genome.as_mut_slice();
    for o in 0..outer {
        let base = o * len * inner;
        for (i, &from) in order.iter().enumerate() {
            let dst = base + i * inner;
            let src = base + from * inner;
            target[dst..dst + inner].copy_from_slice(&source[src..src + inner]);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
