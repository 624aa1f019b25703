//! Parameter vector operations for the genetic algorithm.
//!
//! These are the building blocks of the reference operators in [`operator`](crate::operator):
//!
//! - **Initialization**: [`random`] draws a uniform random parameter vector
//! - **Crossover**: [`complete_crossover`] swaps genes between two parents
//! - **Mutation**: [`mutate`] perturbs genes with uniform noise
//!
//! All functions take the random number generator explicitly, so results are reproducible
//! with a seeded generator.

use rand::Rng;

/// Creates a parameter vector by applying a function to each index.
///
/// # Examples
///
/// ```
/// use evocar_training::parameters;
///
/// let params = parameters::from_fn(|i| i as f64 * 0.5, 4);
/// assert_eq!(params, vec![0.0, 0.5, 1.0, 1.5]);
/// ```
pub fn from_fn<F>(mut f: F, len: usize) -> Vec<f64>
where
    F: FnMut(usize) -> f64,
{
    let mut values = Vec::with_capacity(len);
    for i in 0..len {
        values.push(f(i));
    }
    values
}

/// Generates `len` parameters drawn independently and uniformly from `[min, max)`.
///
/// `min == max` yields a constant vector.
///
/// # Panics
///
/// Panics if `min > max`.
pub fn random<R>(rng: &mut R, min: f64, max: f64, len: usize) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    assert!(min <= max, "minimum value may not exceed maximum value");
    let range = max - min;
    from_fn(|_| min + rng.random::<f64>() * range, len)
}

/// Performs complete (uniform) crossover between two parents.
///
/// For every gene position, with probability `swap_probability` the first offspring takes
/// the gene of `p2` and the second offspring the gene of `p1`; otherwise each offspring
/// inherits the gene of its own parent.
///
/// # Panics
///
/// Panics if the parents have different lengths or `swap_probability` is outside `[0, 1]`.
pub fn complete_crossover<R>(
    p1: &[f64],
    p2: &[f64],
    swap_probability: f64,
    rng: &mut R,
) -> (Vec<f64>, Vec<f64>)
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    let mut offspring1 = Vec::with_capacity(p1.len());
    let mut offspring2 = Vec::with_capacity(p2.len());
    for (&x1, &x2) in p1.iter().zip(p2) {
        if rng.random_bool(swap_probability) {
            offspring1.push(x2);
            offspring2.push(x1);
        } else {
            offspring1.push(x1);
            offspring2.push(x2);
        }
    }
    (offspring1, offspring2)
}

/// Applies uniform mutation to a parameter vector in-place.
///
/// Each gene is independently, with probability `gene_probability`, shifted by a delta drawn
/// uniformly from `[-amount, amount)`.
///
/// # Panics
///
/// Panics if `gene_probability` is outside `[0, 1]`.
pub fn mutate<R>(params: &mut [f64], gene_probability: f64, amount: f64, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for p in params {
        if rng.random_bool(gene_probability) {
            *p += rng.random::<f64>() * (amount * 2.0) - amount;
        }
    }
}
