//! Pairwise distance matrices for metric accumulation.

use nalgebra::DMatrix;

use crate::annotations::Midpoint;

/// Squared Euclidean distances between two point sets.
///
/// Entry `(i, j)` is the squared distance between `a[i]` and `b[j]`, so the
/// result has shape `a.len() x b.len()`. Pairs farther apart than `max_d2` are
/// set to NaN, which the accumulator treats as "cannot be paired".
pub fn norm2squared_matrix(a: &[Midpoint], b: &[Midpoint], max_d2: f64) -> DMatrix<f64> {
    DMatrix::from_fn(a.len(), b.len(), |i, j| {
        let d2 = a[i].distance_squared(&b[j]);
        if d2 > max_d2 {
            f64::NAN
        } else {
            d2
        }
    })
}
