//! Minimum-cost assignment for frame matching.
//!
//! Hungarian algorithm with row/column potentials, O(n^2 m) for an n x m
//! problem with n <= m.
#![allow(clippy::needless_range_loop)]

use nalgebra::DMatrix;

/// Largest absolute cost solved without rescaling.
const MAX_UNSCALED_COST: f64 = 1e100;

/// Solve the linear sum assignment problem on `costs`.
///
/// Non-finite entries (NaN, inf) mark forbidden pairs and are never returned.
/// Among assignments using the fewest forbidden pairs the total cost is
/// minimal, so the number of returned pairs is as large as possible.
///
/// # Returns
/// `(row, col)` pairs sorted by row.
pub fn linear_sum_assignment(costs: &DMatrix<f64>) -> Vec<(usize, usize)> {
    let (rows, cols) = costs.shape();
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    // Scaling keeps the penalty and the potentials finite for huge costs
    let max_abs = costs
        .iter()
        .filter(|c| c.is_finite())
        .fold(0.0f64, |acc, c| acc.max(c.abs()));
    let scale = if max_abs > MAX_UNSCALED_COST { max_abs } else { 1.0 };

    // Penalty larger than any finite assignment
    let finite_sum: f64 = costs
        .iter()
        .filter(|c| c.is_finite())
        .map(|c| (c / scale).abs())
        .sum();
    let forbidden = (finite_sum + 1.0) * (rows.max(cols) as f64 + 1.0);

    let transposed = rows > cols;
    let (n, m) = if transposed { (cols, rows) } else { (rows, cols) };
    let cost = |i: usize, j: usize| -> f64 {
        let c = if transposed { costs[(j, i)] } else { costs[(i, j)] };
        if c.is_finite() {
            c / scale
        } else {
            forbidden
        }
    };

    // 1-based potentials; column 0 is a virtual start column
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; m + 1];
    let mut owner = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        owner[0] = i;
        let mut j0 = 0usize;
        let mut min_v = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let reduced = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < min_v[j] {
                    min_v[j] = reduced;
                    way[j] = j0;
                }
                if min_v[j] < delta {
                    delta = min_v[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_v[j] -= delta;
                }
            }

            j0 = j1;
            if owner[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path
        loop {
            let j1 = way[j0];
            owner[j0] = owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut pairs: Vec<(usize, usize)> = (1..=m)
        .filter(|&j| owner[j] != 0)
        .map(|j| {
            let (i, j) = (owner[j] - 1, j - 1);
            if transposed {
                (j, i)
            } else {
                (i, j)
            }
        })
        .filter(|&(r, c)| costs[(r, c)].is_finite())
        .collect();
    pairs.sort_unstable();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn total(costs: &DMatrix<f64>, pairs: &[(usize, usize)]) -> f64 {
        pairs.iter().map(|&(r, c)| costs[(r, c)]).sum()
    }

    #[test]
    fn test_basic_square() {
        let costs = DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 3.0, 2.0, 0.0, 5.0, 3.0, 2.0, 2.0]);
        let pairs = linear_sum_assignment(&costs);

        assert_eq!(pairs.len(), 3);
        assert_relative_eq!(total(&costs, &pairs), 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_beats_greedy() {
        // Greedy takes (0,0)=1 and is then forced into (1,1)=10
        let costs = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 10.0]);
        let pairs = linear_sum_assignment(&costs);
        assert_eq!(pairs, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_rectangular_more_rows() {
        let costs = DMatrix::from_row_slice(3, 2, &[5.0, 6.0, 1.0, 2.0, 3.0, 1.0]);
        let pairs = linear_sum_assignment(&costs);
        assert_eq!(pairs, vec![(1, 0), (2, 1)]);
    }

    #[test]
    fn test_rectangular_more_cols() {
        let costs = DMatrix::from_row_slice(1, 3, &[7.0, 2.0, 9.0]);
        assert_eq!(linear_sum_assignment(&costs), vec![(0, 1)]);
    }

    #[test]
    fn test_forbidden_pairs_skipped() {
        let costs = DMatrix::from_row_slice(2, 2, &[f64::NAN, 1.0, f64::NAN, f64::NAN]);
        assert_eq!(linear_sum_assignment(&costs), vec![(0, 1)]);
    }

    #[test]
    fn test_forbidden_does_not_block_feasible_pairs() {
        // Cheapest row-0 choice would leave row 1 with only a forbidden pair
        let costs = DMatrix::from_row_slice(2, 2, &[1.0, 3.0, 2.0, f64::INFINITY]);
        assert_eq!(linear_sum_assignment(&costs), vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_huge_costs_with_forbidden_pairs() {
        let big = f64::MAX / 2.0;
        let costs = DMatrix::from_row_slice(
            3,
            3,
            &[big, big / 2.0, f64::NAN, big / 2.0, big, big, f64::NAN, big, big / 4.0],
        );
        let pairs = linear_sum_assignment(&costs);
        assert_eq!(pairs, vec![(0, 1), (1, 0), (2, 2)]);
    }

    #[test]
    fn test_empty() {
        assert!(linear_sum_assignment(&DMatrix::zeros(0, 3)).is_empty());
        assert!(linear_sum_assignment(&DMatrix::zeros(2, 0)).is_empty());
    }
}
