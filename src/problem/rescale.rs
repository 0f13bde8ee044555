//! Diagonal rescaling of standard form problems.
//!
//! Rescaling iteratively scales the rows and columns of the constraint
//! matrix to balance the magnitudes of its entries, which improves the
//! conditioning seen by the first-order iteration.  Given accumulated
//! factors `R = diag(row_scale)` and `C = diag(col_scale)`, the scaled
//! problem is
//!
//! ```text
//! A' = R A C,   b' = R b,   c' = C c,   lb' = C⁻¹ lb,   ub' = C⁻¹ ub
//! ```
//!
//! and a solution pair of the scaled problem maps back to the original
//! via `x = C x'` and `y = R y'`.  The accumulated factors are recorded
//! on the returned problem as its scaling vectors.

use crate::algebra::*;
use crate::problem::StandardFormProblem;

/// Rescale `original`, applying `l_inf_ruiz_iterations` passes of Ruiz
/// equilibration in the infinity norm, then one pass of `l2` rescaling
/// when requested, then a Pock-Chambolle pass when `pock_chambolle_alpha`
/// is present.
///
/// The returned problem carries the cumulative scaling factors in its
/// `row_scaling_vec` / `col_scaling_vec` fields, composed with any
/// factors already present on `original`.
pub fn rescale_problem<T: FloatT>(
    original: &StandardFormProblem<T>,
    l_inf_ruiz_iterations: u32,
    l2_norm_rescaling: bool,
    pock_chambolle_alpha: Option<T>,
) -> StandardFormProblem<T> {
    let (m, n) = original.constraint_matrix.size();

    let mut scaled = original.clone();
    let mut cum_row = original.row_scaling_or_ones();
    let mut cum_col = original.col_scaling_or_ones();

    let mut d_row = vec![T::one(); m];
    let mut d_col = vec![T::one(); n];

    for _ in 0..l_inf_ruiz_iterations {
        scaled.constraint_matrix.row_norms_inf(&mut d_row);
        scaled.constraint_matrix.col_norms_inf(&mut d_col);
        inv_sqrt_factors(&mut d_row);
        inv_sqrt_factors(&mut d_col);
        apply_scaling(&mut scaled, &d_row, &d_col);
        cum_row.hadamard(&d_row);
        cum_col.hadamard(&d_col);
    }

    if l2_norm_rescaling {
        let two = (2.0).as_T();
        scaled.constraint_matrix.row_sums_pow(&mut d_row, two);
        scaled.constraint_matrix.col_sums_pow(&mut d_col, two);
        // factors are 1/sqrt(‖·‖₂), i.e. the fourth root of the sums
        for v in d_row.iter_mut().chain(d_col.iter_mut()) {
            *v = v.sqrt();
        }
        inv_sqrt_factors(&mut d_row);
        inv_sqrt_factors(&mut d_col);
        apply_scaling(&mut scaled, &d_row, &d_col);
        cum_row.hadamard(&d_row);
        cum_col.hadamard(&d_col);
    }

    if let Some(alpha) = pock_chambolle_alpha {
        let two: T = (2.0).as_T();
        scaled.constraint_matrix.row_sums_pow(&mut d_row, two - alpha);
        scaled.constraint_matrix.col_sums_pow(&mut d_col, alpha);
        inv_sqrt_factors(&mut d_row);
        inv_sqrt_factors(&mut d_col);
        apply_scaling(&mut scaled, &d_row, &d_col);
        cum_row.hadamard(&d_row);
        cum_col.hadamard(&d_col);
    }

    scaled.row_scaling_vec = Some(cum_row);
    scaled.col_scaling_vec = Some(cum_col);
    scaled
}

// map accumulated norms to scaling factors 1/sqrt(norm), leaving
// structurally empty rows/columns untouched
fn inv_sqrt_factors<T: FloatT>(norms: &mut [T]) {
    for v in norms.iter_mut() {
        *v = if *v > T::zero() {
            T::recip(v.sqrt())
        } else {
            T::one()
        };
    }
}

fn apply_scaling<T: FloatT>(problem: &mut StandardFormProblem<T>, d_row: &[T], d_col: &[T]) {
    problem.constraint_matrix.lrscale(d_row, d_col);
    problem.right_hand_side.hadamard(d_row);
    problem.objective_vector.hadamard(d_col);
    for (x, d) in std::iter::zip(&mut problem.variable_lower_bound, d_col) {
        *x = *x / *d;
    }
    for (x, d) in std::iter::zip(&mut problem.variable_upper_bound, d_col) {
        *x = *x / *d;
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::problem::StandardFormProblem;

    fn test_problem() -> StandardFormProblem<f64> {
        // matrix with very different row/column magnitudes
        let A = CscMatrix::from_triplets(
            2,
            2,
            &[0, 0, 1, 1],
            &[0, 1, 0, 1],
            &[1000.0, 1.0, 1.0, 0.001],
        );
        StandardFormProblem::new(
            vec![1.0, 1.0],
            0.0,
            A,
            vec![1.0, 1.0],
            vec![0.0, 0.0],
            vec![10.0, f64::INFINITY],
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_no_op_when_disabled() {
        let problem = test_problem();
        let scaled = rescale_problem(&problem, 0, false, None);
        assert_eq!(scaled.constraint_matrix, problem.constraint_matrix);
        assert_eq!(scaled.row_scaling_vec, Some(vec![1.0; 2]));
        assert_eq!(scaled.col_scaling_vec, Some(vec![1.0; 2]));
    }

    #[test]
    fn test_ruiz_balances_norms() {
        let problem = test_problem();
        let scaled = rescale_problem(&problem, 10, false, None);

        let mut row_norms = vec![0.0; 2];
        let mut col_norms = vec![0.0; 2];
        scaled.constraint_matrix.row_norms_inf(&mut row_norms);
        scaled.constraint_matrix.col_norms_inf(&mut col_norms);

        // max/min ratio should be far smaller than the original 10^6
        let row_ratio = row_norms[0].max(row_norms[1]) / row_norms[0].min(row_norms[1]);
        let col_ratio = col_norms[0].max(col_norms[1]) / col_norms[0].min(col_norms[1]);
        assert!(row_ratio < 100.0, "row ratio not balanced: {}", row_ratio);
        assert!(col_ratio < 100.0, "col ratio not balanced: {}", col_ratio);
    }

    #[test]
    fn test_scaling_vectors_reproduce_scaled_data() {
        let problem = test_problem();
        let scaled = rescale_problem(&problem, 5, true, Some(1.0));

        let row_scale = scaled.row_scaling_vec.as_ref().unwrap();
        let col_scale = scaled.col_scaling_vec.as_ref().unwrap();
        assert!(row_scale.iter().all(|&s| s > 0.0));
        assert!(col_scale.iter().all(|&s| s > 0.0));

        // A' = R A C entrywise
        for (r, c, v) in scaled.constraint_matrix.triplets() {
            let expected = row_scale[r] * problem.constraint_matrix.get(r, c) * col_scale[c];
            assert!((v - expected).abs() < 1e-12);
        }

        // b' = R b, c' = C c
        for i in 0..2 {
            assert!(
                (scaled.right_hand_side[i] - row_scale[i] * problem.right_hand_side[i]).abs()
                    < 1e-12
            );
            assert!(
                (scaled.objective_vector[i] - col_scale[i] * problem.objective_vector[i]).abs()
                    < 1e-12
            );
        }

        // bounds divide by the column factors, with infinities preserved
        assert!((scaled.variable_upper_bound[0] - 10.0 / col_scale[0]).abs() < 1e-12);
        assert_eq!(scaled.variable_upper_bound[1], f64::INFINITY);

        assert!(scaled.validate().is_ok());
    }

    #[test]
    fn test_scaling_composes() {
        let problem = test_problem();
        let once = rescale_problem(&problem, 2, false, None);
        let twice = rescale_problem(&once, 2, false, None);

        let row_scale = twice.row_scaling_vec.as_ref().unwrap();
        let col_scale = twice.col_scaling_vec.as_ref().unwrap();

        // cumulative factors still map the ORIGINAL data to the scaled data
        for (r, c, v) in twice.constraint_matrix.triplets() {
            let expected = row_scale[r] * problem.constraint_matrix.get(r, c) * col_scale[c];
            assert!((v - expected).abs() < 1e-12);
        }
    }
}
