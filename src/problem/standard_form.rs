use crate::algebra::*;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error type returned when problem data dimensions are inconsistent.
///
/// A dimension failure indicates a producer/consumer contract violation
/// and is always fatal.  It is never coerced by truncating or padding.
pub enum DimensionError {
    /// A data vector disagrees with the problem shape
    #[error("{field} has length {got} but the problem shape implies {expected}")]
    BadVectorLength {
        field: &'static str,
        got: usize,
        expected: usize,
    },
    /// More equality rows declared than matrix rows
    #[error("num_equalities is {neq} but the problem has only {m} rows")]
    BadEqualityCount { neq: usize, m: usize },
    /// A variable lower bound exceeds its upper bound
    #[error("variable lower bound exceeds upper bound at index {0}")]
    BoundOrder(usize),
    /// A scaling factor is not strictly positive
    #[error("{field} must be strictly positive at index {idx}")]
    BadScaling { field: &'static str, idx: usize },
}

/// A linear program in standard form:
///
/// ```text
/// minimize    c'x + k
/// subject to  a_i'x  = b_i   i = 1..n_eq
///             a_i'x >= b_i   i = n_eq+1..m
///             lb <= x <= ub
/// ```
///
/// The first `num_equalities` rows of the constraint matrix and right
/// hand side are equality constraints and the remainder are
/// inequalities.  Downstream consumers rely on this ordering.
///
/// Bounds may contain `±inf` to mark free directions.  The optional
/// scaling vectors record diagonal preprocessing factors already
/// applied to the data (see [`rescale_problem`](crate::problem::rescale_problem));
/// they are absent when the producer performed no scaling.
///
/// A problem is validated once on construction and never mutated
/// afterwards.  It may be shared read-only between the canonical
/// exporter and the solve path.
#[derive(Debug, Clone)]
pub struct StandardFormProblem<T = f64> {
    /// objective coefficients `c`, length n
    pub objective_vector: Vec<T>,
    /// constant term `k` added to the linear objective
    pub objective_constant: T,
    /// constraint matrix `A`, shape (m, n)
    pub constraint_matrix: CscMatrix<T>,
    /// right hand side `b`, length m
    pub right_hand_side: Vec<T>,
    /// variable lower bounds, length n
    pub variable_lower_bound: Vec<T>,
    /// variable upper bounds, length n
    pub variable_upper_bound: Vec<T>,
    /// number of leading equality rows
    pub num_equalities: usize,
    /// diagonal row scaling applied during preprocessing, length m
    pub row_scaling_vec: Option<Vec<T>>,
    /// diagonal column scaling applied during preprocessing, length n
    pub col_scaling_vec: Option<Vec<T>>,
}

impl<T> StandardFormProblem<T>
where
    T: FloatT,
{
    /// Construct and validate a standard form problem.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        objective_vector: Vec<T>,
        objective_constant: T,
        constraint_matrix: CscMatrix<T>,
        right_hand_side: Vec<T>,
        variable_lower_bound: Vec<T>,
        variable_upper_bound: Vec<T>,
        num_equalities: usize,
    ) -> Result<Self, DimensionError> {
        let problem = Self {
            objective_vector,
            objective_constant,
            constraint_matrix,
            right_hand_side,
            variable_lower_bound,
            variable_upper_bound,
            num_equalities,
            row_scaling_vec: None,
            col_scaling_vec: None,
        };
        problem.validate()?;
        Ok(problem)
    }

    /// number of variables (n)
    pub fn num_variables(&self) -> usize {
        self.constraint_matrix.ncols()
    }

    /// number of constraints (m)
    pub fn num_constraints(&self) -> usize {
        self.constraint_matrix.nrows()
    }

    /// number of structural nonzeros in the constraint matrix
    pub fn nnz(&self) -> usize {
        self.constraint_matrix.nnz()
    }

    /// Objective value `c'x + k` realized at the point `x`.
    ///
    /// Uses pairwise accumulation in the same floating representation
    /// as the problem data.
    ///
    /// # Panics
    /// Panics if `x` does not have length n.
    pub fn objective_value(&self, x: &[T]) -> T {
        assert_eq!(x.len(), self.num_variables());
        self.objective_vector.dot(x) + self.objective_constant
    }

    /// The row scaling vector, or an all-ones vector of length m when
    /// no scaling was applied.  Consumers always observe a vector of
    /// correct length.
    pub fn row_scaling_or_ones(&self) -> Vec<T> {
        match &self.row_scaling_vec {
            Some(v) => v.clone(),
            None => vec![T::one(); self.num_constraints()],
        }
    }

    /// The column scaling vector, or an all-ones vector of length n when
    /// no scaling was applied.
    pub fn col_scaling_or_ones(&self) -> Vec<T> {
        match &self.col_scaling_vec {
            Some(v) => v.clone(),
            None => vec![T::one(); self.num_variables()],
        }
    }

    /// Check every dimensional invariant of the problem data.
    ///
    /// All vector lengths are derived from the constraint matrix shape.
    /// Also checks `num_equalities <= m`, `lb <= ub` elementwise, and
    /// strict positivity of any scaling vectors.
    pub fn validate(&self) -> Result<(), DimensionError> {
        let (m, n) = self.constraint_matrix.size();

        check_length("objective_vector", self.objective_vector.len(), n)?;
        check_length("right_hand_side", self.right_hand_side.len(), m)?;
        check_length("variable_lower_bound", self.variable_lower_bound.len(), n)?;
        check_length("variable_upper_bound", self.variable_upper_bound.len(), n)?;

        if self.num_equalities > m {
            return Err(DimensionError::BadEqualityCount {
                neq: self.num_equalities,
                m,
            });
        }

        for (i, (lb, ub)) in
            std::iter::zip(&self.variable_lower_bound, &self.variable_upper_bound).enumerate()
        {
            if lb > ub {
                return Err(DimensionError::BoundOrder(i));
            }
        }

        if let Some(v) = &self.row_scaling_vec {
            check_length("row_scaling_vec", v.len(), m)?;
            check_positive("row_scaling_vec", v)?;
        }
        if let Some(v) = &self.col_scaling_vec {
            check_length("col_scaling_vec", v.len(), n)?;
            check_positive("col_scaling_vec", v)?;
        }

        Ok(())
    }
}

fn check_length(
    field: &'static str,
    got: usize,
    expected: usize,
) -> Result<(), DimensionError> {
    if got == expected {
        Ok(())
    } else {
        Err(DimensionError::BadVectorLength {
            field,
            got,
            expected,
        })
    }
}

fn check_positive<T: FloatT>(field: &'static str, v: &[T]) -> Result<(), DimensionError> {
    match v.iter().position(|&s| !(s > T::zero())) {
        Some(idx) => Err(DimensionError::BadScaling { field, idx }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_problem() -> StandardFormProblem<f64> {
        // x1 + x2 = 1, x1 - x2 >= 0
        let a = CscMatrix::from_triplets(2, 2, &[0, 1, 0, 1], &[0, 0, 1, 1], &[1., 1., 1., -1.]);
        StandardFormProblem::new(
            vec![2.0, 3.0],
            5.0,
            a,
            vec![1.0, 0.0],
            vec![0.0, 0.0],
            vec![1.0, f64::INFINITY],
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_accepts_consistent_data() {
        let problem = test_problem();
        assert_eq!(problem.num_variables(), 2);
        assert_eq!(problem.num_constraints(), 2);
        assert!(problem.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_rhs_length() {
        let mut problem = test_problem();
        problem.right_hand_side.push(0.0);
        assert!(matches!(
            problem.validate(),
            Err(DimensionError::BadVectorLength {
                field: "right_hand_side",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_equality_count() {
        let mut problem = test_problem();
        problem.num_equalities = 3;
        assert!(matches!(
            problem.validate(),
            Err(DimensionError::BadEqualityCount { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_crossed_bounds() {
        let mut problem = test_problem();
        problem.variable_lower_bound[1] = 2.0;
        problem.variable_upper_bound[1] = 1.0;
        assert!(matches!(
            problem.validate(),
            Err(DimensionError::BoundOrder(1))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_scaling() {
        let mut problem = test_problem();
        problem.row_scaling_vec = Some(vec![1.0, 0.0]);
        assert!(matches!(
            problem.validate(),
            Err(DimensionError::BadScaling { idx: 1, .. })
        ));

        problem.row_scaling_vec = Some(vec![1.0]);
        assert!(matches!(
            problem.validate(),
            Err(DimensionError::BadVectorLength { .. })
        ));
    }

    #[test]
    fn test_objective_value() {
        let problem = test_problem();
        assert_eq!(problem.objective_value(&[1.0, 1.0]), 10.0);
    }

    #[test]
    fn test_scaling_defaults_to_ones() {
        let problem = test_problem();
        assert_eq!(problem.row_scaling_or_ones(), vec![1.0, 1.0]);
        assert_eq!(problem.col_scaling_or_ones(), vec![1.0, 1.0]);
    }
}
