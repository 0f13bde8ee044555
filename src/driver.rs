//! End-to-end solve orchestration.
//!
//! Drives the full sequence: obtain a standard form problem from a
//! [`StandardFormSource`], invoke a [`SolveEngine`] under a validated
//! configuration, then compute the realized objective
//! `c'x + k` from the same problem instance the engine saw.  Errors
//! from the reader propagate unchanged; there are no retries at this
//! layer.

use crate::algebra::FloatT;
use crate::problem::{MpsReader, ParseError, StandardFormSource};
use crate::solver::{PdhgSettings, PdhgSolver, SolveEngine, SolveResult};
use std::path::Path;

/// Outcome of an end-to-end solve: the engine result plus the realized
/// objective value.
#[derive(Debug)]
pub struct SolveReport<T> {
    /// result returned by the solve engine
    pub result: SolveResult<T>,
    /// objective value realized at the primal solution
    pub objective: T,
}

/// Read the problem at `source`, solve it, and report the realized
/// objective.
pub fn run<T, R, E>(
    reader: &R,
    engine: &E,
    settings: &PdhgSettings<T>,
    source: &Path,
) -> Result<SolveReport<T>, ParseError>
where
    T: FloatT,
    R: StandardFormSource<T>,
    E: SolveEngine<T>,
{
    let problem = reader.read_standard_form(source)?;
    let result = engine.solve(&problem, settings);
    let objective = problem.objective_value(&result.x);
    Ok(SolveReport { result, objective })
}

/// Convenience entry using the in-tree MPS reader and PDHG engine.
pub fn run_default(
    source: &Path,
    settings: &PdhgSettings<f64>,
) -> Result<SolveReport<f64>, ParseError> {
    run(&MpsReader, &PdhgSolver, settings, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::CscMatrix;
    use crate::problem::StandardFormProblem;
    use crate::solver::{PdhgSettingsBuilder, SolveResult, SolverStatus};

    struct FakeReader;

    impl StandardFormSource<f64> for FakeReader {
        fn read_standard_form(
            &self,
            _source: &Path,
        ) -> Result<StandardFormProblem<f64>, ParseError> {
            let a = CscMatrix::from_triplets(1, 2, &[0, 0], &[0, 1], &[1.0, 1.0]);
            Ok(StandardFormProblem::new(
                vec![2.0, 3.0],
                5.0,
                a,
                vec![2.0],
                vec![0.0, 0.0],
                vec![2.0, 2.0],
                1,
            )
            .unwrap())
        }
    }

    struct FailingReader;

    impl StandardFormSource<f64> for FailingReader {
        fn read_standard_form(
            &self,
            _source: &Path,
        ) -> Result<StandardFormProblem<f64>, ParseError> {
            Err(ParseError::Syntax {
                line: 7,
                msg: "boom".to_owned(),
            })
        }
    }

    struct FakeEngine;

    impl SolveEngine<f64> for FakeEngine {
        fn solve(
            &self,
            problem: &StandardFormProblem<f64>,
            _settings: &PdhgSettings<f64>,
        ) -> SolveResult<f64> {
            let mut result =
                SolveResult::new(problem.num_variables(), problem.num_constraints());
            result.status = SolverStatus::Optimal;
            result.iterations = 7;
            result.x = vec![1.0, 1.0];
            result
        }
    }

    fn settings() -> PdhgSettings<f64> {
        PdhgSettingsBuilder::default().verbosity(1).build().unwrap()
    }

    #[test]
    fn test_objective_uses_problem_vector_and_constant() {
        let report = run(&FakeReader, &FakeEngine, &settings(), Path::new("unused")).unwrap();
        // 2*1 + 3*1 + 5 = 10
        assert_eq!(report.objective, 10.0);
        assert_eq!(report.result.status, SolverStatus::Optimal);
        assert_eq!(report.result.iterations, 7);
    }

    #[test]
    fn test_reader_errors_propagate_unchanged() {
        let err = run(&FailingReader, &FakeEngine, &settings(), Path::new("unused"))
            .err()
            .unwrap();
        match err {
            ParseError::Syntax { line, msg } => {
                assert_eq!(line, 7);
                assert_eq!(msg, "boom");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_end_to_end_with_real_engine() {
        let report = run(
            &FakeReader,
            &crate::solver::PdhgSolver,
            &settings(),
            Path::new("unused"),
        )
        .unwrap();
        // min 2 x1 + 3 x2 + 5  s.t.  x1 + x2 = 2, 0 <= x <= 2
        // optimum x = (2, 0), objective 9
        assert_eq!(report.result.status, SolverStatus::Optimal);
        assert!((report.objective - 9.0).abs() < 1e-2);
    }
}
