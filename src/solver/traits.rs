use crate::algebra::FloatT;
use crate::problem::StandardFormProblem;
use crate::solver::{PdhgSettings, SolveResult};

/// Capability interface for engines that solve a standard form problem.
///
/// An engine is assumed to be long-running, blocking, and deterministic
/// given identical inputs and configuration.  The orchestration layer
/// is written against this trait so it can be exercised with fake
/// engines in tests.
pub trait SolveEngine<T: FloatT> {
    /// Solve `problem` under the given configuration.
    fn solve(&self, problem: &StandardFormProblem<T>, settings: &PdhgSettings<T>) -> SolveResult<T>;
}
