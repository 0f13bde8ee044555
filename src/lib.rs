//! __firstlp__ is a small pipeline for linear programs: it reads an LP
//! in MPS format into a canonical standard form
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & c^T x + k\\\\\[2ex\]
//!  \text{subject to} & A_{eq} x = b_{eq} \\\\\[1ex\]
//!         & A_{ineq} x \geq b_{ineq} \\\\\[1ex\]
//!         & lb \leq x \leq ub
//!  \end{array}
//! $$
//!
//! with the equality rows stored first, and from there either
//!
//! * exports the problem as a portable sparse-triplet `.npz` archive
//!   ([`canonical`]), or
//! * solves it with a restarted, adaptively-stepped primal-dual hybrid
//!   gradient method ([`solver`]) and reports status, iterations and
//!   objective ([`driver`]).
//!
//! The two consumers share the same immutable
//! [`StandardFormProblem`](crate::problem::StandardFormProblem) data
//! model, and the reader and engine sit behind capability traits so the
//! orchestration can be exercised against fakes.

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod canonical;
pub mod driver;
pub mod problem;
pub mod solver;
