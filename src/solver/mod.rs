// package together the solver components and re-export
// in a partially flattened structure :
// : user settings and the policy parameter objects
// : solve result and status types
// : the engine capability trait
// : the PDHG engine itself

mod pdhg;
mod restart;
mod settings;
mod solution;
mod stepsize;
mod termination;
mod traits;

//export flattened
pub use pdhg::*;
pub use restart::*;
pub use settings::*;
pub use solution::*;
pub use stepsize::*;
pub use termination::*;
pub use traits::*;
