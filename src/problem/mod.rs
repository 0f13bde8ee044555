//! The standard form problem data model, the MPS reader that produces
//! it, and the diagonal rescaling applied before solving.

mod mps;
mod rescale;
mod standard_form;

//export flattened
pub use mps::*;
pub use rescale::*;
pub use standard_form::*;
