//! Argument routing for coordinated script runs.
//!
//! ```text
//! Combined tokens → Classify (catalog + declared flags) → Assemble per script → RoutingResult
//! ```
//!
//! Each stage is a pure function that can be unit-tested independently.

mod assembler;
pub mod catalog;
mod classifier;
mod decl;
mod router;

pub use assembler::{ArgAssembler, RoutedArgs};
pub use catalog::{FlagArity, FlagSpec};
pub use classifier::{classify, ClassifiedArg, ClassifyResult, FlagTable, TERMINATOR};
pub use decl::{is_flag_shaped, FlagDecl};
pub use router::{route, RoutingResult};
