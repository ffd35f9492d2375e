//! Knows-graph generators.
//!
//! A generator takes a similarity-sorted population and wires its
//! knows-sets for one generation step. [`ClusteredKnows`] is the
//! clustering-aware generator: it partitions the array into core/periphery
//! communities, tunes per-community edge densities against an analytic
//! clustering estimate, and materializes edges in three passes with an
//! outer measure-and-retry feedback loop.

mod clustered;
mod clustering;
mod community;
mod refine;
mod report;
mod traits;
mod wire;

pub use clustered::ClusteredKnows;
pub use report::{GenerationReport, WiringStats};
pub use traits::KnowsGenerator;
