//! Generator traits.

use crate::error::Result;
use crate::generator::report::GenerationReport;
use crate::population::Population;

/// Trait for knows-graph generators.
pub trait KnowsGenerator {
    /// Wire the population's knows-sets for one generation step.
    ///
    /// `percentages[step_index]` is each person's share of capacity to
    /// realize in this step. Mutates the population in place and returns a
    /// run report.
    fn generate(
        &self,
        population: &mut Population,
        seed: u64,
        percentages: &[f64],
        step_index: usize,
    ) -> Result<GenerationReport>;
}
