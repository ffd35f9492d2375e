//! Clustering-aware knows generation.
//!
//! The driver behind [`ClusteredKnows`]: partition the person array into
//! communities, estimate the clustering coefficient the community model
//! would produce, refine per-community densities toward an internal
//! set-point, materialize edges, then measure the realized graph. When the
//! measurement is off target the graph is discarded and the set-point moves
//! by a damped feedback step, so the analytic model's bias is corrected
//! against reality instead of being trusted.

use super::clustering::{
    compute_community_info, estimate_community_clustering, estimated_mean_clustering,
    ClusteringInfo,
};
use super::community::partition_communities;
use super::refine::refine_communities;
use super::report::{GenerationReport, WiringStats};
use super::traits::KnowsGenerator;
use super::wire::{wire_core, wire_periphery, wire_residual};
use crate::error::{Error, Result};
use crate::metrics;
use crate::population::Population;
use rand::prelude::*;
use std::time::Instant;

/// Tolerance between the measured and targeted clustering coefficient.
const TOLERANCE: f64 = 0.001;

/// Damping applied to the feedback step on the internal set-point.
const FEEDBACK_DAMPING: f64 = 0.8;

/// Knows generator that steers the realized graph's mean clustering
/// coefficient toward a configured target while approximating each
/// person's prescribed degree.
#[derive(Debug, Clone)]
pub struct ClusteredKnows {
    target_clustering: f64,
    min_community_prob: f64,
    max_iterations: usize,
}

impl ClusteredKnows {
    /// Create a generator with the default clustering target of 0.1.
    pub fn new() -> Self {
        Self {
            target_clustering: 0.1 / 2.0,
            min_community_prob: 0.0,
            max_iterations: 50,
        }
    }

    /// Set the clustering coefficient target.
    pub fn with_target_clustering(mut self, target: f64) -> Self {
        self.target_clustering = target / 2.0;
        self
    }

    /// Set the floor for per-community edge probabilities.
    pub fn with_min_community_prob(mut self, min_community_prob: f64) -> Self {
        self.min_community_prob = min_community_prob;
        self
    }

    /// Set the ceiling on driver iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn validate(
        &self,
        population: &Population,
        percentages: &[f64],
        step_index: usize,
    ) -> Result<()> {
        if population.is_empty() {
            return Err(Error::EmptyPopulation);
        }
        if percentages.is_empty() {
            return Err(Error::InvalidParameter {
                name: "percentages",
                message: "at least one generation step is required",
            });
        }
        if step_index >= percentages.len() {
            return Err(Error::StepOutOfRange {
                step: step_index,
                steps: percentages.len(),
            });
        }
        if percentages.iter().any(|&p| !(0.0..=1.0).contains(&p)) {
            return Err(Error::InvalidParameter {
                name: "percentages",
                message: "every entry must lie in [0, 1]",
            });
        }
        Ok(())
    }

    /// Weighted mean clustering of the realized graph: each person's local
    /// coefficient scaled by how much of their capacity this step realized.
    fn measure_clustering(population: &Population) -> f64 {
        let graph = population.to_graph();
        let coefficients = metrics::clustering_coefficient_list(&graph);
        let mut accum = 0.0;
        for (i, person) in population.iter().enumerate() {
            let degree = person.degree() as f64;
            let original = person.max_knows() as f64;
            if original > 1.0 {
                accum += coefficients[i] * degree * (degree - 1.0) / (original * (original - 1.0));
            }
        }
        accum / population.len() as f64
    }

    /// Wire the population's knows-sets for one generation step. See
    /// [`KnowsGenerator::generate`].
    pub fn generate(
        &self,
        population: &mut Population,
        seed: u64,
        percentages: &[f64],
        step_index: usize,
    ) -> Result<GenerationReport> {
        self.validate(population, percentages, step_index)?;
        let mut rng = StdRng::seed_from_u64(seed);

        let start = Instant::now();
        let mut communities = partition_communities(population, percentages, step_index);
        log::debug!(
            "partitioned {} persons into {} communities in {:?}",
            population.len(),
            communities.len(),
            start.elapsed()
        );

        let mut cinfo = ClusteringInfo::new(population.len(), &communities);

        for c in communities.iter_mut() {
            c.p = 1.0;
            compute_community_info(&mut cinfo, c, 1.0);
        }
        for c in communities.iter_mut() {
            c.p = 1.0;
            estimate_community_clustering(&mut cinfo, c, 1.0);
        }
        let estimated_max = estimated_mean_clustering(&communities, &cinfo, true);
        log::debug!("estimated maximum clustering coefficient: {estimated_max:.6}");

        for c in communities.iter_mut() {
            c.p = 0.5;
            estimate_community_clustering(&mut cinfo, c, 0.5);
        }

        let mut stats = WiringStats::default();
        let mut set_point = self.target_clustering;
        let mut iterations = 0;
        let (measured, converged) = loop {
            let iteration_start = Instant::now();
            refine_communities(
                &mut cinfo,
                &mut communities,
                set_point,
                self.min_community_prob,
                &mut rng,
            );

            for c in &communities {
                wire_core(population, c, &mut stats, &mut rng);
                wire_periphery(population, &cinfo, c, &mut stats);
            }
            wire_residual(population, &communities, &mut stats, &mut rng);

            let measured = Self::measure_clustering(population);
            iterations += 1;
            let delta = self.target_clustering - measured;
            log::debug!(
                "iteration {iterations}: measured clustering {measured:.6} \
                 (delta {delta:+.6}, {:?})",
                iteration_start.elapsed()
            );

            if delta.abs() <= TOLERANCE {
                break (measured, true);
            }
            if iterations >= self.max_iterations {
                log::warn!(
                    "clustering did not converge within {} iterations: \
                     set-point {:.4}, measured {measured:.4}",
                    self.max_iterations,
                    self.target_clustering
                );
                break (measured, false);
            }

            // Discard the graph and retry against a shifted set-point.
            stats.reset();
            population.clear_knows();
            set_point += FEEDBACK_DAMPING * delta;
        };

        let mut persons_over_target = 0;
        let mut excess_degree_sum = 0;
        let mut persons_under_target = 0;
        let mut deficit_degree_sum = 0;
        let mut persons_degree_zero = 0;
        for (i, person) in population.iter().enumerate() {
            if cinfo.is_core[i] {
                let target = person.target_edges(percentages, step_index);
                let realized = person.degree() as u64;
                if realized > target {
                    persons_over_target += 1;
                    excess_degree_sum += realized - target;
                } else if realized < target {
                    persons_under_target += 1;
                    deficit_degree_sum += target - realized;
                }
            }
            if person.degree() == 0 {
                persons_degree_zero += 1;
            }
        }

        let report = GenerationReport {
            stats,
            iterations,
            converged,
            final_clustering: measured,
            estimated_max_clustering: estimated_max,
            num_communities: cinfo.num_communities,
            persons_over_target,
            excess_degree_sum,
            persons_under_target,
            deficit_degree_sum,
            persons_degree_zero,
        };
        log::info!("knows generation finished in {:?}\n{report}", start.elapsed());
        Ok(report)
    }
}

impl Default for ClusteredKnows {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowsGenerator for ClusteredKnows {
    fn generate(
        &self,
        population: &mut Population,
        seed: u64,
        percentages: &[f64],
        step_index: usize,
    ) -> Result<GenerationReport> {
        ClusteredKnows::generate(self, population, seed, percentages, step_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::Person;

    fn population_with_max_knows(caps: &[u64]) -> Population {
        Population::new(
            caps.iter()
                .enumerate()
                .map(|(i, &cap)| Person::new(i as u64, cap))
                .collect(),
        )
    }

    fn mixed_population() -> Population {
        // Degree-sorted, as the upstream sharding guarantees.
        population_with_max_knows(&[
            12, 11, 10, 10, 9, 8, 8, 7, 7, 6, 6, 6, 5, 5, 5, 4, 4, 4, 3, 3, 3, 2, 2, 2, 1, 1, 1,
            1, 0, 0,
        ])
    }

    #[test]
    fn test_generate_rejects_empty_population() {
        let generator = ClusteredKnows::new();
        let mut population = Population::new(vec![]);
        let result = generator.generate(&mut population, 1, &[1.0], 0);
        assert_eq!(result, Err(Error::EmptyPopulation));
    }

    #[test]
    fn test_generate_rejects_bad_step_index() {
        let generator = ClusteredKnows::new();
        let mut population = population_with_max_knows(&[3, 3]);
        let result = generator.generate(&mut population, 1, &[0.5, 0.5], 2);
        assert_eq!(result, Err(Error::StepOutOfRange { step: 2, steps: 2 }));
    }

    #[test]
    fn test_generate_rejects_out_of_range_percentages() {
        let generator = ClusteredKnows::new();
        let mut population = population_with_max_knows(&[3, 3]);
        assert!(matches!(
            generator.generate(&mut population, 1, &[1.5], 0),
            Err(Error::InvalidParameter { name: "percentages", .. })
        ));
        assert!(matches!(
            generator.generate(&mut population, 1, &[], 0),
            Err(Error::InvalidParameter { name: "percentages", .. })
        ));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let generator = ClusteredKnows::new()
            .with_target_clustering(0.1)
            .with_max_iterations(5);

        let mut first = mixed_population();
        let mut second = mixed_population();
        let report_a = generator.generate(&mut first, 1234, &[0.8], 0).unwrap();
        let report_b = generator.generate(&mut second, 1234, &[0.8], 0).unwrap();

        assert_eq!(report_a, report_b);
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seeds_may_rewire() {
        let generator = ClusteredKnows::new()
            .with_target_clustering(0.1)
            .with_max_iterations(3);

        let mut first = mixed_population();
        let mut second = mixed_population();
        let _ = generator.generate(&mut first, 1, &[0.8], 0).unwrap();
        let _ = generator.generate(&mut second, 2, &[0.8], 0).unwrap();

        // Both runs still honor every person's capacity.
        for population in [&first, &second] {
            for person in population.iter() {
                assert!(person.degree() as u64 <= person.max_knows());
            }
        }
    }

    #[test]
    fn test_generate_honors_capacity_and_exit_predicate() {
        let generator = ClusteredKnows::new()
            .with_target_clustering(0.2)
            .with_max_iterations(20);
        let mut population = mixed_population();

        let report = generator.generate(&mut population, 77, &[0.9], 0).unwrap();

        for person in population.iter() {
            assert!(person.degree() as u64 <= person.max_knows());
        }
        // Either the measurement landed within tolerance of the internal
        // set-point, or the ceiling was hit.
        if report.converged {
            assert!((report.final_clustering - 0.1).abs() <= TOLERANCE);
            assert!(report.iterations <= 20);
        } else {
            assert_eq!(report.iterations, 20);
        }
        assert!(report.num_communities > 0);
    }

    #[test]
    fn test_single_person_converges_to_zero_target() {
        let generator = ClusteredKnows::new()
            .with_target_clustering(0.0)
            .with_max_iterations(5);
        let mut population = population_with_max_knows(&[3]);

        let report = generator.generate(&mut population, 5, &[1.0], 0).unwrap();

        assert!(report.converged);
        assert_eq!(report.iterations, 1);
        assert_eq!(report.num_communities, 1);
        assert_eq!(report.stats.total_edges(), 0);
        assert_eq!(population.person(0).degree(), 0);
    }

    #[test]
    fn test_two_persons_wire_one_edge() {
        let generator = ClusteredKnows::new()
            .with_target_clustering(0.0)
            .with_max_iterations(5);
        let mut population = population_with_max_knows(&[1, 1]);

        let report = generator.generate(&mut population, 21, &[1.0], 0).unwrap();

        assert!(report.converged);
        assert_eq!(report.stats.total_edges(), 1);
        assert_eq!(population.person(0).degree(), 1);
        assert_eq!(population.person(1).degree(), 1);
        assert_eq!(report.final_clustering, 0.0);
    }

    #[test]
    fn test_zero_degree_population_emits_nothing() {
        let generator = ClusteredKnows::new()
            .with_target_clustering(0.0)
            .with_max_iterations(5);
        let mut population = population_with_max_knows(&[0, 0, 0, 0, 0]);

        let report = generator.generate(&mut population, 3, &[1.0], 0).unwrap();

        assert!(report.converged);
        assert_eq!(report.stats.total_edges(), 0);
        assert_eq!(report.persons_degree_zero, 5);
        assert_eq!(report.final_clustering, 0.0);
    }

    #[test]
    fn test_report_counts_core_degree_deviations() {
        let generator = ClusteredKnows::new()
            .with_target_clustering(0.1)
            .with_max_iterations(5);
        let mut population = mixed_population();

        let report = generator.generate(&mut population, 99, &[0.8], 0).unwrap();

        let realized: u64 = population.iter().map(|p| p.degree() as u64).sum();
        assert_eq!(realized / 2, report.stats.total_edges());
        assert!(report.persons_degree_zero <= population.len());
    }

    #[test]
    fn test_trait_object_dispatch() {
        let generator: Box<dyn KnowsGenerator> = Box::new(
            ClusteredKnows::new()
                .with_target_clustering(0.0)
                .with_max_iterations(3),
        );
        let mut population = population_with_max_knows(&[1, 1]);
        let report = generator.generate(&mut population, 8, &[1.0], 0).unwrap();
        assert_eq!(report.stats.total_edges(), 1);
    }
}
