//! Wiring statistics and the end-of-run report.

use core::fmt;

/// Edge counters for one driver iteration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WiringStats {
    /// Edges created by the intra-core Bernoulli pass.
    pub core_core_edges: u64,
    /// Edges created by the core-periphery budget walk.
    pub core_periphery_edges: u64,
    /// Edges created by the residual stub-pairing pass.
    pub core_external_edges: u64,
    /// Pairs rejected by edge creation (duplicates, capacity, self-pairs).
    pub misses: u64,
}

impl WiringStats {
    /// Zero all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Total edges created across all three passes.
    pub fn total_edges(&self) -> u64 {
        self.core_core_edges + self.core_periphery_edges + self.core_external_edges
    }
}

/// Summary of a completed generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    /// Edge counters from the final iteration.
    pub stats: WiringStats,
    /// Driver iterations executed.
    pub iterations: usize,
    /// Whether the measured coefficient landed within tolerance.
    pub converged: bool,
    /// Measured weighted clustering coefficient at exit.
    pub final_clustering: f64,
    /// Analytic clustering estimate with every community at full density.
    pub estimated_max_clustering: f64,
    /// Number of communities the population was partitioned into.
    pub num_communities: usize,
    /// Core persons whose realized degree exceeds their target.
    pub persons_over_target: usize,
    /// Total realized degree in excess of targets, over core persons.
    pub excess_degree_sum: u64,
    /// Core persons whose realized degree falls short of their target.
    pub persons_under_target: usize,
    /// Total degree shortfall against targets, over core persons.
    pub deficit_degree_sum: u64,
    /// Persons left with no edges at all.
    pub persons_degree_zero: usize,
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "generated {} communities", self.num_communities)?;
        writeln!(f, "core-core edges: {}", self.stats.core_core_edges)?;
        writeln!(f, "core-periphery edges: {}", self.stats.core_periphery_edges)?;
        writeln!(f, "core-external edges: {}", self.stats.core_external_edges)?;
        writeln!(f, "edges missed: {}", self.stats.misses)?;
        writeln!(
            f,
            "persons above target degree: {} (excess {})",
            self.persons_over_target, self.excess_degree_sum
        )?;
        writeln!(
            f,
            "persons below target degree: {} (deficit {})",
            self.persons_under_target, self.deficit_degree_sum
        )?;
        writeln!(f, "persons with degree zero: {}", self.persons_degree_zero)?;
        writeln!(
            f,
            "iterations: {}{}",
            self.iterations,
            if self.converged { "" } else { " (ceiling hit)" }
        )?;
        write!(f, "final clustering coefficient: {:.6}", self.final_clustering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_zeroes_counters() {
        let mut stats = WiringStats {
            core_core_edges: 3,
            core_periphery_edges: 2,
            core_external_edges: 1,
            misses: 4,
        };
        stats.reset();
        assert_eq!(stats, WiringStats::default());
    }

    #[test]
    fn test_total_edges_excludes_misses() {
        let stats = WiringStats {
            core_core_edges: 3,
            core_periphery_edges: 2,
            core_external_edges: 1,
            misses: 4,
        };
        assert_eq!(stats.total_edges(), 6);
    }

    #[test]
    fn test_report_display_mentions_every_counter() {
        let report = GenerationReport {
            stats: WiringStats {
                core_core_edges: 10,
                core_periphery_edges: 5,
                core_external_edges: 2,
                misses: 1,
            },
            iterations: 3,
            converged: true,
            final_clustering: 0.05,
            estimated_max_clustering: 0.4,
            num_communities: 4,
            persons_over_target: 0,
            excess_degree_sum: 0,
            persons_under_target: 2,
            deficit_degree_sum: 3,
            persons_degree_zero: 1,
        };
        let text = report.to_string();
        assert!(text.contains("core-core edges: 10"));
        assert!(text.contains("core-periphery edges: 5"));
        assert!(text.contains("core-external edges: 2"));
        assert!(text.contains("edges missed: 1"));
        assert!(text.contains("iterations: 3"));
        assert!(!text.contains("ceiling hit"));
    }
}
