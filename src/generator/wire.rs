//! Edge materialization: turning the community model into knows edges.
//!
//! Three passes per driver iteration, in a fixed order. Core-core edges are
//! Bernoulli trials at the community's density. Core-periphery edges replay
//! the estimator's deterministic budget walk. Whatever core degree is still
//! unserved becomes stubs, paired off uniformly at random across the whole
//! graph in a configuration-model sweep. Rejected pairs (duplicates,
//! capacity overflows, self-pairs) are counted, never retried.

use super::clustering::ClusteringInfo;
use super::community::Community;
use super::report::WiringStats;
use crate::population::Population;
use rand::prelude::*;

/// Bernoulli wiring over the community core: each unordered pair gets one
/// draw against the community density.
pub(crate) fn wire_core(
    population: &mut Population,
    c: &Community,
    stats: &mut WiringStats,
    rng: &mut StdRng,
) {
    for member in &c.core {
        for other in &c.core {
            if member.index < other.index {
                let draw: f64 = rng.random();
                if draw <= c.p {
                    if population.create_edge(member.index, other.index) {
                        stats.core_core_edges += 1;
                    } else {
                        stats.misses += 1;
                    }
                }
            }
        }
    }
}

/// Deterministic budget walk attaching the periphery to the core, mirroring
/// the allocation the estimator already accounted for.
pub(crate) fn wire_periphery(
    population: &mut Population,
    cinfo: &ClusteringInfo,
    c: &Community,
    stats: &mut WiringStats,
) {
    let mut periphery_budget: Vec<u64> = c.periphery.iter().map(|m| m.degree).collect();
    for member in &c.core {
        let mut periphery_degree = 0.0;
        let max_degree = cinfo.expected_periphery_degree[member.index];
        for (slot, periphery_member) in periphery_budget.iter_mut().zip(&c.periphery) {
            if *slot != 0 && periphery_degree < max_degree {
                periphery_degree += 1.0;
                *slot -= 1;
                if population.create_edge(member.index, periphery_member.index) {
                    stats.core_periphery_edges += 1;
                } else {
                    stats.misses += 1;
                }
            }
        }
    }

    for member in &c.periphery {
        if population.person(member.index).degree() as u64 > member.degree {
            log::error!(
                "periphery person {} exceeded its target degree {}",
                member.index,
                member.degree
            );
        }
    }
}

/// Configuration-model sweep over the residual core degree deficit: one
/// stub per missing edge, shuffled and paired off two at a time.
pub(crate) fn wire_residual(
    population: &mut Population,
    communities: &[Community],
    stats: &mut WiringStats,
    rng: &mut StdRng,
) {
    let mut stubs: Vec<usize> = Vec::new();
    for c in communities {
        for member in &c.core {
            let realized = population.person(member.index).degree() as u64;
            if member.degree > realized {
                for _ in 0..(member.degree - realized) {
                    stubs.push(member.index);
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..stubs.len()).collect();
    stubs.shuffle(rng);
    order.shuffle(rng);

    let mut queue = order.into_iter();
    while let Some(first) = queue.next() {
        let Some(second) = queue.next() else {
            break;
        };
        let a = stubs[first];
        let b = stubs[second];
        if a == b {
            stats.misses += 1;
            continue;
        }
        if population.create_edge(a, b) {
            stats.core_external_edges += 1;
        } else {
            stats.misses += 1;
        }
    }
}
