//! Analytic clustering estimates under the community edge model.
//!
//! For each community the model assumes Bernoulli(p) wiring inside the
//! core, a deterministic budget walk attaching the periphery, and random
//! pairing of whatever degree is left over ("external stubs") across
//! communities. [`ClusteringInfo`] is the per-person ledger of expected
//! degrees under that model, and the estimator turns the ledger into a
//! per-person expected local clustering coefficient without materializing
//! a single edge.

use super::community::Community;

/// Per-person and per-community statistical ledger. All vectors are sized
/// at construction and never grow.
#[derive(Debug, Clone)]
pub(crate) struct ClusteringInfo {
    /// Whether the person sits in some community's core.
    pub is_core: Vec<bool>,
    /// Community id per person.
    pub community_id: Vec<usize>,
    /// Expected number of intra-core edges per core person.
    pub expected_core_degree: Vec<f64>,
    /// Target degree left after the expected core edges.
    pub excedence_degree: Vec<f64>,
    /// Expected number of periphery edges per core person.
    pub expected_periphery_degree: Vec<f64>,
    /// Expected degree served outside the community per core person.
    pub expected_external_degree: Vec<f64>,
    /// Estimated local clustering coefficient per person.
    pub clustering_coefficient: Vec<f64>,
    /// Sum of expected external degrees over each community's core.
    pub community_core_stubs: Vec<f64>,
    /// Intra-core edge probability per community.
    pub community_core_probs: Vec<f64>,
    /// Indices of all core persons, in community order.
    pub core_nodes: Vec<usize>,
    /// Advisory running tally of probability mass moved by refinement.
    pub sum_probs: f64,
    /// Number of communities the ledger covers.
    pub num_communities: usize,
}

impl ClusteringInfo {
    pub fn new(num_persons: usize, communities: &[Community]) -> Self {
        let mut info = Self {
            is_core: vec![false; num_persons],
            community_id: vec![0; num_persons],
            expected_core_degree: vec![0.0; num_persons],
            excedence_degree: vec![0.0; num_persons],
            expected_periphery_degree: vec![0.0; num_persons],
            expected_external_degree: vec![0.0; num_persons],
            clustering_coefficient: vec![0.0; num_persons],
            community_core_stubs: vec![0.0; communities.len()],
            community_core_probs: vec![0.0; communities.len()],
            core_nodes: Vec::new(),
            sum_probs: communities.len() as f64,
            num_communities: communities.len(),
        };
        for (id, c) in communities.iter().enumerate() {
            for member in &c.core {
                info.core_nodes.push(member.index);
                info.is_core[member.index] = true;
                info.community_id[member.index] = id;
            }
            for member in &c.periphery {
                info.is_core[member.index] = false;
                info.community_id[member.index] = id;
            }
        }
        info
    }
}

/// Fill the ledger's expected degrees for one community at probability
/// `prob`.
///
/// The periphery allocation is a deterministic packing walk: core members
/// in order consume periphery budget slots up to their excedence degree.
/// The wiring pass later replays exactly this walk, so the allocation is
/// reproducible by construction.
pub(crate) fn compute_community_info(cinfo: &mut ClusteringInfo, c: &Community, prob: f64) {
    let mut periphery_budget: Vec<u64> = c.periphery.iter().map(|m| m.degree).collect();

    let expected_core = (c.core.len() as f64 - 1.0) * prob;
    for member in &c.core {
        cinfo.expected_core_degree[member.index] = expected_core;
        cinfo.excedence_degree[member.index] = member.degree as f64 - expected_core;
        cinfo.expected_periphery_degree[member.index] = 0.0;
    }

    let mut remaining_stubs = 0.0;
    for member in &c.core {
        let mut periphery_degree = 0.0;
        let max_degree = cinfo.excedence_degree[member.index];
        for slot in periphery_budget.iter_mut() {
            if *slot != 0 && periphery_degree < max_degree {
                periphery_degree += 1.0;
                *slot -= 1;
            }
        }
        cinfo.expected_periphery_degree[member.index] = periphery_degree;

        let external = member.degree as f64 - expected_core - periphery_degree;
        cinfo.expected_external_degree[member.index] = external;
        remaining_stubs += external;
    }
    cinfo.community_core_stubs[c.id] = remaining_stubs;
    cinfo.community_core_probs[c.id] = c.p;
}

/// Re-derive the expected degrees for `c` at `prob` and update its members'
/// clustering-coefficient estimates.
pub(crate) fn estimate_community_clustering(cinfo: &mut ClusteringInfo, c: &Community, prob: f64) {
    compute_community_info(cinfo, c, prob);

    // Properties of the external stub pool, seen from this community: the
    // chance a random stub pairing stays within one other community, and
    // the chance it additionally closes a triangle there.
    let mut prob_same_community = 0.0;
    let mut prob_triangle_same_community = 0.0;
    let mut sum_stubs = 0.0;
    for (id, &stubs) in cinfo.community_core_stubs.iter().enumerate() {
        if id != c.id {
            let squared = stubs * stubs;
            prob_same_community += squared;
            prob_triangle_same_community += squared * cinfo.community_core_probs[id];
            sum_stubs += stubs;
        }
    }
    if sum_stubs > 0.0 {
        prob_same_community /= sum_stubs * sum_stubs;
        prob_triangle_same_community /= sum_stubs * sum_stubs;
    } else {
        prob_same_community = 0.0;
        prob_triangle_same_community = 0.0;
    }

    let mut prob_two_connected = 0.0;
    for &i in &cinfo.core_nodes {
        let degree1 = cinfo.expected_external_degree[i];
        if degree1 >= 1.0 {
            for &other in &cinfo.core_nodes {
                // TODO: this filter compares a community id against itself
                // and never passes, leaving the two-connected term at zero;
                // it should probably compare against `other`'s community.
                if cinfo.community_id[i] != cinfo.community_id[i] {
                    let degree2 = cinfo.expected_external_degree[other];
                    if degree2 >= 1.0 {
                        prob_two_connected += degree1 * degree2 / (2.0 * sum_stubs * sum_stubs);
                    }
                }
            }
        }
    }

    // Periphery members: all their edges land inside the core, so their
    // neighbor pairs close with probability p.
    for member in &c.periphery {
        if member.degree > 1 {
            let degree = member.degree as f64;
            let original = member.original_degree as f64;
            cinfo.clustering_coefficient[member.index] =
                degree * (degree - 1.0) * prob / (original * (original - 1.0));
        }
    }

    // Core members: triangles split into core-core, core-periphery, and
    // external contributions, normalized by the person's full capacity.
    let mut periphery_budget: Vec<u64> = c.periphery.iter().map(|m| m.degree).collect();
    for member in &c.core {
        if member.degree <= 1 {
            continue;
        }

        let internal_degree = cinfo.expected_core_degree[member.index];
        let internal_triangles = if internal_degree >= 2.0 {
            internal_degree * (internal_degree - 1.0) * prob
        } else {
            0.0
        };

        let mut periphery_triangles = 0.0;
        let mut remaining_degree = member.degree;
        for (slot, periphery_member) in periphery_budget.iter_mut().zip(&c.periphery) {
            if *slot > 0 {
                *slot -= 1;
                remaining_degree -= 1;
                if periphery_member.degree > 1 {
                    periphery_triangles += 2.0 * (periphery_member.degree - 1) as f64 * prob;
                }
            }
            if remaining_degree == 0 {
                break;
            }
        }

        let external_degree = cinfo.expected_external_degree[member.index];
        let mut external_triangles = 0.0;
        if external_degree >= 2.0 {
            external_triangles +=
                external_degree * (external_degree - 1.0) * prob_triangle_same_community;
            external_triangles += external_degree
                * (external_degree - 1.0)
                * (1.0 - prob_same_community)
                * prob_two_connected;
        }

        let original = member.original_degree as f64;
        if original >= 2.0 {
            cinfo.clustering_coefficient[member.index] =
                (internal_triangles + periphery_triangles + external_triangles)
                    / (original * (original - 1.0));
        }
    }
}

/// Mean of the estimated coefficients over the population.
///
/// With `count_zeros` the mean is taken over every person; without it,
/// only persons with a positive target degree enter the denominator.
pub(crate) fn estimated_mean_clustering(
    communities: &[Community],
    cinfo: &ClusteringInfo,
    count_zeros: bool,
) -> f64 {
    let mut accum = 0.0;
    let mut count = 0usize;
    for c in communities {
        for member in c.core.iter().chain(&c.periphery) {
            if member.degree > 0 {
                accum += cinfo.clustering_coefficient[member.index];
                count += 1;
            }
        }
    }
    if count_zeros {
        accum / cinfo.clustering_coefficient.len() as f64
    } else if count > 0 {
        accum / count as f64
    } else {
        0.0
    }
}
