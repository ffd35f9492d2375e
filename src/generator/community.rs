//! Community discovery over a similarity-sorted person array.
//!
//! A community is a contiguous window of the array split into a dense
//! **core** (persons whose target degree can sustain a near-clique of the
//! core's size) and a sparser **periphery** attached to the core's leftover
//! degree budget. The sweep grows each window greedily and keeps probing a
//! few positions past the last feasible endpoint before it commits, so
//! communities are locally maximal under the feasibility check.
//!
//! Feasibility is a degree-budget argument: after the core pays for its own
//! near-clique, each core member retains `degree − (|core| − 1)` spare
//! stubs, and the periphery's degree multiset must be absorbable by that
//! budget vector one stub at a time.

use crate::population::Population;

/// How many consecutive infeasible window extensions the sweep tolerates
/// before committing to the last feasible endpoint.
const WINDOW_LOOKAHEAD: usize = 5;

/// Degree ledger for one person, valid for a single generator invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PersonInfo {
    /// Position in the person array.
    pub index: usize,
    /// Target degree for this step.
    pub degree: u64,
    /// Upper bound on the person's knows capacity.
    pub original_degree: u64,
}

/// A contiguous block of the person array with a dense core, a periphery,
/// and an intra-core edge probability.
#[derive(Debug, Clone)]
pub(crate) struct Community {
    pub id: usize,
    pub core: Vec<PersonInfo>,
    pub periphery: Vec<PersonInfo>,
    pub p: f64,
}

/// Sort by descending target degree, ascending index on ties.
fn sort_by_degree(nodes: &mut [PersonInfo]) {
    nodes.sort_by(|a, b| b.degree.cmp(&a.degree).then(a.index.cmp(&b.index)));
}

/// Spare stubs each core member keeps after completing the core near-clique.
/// Entries can go negative for members admitted while the core was still
/// small; only positive slots absorb periphery degree.
fn initial_budget(core: &[PersonInfo]) -> Vec<i64> {
    let core_size = core.len() as i64;
    core.iter()
        .map(|info| info.degree as i64 - (core_size - 1))
        .collect()
}

/// Verify the core's spare budget can absorb the periphery's degrees.
/// Consumes the candidate vectors and returns them (periphery sorted) on
/// success, `None` when some periphery degree cannot be satisfied.
fn check_budget(
    core: Vec<PersonInfo>,
    mut periphery: Vec<PersonInfo>,
) -> Option<(Vec<PersonInfo>, Vec<PersonInfo>)> {
    let mut budget = initial_budget(&core);
    sort_by_degree(&mut periphery);
    for info in &periphery {
        let mut remaining = info.degree;
        let mut slot = 0;
        while slot < budget.len() && remaining > 0 {
            if budget[slot] > 0 {
                budget[slot] -= 1;
                remaining -= 1;
            }
            slot += 1;
        }
        if remaining > 0 {
            return None;
        }
    }
    Some((core, periphery))
}

/// Attempt to split the window `[begin, last]` into a feasible core and
/// periphery.
fn probe_window(
    population: &Population,
    percentages: &[f64],
    step_index: usize,
    begin: usize,
    last: usize,
) -> Option<(Vec<PersonInfo>, Vec<PersonInfo>)> {
    let mut nodes = Vec::with_capacity(last - begin + 1);
    for index in begin..=last {
        let person = population.person(index);
        nodes.push(PersonInfo {
            index,
            degree: person.target_edges(percentages, step_index),
            original_degree: person.max_knows(),
        });
    }
    sort_by_degree(&mut nodes);

    // A node of degree d can sit in a clique of size at most d + 1, so in
    // sorted order it joins the core exactly while its degree covers the
    // core built so far.
    let mut core = Vec::new();
    let mut periphery = Vec::new();
    for info in nodes {
        if info.degree >= core.len() as u64 {
            core.push(info);
        } else {
            periphery.push(info);
        }
    }
    check_budget(core, periphery)
}

/// Partition the whole person array into communities.
///
/// Every person lands in exactly one community, and within a community the
/// core and periphery stay in comparator order. Infeasible probes are
/// absorbed by the lookahead; the sweep always completes.
pub(crate) fn partition_communities(
    population: &Population,
    percentages: &[f64],
    step_index: usize,
) -> Vec<Community> {
    let end = population.len();
    let mut communities = Vec::new();
    let mut begin = 0;
    let mut last = 0;
    while last < end {
        let mut best = last;
        let mut probes_failed = 0;
        let mut best_solution = None;
        while probes_failed <= WINDOW_LOOKAHEAD && last < end {
            probes_failed += 1;
            if let Some(solution) = probe_window(population, percentages, step_index, begin, last) {
                best_solution = Some(solution);
                probes_failed = 0;
                best = last;
            }
            last += 1;
        }
        let Some((core, periphery)) = best_solution else {
            // A one-person window always passes the budget check, so the
            // probe loop records a solution before the lookahead runs out.
            log::error!("community sweep found no feasible window at person {begin}");
            break;
        };

        let community = Community {
            id: communities.len(),
            core,
            periphery,
            p: 1.0,
        };
        check_core_viability(&community);
        communities.push(community);

        last = best + 1;
        begin = last;
    }
    communities
}

/// Core viability diagnostic: every core member must afford the core
/// near-clique. A violation is a bug in the sweep, not a runtime failure.
fn check_core_viability(community: &Community) {
    let required = community.core.len() as u64 - 1;
    for info in &community.core {
        if info.degree < required {
            log::error!(
                "community {}: core person {} has degree {} < {}",
                community.id,
                info.index,
                info.degree,
                required
            );
        }
    }
}
