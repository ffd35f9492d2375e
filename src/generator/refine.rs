//! Stochastic refinement of per-community edge densities.
//!
//! A bounded hill-climber: while the estimated mean clustering coefficient
//! is off target, nudge one uniformly chosen community's density up or
//! down by `3 / |core|` and re-estimate. The climb stops once the estimate
//! is within tolerance or several consecutive nudge attempts find no
//! community left with headroom.

use super::clustering::{estimate_community_clustering, estimated_mean_clustering, ClusteringInfo};
use super::community::Community;
use rand::prelude::*;

/// Tolerance on the estimated mean clustering coefficient.
const TOLERANCE: f64 = 0.001;

/// Consecutive failed nudges tolerated before giving up.
const MAX_FAILED_TRIES: usize = 5;

/// Hard ceiling on successful nudges per refinement call. The climb
/// normally converges or exhausts its candidates long before this; the
/// ceiling breaks cycles where coarse steps straddle the target forever.
const MAX_NUDGES: usize = 1_000;

/// Density nudge for a community with `core_size` core members.
fn density_step(core_size: usize) -> f64 {
    3.0 / core_size as f64
}

/// Drive the estimated clustering coefficient toward `target`.
pub(crate) fn refine_communities(
    cinfo: &mut ClusteringInfo,
    communities: &mut [Community],
    target: f64,
    min_community_prob: f64,
    rng: &mut StdRng,
) {
    let mut current = estimated_mean_clustering(communities, cinfo, true);
    let mut tries = 0;
    let mut nudges = 0;
    while (current - target).abs() > TOLERANCE && tries <= MAX_FAILED_TRIES {
        if nudges >= MAX_NUDGES {
            log::warn!("refinement stopped after {MAX_NUDGES} nudges at estimate {current:.6}");
            break;
        }
        tries += 1;
        let found = if current < target {
            raise_density(cinfo, communities, rng)
        } else {
            lower_density(cinfo, communities, min_community_prob, rng)
        };
        if found {
            nudges += 1;
            current = estimated_mean_clustering(communities, cinfo, true);
            tries = 0;
        }
    }
    log::debug!(
        "refinement settled at estimate {current:.6} (advisory prob mass {:.2})",
        cinfo.sum_probs
    );
}

/// Raise a random community's density. Returns `false` when every
/// community is already saturated at 1.0.
fn raise_density(cinfo: &mut ClusteringInfo, communities: &mut [Community], rng: &mut StdRng) -> bool {
    let eligible: Vec<usize> = communities
        .iter()
        .enumerate()
        .filter(|(_, c)| c.p < 1.0)
        .map(|(index, _)| index)
        .collect();
    if eligible.is_empty() {
        return false;
    }
    let chosen = eligible[rng.random_range(0..eligible.len())];
    let c = &mut communities[chosen];
    let step = density_step(c.core.len());
    c.p = (c.p + step).min(1.0);
    cinfo.sum_probs += 0.01;
    estimate_community_clustering(cinfo, c, c.p);
    true
}

/// Lower a random community's density. Returns `false` when every
/// community already sits at the floor.
fn lower_density(
    cinfo: &mut ClusteringInfo,
    communities: &mut [Community],
    min_community_prob: f64,
    rng: &mut StdRng,
) -> bool {
    let eligible: Vec<usize> = communities
        .iter()
        .enumerate()
        .filter(|(_, c)| c.p > min_community_prob)
        .map(|(index, _)| index)
        .collect();
    if eligible.is_empty() {
        return false;
    }
    let chosen = eligible[rng.random_range(0..eligible.len())];
    let c = &mut communities[chosen];
    let step = density_step(c.core.len());
    c.p = (c.p - step).max(min_community_prob);
    cinfo.sum_probs -= 0.01;
    estimate_community_clustering(cinfo, c, c.p);
    true
}
