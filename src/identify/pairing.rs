//! Pairing of single-sided aggregates into two-aggregate membranes.
//!
//! When the cutoff is smaller than the bilayer thickness each leaflet forms
//! an aggregate of its own and none of them splits. Two such aggregates are
//! paired when most particles of each have a partner in the other within the
//! pairing distance.

use std::collections::HashMap;

use super::aggregate::Aggregation;
use super::linalg::{Vec3, add, dot, norm, normalize, scale, sub};
use super::pbc::Metric;
use super::spatial::SpatialGrid;
use super::splitter::{PlaneReference, SurfaceOrientation, build_leaflet};
use crate::model::membrane::Membrane;

/// An aggregate that looked like a lone monolayer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Monolayer {
    /// Index into the snapshot's aggregate list.
    pub aggregate: usize,
    pub orientation: SurfaceOrientation,
}

/// Parameters of the pairing pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairingParams {
    pub cutoff: f64,
    pub min_fraction: f64,
    pub planarity_threshold: f64,
}

/// Pairs monolayer aggregates and builds one membrane per pair.
///
/// Pairs are chosen greedily by descending mutual coverage (the smaller of
/// the two facing fractions), ties going to the lower aggregate indices. An
/// aggregate takes part in at most one pair.
pub fn pair_monolayers(
    monolayers: &[Monolayer],
    aggregation: &Aggregation,
    positions: &[Vec3],
    metric: &Metric,
    params: &PairingParams,
) -> Vec<Membrane> {
    if monolayers.len() < 2 {
        return Vec::new();
    }
    let aggregates = &aggregation.aggregates;

    // Pool every candidate particle into one grid; `owner` maps pool index
    // to position in `monolayers`.
    let mut pool = Vec::new();
    let mut owner = Vec::new();
    for (slot, mono) in monolayers.iter().enumerate() {
        for &i in aggregates[mono.aggregate].indices() {
            pool.push(positions[i]);
            owner.push(slot);
        }
    }
    let grid = SpatialGrid::new(&pool, metric, params.cutoff);

    let mut facing: HashMap<(usize, usize), usize> = HashMap::new();
    let mut partners = Vec::new();
    for p in 0..pool.len() {
        partners.clear();
        partners.extend(
            grid.query_particle(p, &pool, metric, params.cutoff)
                .into_iter()
                .map(|q| owner[q])
                .filter(|&slot| slot != owner[p]),
        );
        partners.sort_unstable();
        partners.dedup();
        for &other in &partners {
            *facing.entry((owner[p], other)).or_default() += 1;
        }
    }

    let size = |slot: usize| aggregates[monolayers[slot].aggregate].size() as f64;
    let mut candidates: Vec<(f64, usize, usize)> = facing
        .iter()
        .filter(|&(&(a, b), _)| a < b)
        .filter_map(|(&(a, b), &count_ab)| {
            let count_ba = facing.get(&(b, a)).copied().unwrap_or(0);
            let coverage = (count_ab as f64 / size(a)).min(count_ba as f64 / size(b));
            (coverage >= params.min_fraction).then_some((coverage, a, b))
        })
        .collect();
    candidates.sort_by(|x, y| {
        y.0.total_cmp(&x.0)
            .then_with(|| x.1.cmp(&y.1))
            .then_with(|| x.2.cmp(&y.2))
    });

    let mut used = vec![false; monolayers.len()];
    let mut membranes = Vec::new();
    for (coverage, a, b) in candidates {
        if used[a] || used[b] {
            continue;
        }
        used[a] = true;
        used[b] = true;
        log::trace!(
            "pairing aggregates {} and {} (coverage {coverage:.2})",
            monolayers[a].aggregate,
            monolayers[b].aggregate
        );
        membranes.push(build_pair(&monolayers[a], &monolayers[b], aggregation, metric, params));
    }
    membranes
}

fn centroid(indices: &[usize], unwrapped: &[Vec3]) -> Vec3 {
    let sum = indices.iter().fold([0.0; 3], |acc, &i| add(acc, unwrapped[i]));
    scale(sum, 1.0 / indices.len().max(1) as f64)
}

fn mean_radius(points: impl Iterator<Item = Vec3>, center: Vec3) -> f64 {
    let (total, count) = points.fold((0.0, 0usize), |(total, count), p| {
        (total + norm(sub(p, center)), count + 1)
    });
    total / count.max(1) as f64
}

/// Orders the two monolayers (outer or upper first) and fits their planes.
fn build_pair(
    a: &Monolayer,
    b: &Monolayer,
    aggregation: &Aggregation,
    metric: &Metric,
    params: &PairingParams,
) -> Membrane {
    let aggregates = &aggregation.aggregates;
    let unwrapped = &aggregation.unwrapped;
    let members_a = aggregates[a.aggregate].indices();
    let members_b = aggregates[b.aggregate].indices();
    let centroid_a = centroid(members_a, unwrapped);
    let centroid_b = centroid(members_b, unwrapped);
    let closed = a.orientation.closed || b.orientation.closed;

    // Each aggregate is unwrapped on its own, so the separation of the two
    // centroids needs the minimum image.
    let separation = metric.minimum_image(sub(centroid_b, centroid_a));

    let a_first = if closed {
        let joint = add(centroid_a, scale(separation, 0.5));
        let shift_b = sub(add(centroid_a, separation), centroid_b);
        let radius_a = mean_radius(members_a.iter().map(|&i| unwrapped[i]), joint);
        let radius_b = mean_radius(members_b.iter().map(|&i| add(unwrapped[i], shift_b)), joint);
        radius_a >= radius_b
    } else {
        let joint_normal = normalize(add(a.orientation.mean_normal, b.orientation.mean_normal))
            .unwrap_or([0.0, 0.0, 1.0]);
        dot(separation, joint_normal) <= 0.0
    };

    let (first, second) = if a_first { (a, b) } else { (b, a) };
    let size = first
        .orientation
        .characteristic_size
        .max(second.orientation.characteristic_size);

    let leaflet = |mono: &Monolayer| {
        let members = aggregates[mono.aggregate].indices();
        let reference = PlaneReference {
            periods: &aggregation.periods[mono.aggregate],
            characteristic_size: size,
            planarity_threshold: params.planarity_threshold,
        };
        build_leaflet(members.to_vec(), unwrapped, mono.orientation.mean_normal, &reference)
    };

    Membrane {
        leaflets: [leaflet(first), leaflet(second)],
        aggregates: vec![first.aggregate, second.aggregate],
        pivots: Vec::new(),
        closed,
        has_rim: false,
    }
}
