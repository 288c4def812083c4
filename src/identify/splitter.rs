//! Leaflet splitting and planarity classification.
//!
//! Splitting an aggregate runs in four stages:
//!
//! 1. **Orientation**: local PCA normals are given consistent signs by
//!    growing oriented regions from a seed, always crossing the neighbor
//!    edge whose normals agree best (largest |n_i · n_j|) next.
//! 2. **Global sign**: each oriented region is flipped so that its normals
//!    point outward (closed surface) or along the positive dominant axis
//!    (open surface).
//! 3. **Sides**: a bilayer particle's neighborhood contains part of the
//!    apposed leaflet, which drags the local centroid toward the mid-plane.
//!    The sign of `n_i · (x_i - centroid_i)` therefore tells the side.
//! 4. **Pivots**: particles whose side is ambiguous (tiny offset, or a
//!    normal that disagrees with its neighbors, as on a bicelle rim) are
//!    shared by both leaflets.
//!
//! The plane fitted to a leaflet of a box-spanning aggregate is constrained
//! to contain the box vectors the aggregate wraps along, so its deviation
//! does not depend on where the unwrapping seam falls.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::config::IdentifyConfig;
use super::linalg::{Vec3, add, cross, dot, neg, norm, normalize, pca, scale, sub};
use super::normal::{LocalFrame, estimate_normals};
use super::spatial::NeighborGraph;
use crate::model::membrane::{Leaflet, Membrane};

/// Mean-normal length (per particle) below which an oriented region is
/// treated as a closed surface.
const CLOSED_SURFACE_ALIGNMENT: f64 = 0.5;

/// Largest angular gap (radians) a group of pivots may leave around its own
/// centre and still count as a closed rim.
const RIM_MAX_GAP: f64 = std::f64::consts::FRAC_PI_2;

/// Why an aggregate produced no membrane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Degeneracy {
    /// Fewer particles than `min_aggregate_size`.
    TooSmall,
    /// No particle has a reliable normal.
    Unorientable,
    /// Too many particles could not be assigned to a side.
    SingleSided { pivot_fraction: f64 },
    /// One side has fewer than `min_leaflet_size` particles.
    Unbalanced { upper: usize, lower: usize },
}

impl Degeneracy {
    /// `true` for sheet-like aggregates that look like a lone monolayer.
    pub fn is_single_sided(&self) -> bool {
        matches!(self, Self::SingleSided { .. } | Self::Unbalanced { .. })
    }
}

/// Global orientation of an aggregate's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceOrientation {
    /// Mean oriented normal (not normalized).
    pub mean_normal: Vec3,
    pub closed: bool,
    /// RMS extent along the aggregate's largest principal axis, or
    /// `|a| / sqrt(12)` for the longest box vector `a` it wraps along.
    pub characteristic_size: f64,
}

/// Outcome of splitting one aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitOutcome {
    Membrane(Membrane),
    NoMembrane {
        reason: Degeneracy,
        orientation: Option<SurfaceOrientation>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Upper,
    Lower,
    Pivot,
}

/// Worklist entry for orientation propagation.
#[derive(Debug, Clone, Copy)]
struct Edge {
    weight: f64,
    target: usize,
    source: usize,
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Edge {}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    // Max-heap on weight; lower indices first among equal weights.
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then_with(|| other.target.cmp(&self.target))
            .then_with(|| other.source.cmp(&self.source))
    }
}

/// What every leaflet of one membrane is measured against.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlaneReference<'a> {
    /// Box vectors the underlying aggregate wraps along.
    pub periods: &'a [Vec3],
    pub characteristic_size: f64,
    pub planarity_threshold: f64,
}

/// Per-aggregate working state, indexed by local (member) position.
struct AggregateView<'a> {
    members: &'a [usize],
    graph: &'a NeighborGraph,
    unwrapped: &'a [Vec3],
}

impl AggregateView<'_> {
    fn len(&self) -> usize {
        self.members.len()
    }

    /// Local indices of the neighbors of local particle `i`.
    fn local_neighbors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph
            .neighbors(self.members[i])
            .iter()
            .filter_map(|n| self.members.binary_search(&n.index).ok())
    }

    fn position(&self, i: usize) -> Vec3 {
        self.unwrapped[self.members[i]]
    }
}

/// Splits one aggregate into two leaflets.
///
/// # Arguments
///
/// * `aggregate_id`: Index of the aggregate in the snapshot
/// * `members`: Sorted particle indices of the aggregate
/// * `graph`: Neighbor graph of the whole frame
/// * `unwrapped`: Positions with periodic jumps removed per aggregate
/// * `periods`: Box vectors the aggregate wraps along
/// * `config`: Splitting thresholds
pub fn split_aggregate(
    aggregate_id: usize,
    members: &[usize],
    graph: &NeighborGraph,
    unwrapped: &[Vec3],
    periods: &[Vec3],
    config: &IdentifyConfig,
) -> SplitOutcome {
    if members.len() < config.min_aggregate_size {
        return SplitOutcome::NoMembrane {
            reason: Degeneracy::TooSmall,
            orientation: None,
        };
    }

    let view = AggregateView {
        members,
        graph,
        unwrapped,
    };

    let frames = estimate_normals(graph, members, config.min_normal_neighbors);
    log::trace!(
        "aggregate {aggregate_id}: {} of {} particles with a reliable normal",
        frames.iter().filter(|f| f.is_reliable()).count(),
        members.len()
    );
    let mut normals: Vec<Option<Vec3>> = frames.iter().map(|f| f.normal).collect();

    let components = propagate_orientation(&view, &mut normals);
    if components.is_empty() {
        log::trace!("aggregate {aggregate_id}: no reliable normal");
        return SplitOutcome::NoMembrane {
            reason: Degeneracy::Unorientable,
            orientation: None,
        };
    }

    let characteristic_size = characteristic_size(&view, periods);

    let mut closed = false;
    let mut largest = 0usize;
    for component in &components {
        let is_closed = orient_globally(&view, &mut normals, component);
        if component.len() > largest {
            largest = component.len();
            closed = is_closed;
        }
    }

    let mean_normal = normals
        .iter()
        .flatten()
        .fold([0.0; 3], |acc, &n| add(acc, n));
    let orientation = SurfaceOrientation {
        mean_normal,
        closed,
        characteristic_size,
    };

    let sides = classify_sides(&view, &frames, &normals, config);

    let pivot_count = sides.iter().filter(|&&s| s == Side::Pivot).count();
    let upper_count = sides.iter().filter(|&&s| s == Side::Upper).count();
    let lower_count = sides.iter().filter(|&&s| s == Side::Lower).count();

    let pivot_fraction = pivot_count as f64 / view.len() as f64;
    if pivot_fraction > config.max_pivot_fraction {
        log::trace!(
            "aggregate {aggregate_id}: {pivot_count}/{} ambiguous particles, single-sided",
            view.len()
        );
        return SplitOutcome::NoMembrane {
            reason: Degeneracy::SingleSided { pivot_fraction },
            orientation: Some(orientation),
        };
    }
    if upper_count < config.min_leaflet_size || lower_count < config.min_leaflet_size {
        log::trace!("aggregate {aggregate_id}: unbalanced split {upper_count}/{lower_count}");
        return SplitOutcome::NoMembrane {
            reason: Degeneracy::Unbalanced {
                upper: upper_count,
                lower: lower_count,
            },
            orientation: Some(orientation),
        };
    }

    let mut upper = Vec::with_capacity(upper_count + pivot_count);
    let mut lower = Vec::with_capacity(lower_count + pivot_count);
    let mut pivots = Vec::with_capacity(pivot_count);
    let mut upper_hint = [0.0; 3];
    let mut lower_hint = [0.0; 3];
    for (i, side) in sides.iter().enumerate() {
        let index = members[i];
        let n = normals[i].unwrap_or([0.0; 3]);
        match side {
            Side::Upper => {
                upper.push(index);
                upper_hint = add(upper_hint, n);
            }
            Side::Lower => {
                lower.push(index);
                lower_hint = add(lower_hint, n);
            }
            Side::Pivot => {
                upper.push(index);
                lower.push(index);
                pivots.push(index);
            }
        }
    }

    let has_rim = pivots_form_rim(&view, &sides);
    log::trace!(
        "aggregate {aggregate_id}: leaflets {}/{} with {} pivots (closed: {closed}, rim: {has_rim})",
        upper.len(),
        lower.len(),
        pivots.len()
    );

    let reference = PlaneReference {
        periods,
        characteristic_size,
        planarity_threshold: config.planarity_threshold,
    };
    let upper = build_leaflet(upper, unwrapped, upper_hint, &reference);
    let lower = build_leaflet(lower, unwrapped, lower_hint, &reference);

    SplitOutcome::Membrane(Membrane {
        leaflets: [upper, lower],
        aggregates: vec![aggregate_id],
        pivots,
        closed,
        has_rim,
    })
}

/// Size that leaflet deviations are divided by. An aggregate that wraps
/// around the box has no edge, so its extent is that of one period.
fn characteristic_size(view: &AggregateView<'_>, periods: &[Vec3]) -> f64 {
    if periods.is_empty() {
        pca((0..view.len()).map(|i| view.position(i)))
            .map(|fit| fit.max_variance().sqrt())
            .unwrap_or(0.0)
    } else {
        periods.iter().map(|&v| norm(v)).fold(0.0, f64::max) / 12f64.sqrt()
    }
}

/// Orients normals consistently, one connected region of reliable particles
/// at a time. Returns the local indices of each region.
fn propagate_orientation(view: &AggregateView<'_>, normals: &mut [Option<Vec3>]) -> Vec<Vec<usize>> {
    let mut oriented = vec![false; view.len()];
    let mut components = Vec::new();
    let mut heap = BinaryHeap::new();

    for seed in 0..view.len() {
        if oriented[seed] || normals[seed].is_none() {
            continue;
        }

        let mut component = vec![seed];
        oriented[seed] = true;
        push_edges(view, normals, &oriented, seed, &mut heap);

        while let Some(edge) = heap.pop() {
            if oriented[edge.target] {
                continue;
            }
            let (Some(source), Some(target)) = (normals[edge.source], normals[edge.target]) else {
                continue;
            };
            if dot(source, target) < 0.0 {
                normals[edge.target] = Some(neg(target));
            }
            oriented[edge.target] = true;
            component.push(edge.target);
            push_edges(view, normals, &oriented, edge.target, &mut heap);
        }

        component.sort_unstable();
        components.push(component);
    }

    components
}

fn push_edges(
    view: &AggregateView<'_>,
    normals: &[Option<Vec3>],
    oriented: &[bool],
    source: usize,
    heap: &mut BinaryHeap<Edge>,
) {
    let Some(n_source) = normals[source] else {
        return;
    };
    for target in view.local_neighbors(source) {
        if oriented[target] {
            continue;
        }
        if let Some(n_target) = normals[target] {
            heap.push(Edge {
                weight: dot(n_source, n_target).abs(),
                target,
                source,
            });
        }
    }
}

/// Flips a region so it points outward (closed) or along its dominant
/// positive axis (open). Returns whether the region is closed.
fn orient_globally(view: &AggregateView<'_>, normals: &mut [Option<Vec3>], component: &[usize]) -> bool {
    let sum = component
        .iter()
        .filter_map(|&i| normals[i])
        .fold([0.0; 3], |acc, n| add(acc, n));
    let closed = norm(sum) < CLOSED_SURFACE_ALIGNMENT * component.len() as f64;

    let flip = if closed {
        let centroid = scale(
            component
                .iter()
                .fold([0.0; 3], |acc, &i| add(acc, view.position(i))),
            1.0 / component.len() as f64,
        );
        let outward: f64 = component
            .iter()
            .filter_map(|&i| normals[i].map(|n| dot(n, sub(view.position(i), centroid))))
            .sum();
        outward < 0.0
    } else {
        let mut axis = 0;
        for k in 1..3 {
            if sum[k].abs() > sum[axis].abs() {
                axis = k;
            }
        }
        sum[axis] < 0.0
    };

    if flip {
        for &i in component {
            normals[i] = normals[i].map(neg);
        }
    }
    closed
}

/// Assigns every particle to a side or to the pivot set.
fn classify_sides(
    view: &AggregateView<'_>,
    frames: &[LocalFrame],
    normals: &[Option<Vec3>],
    config: &IdentifyConfig,
) -> Vec<Side> {
    let mut sides = vec![Side::Pivot; view.len()];

    for i in 0..view.len() {
        let Some(n) = normals[i] else {
            continue;
        };
        let frame = &frames[i];

        let offset = dot(n, frame.offset_from_centroid) / frame.spread;

        let neighbor_sum = view
            .local_neighbors(i)
            .filter_map(|j| normals[j])
            .fold([0.0; 3], |acc, m| add(acc, m));
        let has_reliable_neighbor = view.local_neighbors(i).any(|j| normals[j].is_some());
        let alignment = if has_reliable_neighbor {
            normalize(neighbor_sum).map_or(0.0, |mean| dot(n, mean))
        } else {
            1.0
        };

        sides[i] = if offset.abs() < config.pivot_offset_band || alignment < config.pivot_alignment {
            Side::Pivot
        } else if offset > 0.0 {
            Side::Upper
        } else {
            Side::Lower
        };
    }

    // Particles without a usable normal follow the majority of their
    // classified neighbors.
    let reliable_sides = sides.clone();
    for i in 0..view.len() {
        if normals[i].is_some() {
            continue;
        }
        let (mut upper, mut lower) = (0usize, 0usize);
        for j in view.local_neighbors(i) {
            if normals[j].is_none() {
                continue;
            }
            match reliable_sides[j] {
                Side::Upper => upper += 1,
                Side::Lower => lower += 1,
                Side::Pivot => {}
            }
        }
        sides[i] = match upper.cmp(&lower) {
            Ordering::Greater => Side::Upper,
            Ordering::Less => Side::Lower,
            Ordering::Equal => Side::Pivot,
        };
    }

    sides
}

/// `true` when a connected group of pivots closes around its own centre in
/// the plane it spans, as the rim of a bicelle or of a pore does. Isolated
/// pivots at the corners of a finite patch do not.
fn pivots_form_rim(view: &AggregateView<'_>, sides: &[Side]) -> bool {
    let mut seen: Vec<bool> = sides.iter().map(|&s| s != Side::Pivot).collect();
    for seed in 0..view.len() {
        if seen[seed] {
            continue;
        }
        seen[seed] = true;
        let mut group = vec![seed];
        let mut next = 0;
        while next < group.len() {
            let i = group[next];
            next += 1;
            for j in view.local_neighbors(i) {
                if !seen[j] {
                    seen[j] = true;
                    group.push(j);
                }
            }
        }
        if encircles_centre(group.iter().map(|&i| view.position(i))) {
            return true;
        }
    }
    false
}

/// Whether `points` form a hollow loop around their centroid, in the plane
/// of their two largest principal axes: no point closer to the centre than
/// half the mean radius, and no angular gap wider than [`RIM_MAX_GAP`].
fn encircles_centre<I>(points: I) -> bool
where
    I: Iterator<Item = Vec3> + Clone,
{
    let Some(fit) = pca(points.clone()) else {
        return false;
    };
    let [_, u, v] = fit.eigen.vectors;
    let planar: Vec<(f64, f64)> = points
        .map(|p| {
            let d = sub(p, fit.centroid);
            (dot(d, u), dot(d, v))
        })
        .collect();
    if planar.len() < 3 {
        return false;
    }

    let radii: Vec<f64> = planar.iter().map(|&(x, y)| x.hypot(y)).collect();
    let mean_radius = radii.iter().sum::<f64>() / radii.len() as f64;
    if radii.iter().any(|&r| r < 0.5 * mean_radius) {
        return false;
    }

    let mut angles: Vec<f64> = planar.iter().map(|&(x, y)| y.atan2(x)).collect();
    angles.sort_unstable_by(f64::total_cmp);

    let wrap_gap = angles[0] + std::f64::consts::TAU - angles[angles.len() - 1];
    let largest_gap = angles
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(wrap_gap, f64::max);
    largest_gap < RIM_MAX_GAP
}

/// Orthonormal basis of the span of `periods`.
fn orthonormal_basis(periods: &[Vec3]) -> Vec<Vec3> {
    let mut basis: Vec<Vec3> = Vec::with_capacity(periods.len());
    for &period in periods {
        let residual = basis
            .iter()
            .fold(period, |r, &b| sub(r, scale(b, dot(r, b))));
        if let Some(b) = normalize(residual) {
            basis.push(b);
        }
    }
    basis
}

/// Least-squares plane through `points` that contains every direction in
/// `periods`. Returns the plane normal and the RMS deviation from the plane,
/// or `None` when no such plane can be fitted.
fn fit_plane<I>(points: I, centroid: Vec3, periods: &[Vec3]) -> Option<(Vec3, f64)>
where
    I: Iterator<Item = Vec3> + Clone,
{
    let basis = orthonormal_basis(periods);
    match basis[..] {
        [] => pca(points).map(|fit| (fit.normal(), fit.min_variance().sqrt())),
        [b] => {
            // After projecting out `b` it carries no variance; the normal is
            // the least-variance axis among the other two.
            let fit = pca(points.map(|p| sub(p, scale(b, dot(p, b)))))?;
            let vectors = fit.eigen.vectors;
            let along = (0..3).max_by(|&i, &j| {
                dot(vectors[i], b).abs().total_cmp(&dot(vectors[j], b).abs())
            })?;
            let k = (0..3).find(|&k| k != along)?;
            Some((vectors[k], fit.eigen.values[k].max(0.0).sqrt()))
        }
        [b0, b1] => {
            let n = normalize(cross(b0, b1))?;
            let (sum_sq, count) = points.fold((0.0, 0usize), |(sum_sq, count), p| {
                let h = dot(n, sub(p, centroid));
                (sum_sq + h * h, count + 1)
            });
            Some((n, (sum_sq / count.max(1) as f64).sqrt()))
        }
        _ => None,
    }
}

/// Fits a plane to a leaflet and packages it.
///
/// `orientation_hint` is any vector on the side the plane normal should
/// face; a zero hint leaves the fitted sign untouched. The plane contains
/// the box vectors in `reference.periods`.
pub(crate) fn build_leaflet(
    indices: Vec<usize>,
    unwrapped: &[Vec3],
    orientation_hint: Vec3,
    reference: &PlaneReference<'_>,
) -> Leaflet {
    let points = || indices.iter().map(|&i| unwrapped[i]);
    let centroid = if indices.is_empty() {
        [0.0; 3]
    } else {
        scale(points().fold([0.0; 3], add), 1.0 / indices.len() as f64)
    };

    let (plane_normal, rms_deviation) = fit_plane(points(), centroid, reference.periods)
        .or_else(|| fit_plane(points(), centroid, &[]))
        .unwrap_or(([0.0, 0.0, 1.0], 0.0));
    let plane_normal = if dot(plane_normal, orientation_hint) < 0.0 {
        neg(plane_normal)
    } else {
        plane_normal
    };

    let planarity = if reference.characteristic_size > 0.0 {
        rms_deviation / reference.characteristic_size
    } else {
        0.0
    };

    Leaflet {
        indices,
        centroid,
        plane_normal,
        rms_deviation,
        planarity,
        is_planar: planarity <= reference.planarity_threshold,
    }
}
