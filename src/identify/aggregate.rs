//! Connected-component aggregation of the neighbor graph.

use std::collections::VecDeque;

use super::linalg::{Vec3, add, sub};
use super::pbc::Metric;
use super::spatial::NeighborGraph;
use crate::model::membrane::Aggregate;

/// Aggregates of one frame plus contiguous coordinates for each of them.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub aggregates: Vec<Aggregate>,
    /// Positions with periodic jumps removed inside each aggregate.
    ///
    /// Every particle sits at its traversal parent's unwrapped position plus
    /// the minimum-image vector between the two, so an aggregate that crosses
    /// the box boundary forms one continuous cloud.
    pub unwrapped: Vec<Vec3>,
    /// Box vectors along which each aggregate connects to its own periodic
    /// image, such as both in-plane vectors of a bilayer spanning the box.
    ///
    /// Unlike the unwrapped coordinates, which depend on where the traversal
    /// started, this set is a property of the aggregate alone.
    pub periods: Vec<Vec<Vec3>>,
}

/// Partitions the particles into connected components.
///
/// Components are discovered breadth-first from the smallest unvisited
/// index, so aggregates come out ordered by their smallest member. Members
/// are sorted ascending.
pub fn find_aggregates(positions: &[Vec3], graph: &NeighborGraph, metric: &Metric) -> Aggregation {
    let n = positions.len();
    let mut membership = vec![usize::MAX; n];
    let mut unwrapped = positions.to_vec();
    let mut aggregates = Vec::new();
    let mut periods = Vec::new();
    let mut queue = VecDeque::new();

    for seed in 0..n {
        if membership[seed] != usize::MAX {
            continue;
        }

        let id = aggregates.len();
        let mut members = vec![seed];
        membership[seed] = id;
        queue.push_back(seed);

        while let Some(i) = queue.pop_front() {
            for neighbor in graph.neighbors(i) {
                let j = neighbor.index;
                if membership[j] == usize::MAX {
                    membership[j] = id;
                    unwrapped[j] = add(unwrapped[i], neighbor.offset);
                    members.push(j);
                    queue.push_back(j);
                }
            }
        }

        members.sort_unstable();
        periods.push(wrapped_vectors(&members, graph, &unwrapped, metric));
        aggregates.push(Aggregate::new(members));
    }

    Aggregation {
        aggregates,
        unwrapped,
        periods,
    }
}

/// Box vectors crossed by an edge whose unwrapped ends disagree with the
/// edge's minimum-image vector. Such an edge closes a loop through the
/// periodic boundary.
fn wrapped_vectors(
    members: &[usize],
    graph: &NeighborGraph,
    unwrapped: &[Vec3],
    metric: &Metric,
) -> Vec<Vec3> {
    let periodic = metric.periodic();
    let mut wrapped = [false; 3];
    for &i in members {
        for neighbor in graph.neighbors(i) {
            let mismatch = sub(unwrapped[neighbor.index], add(unwrapped[i], neighbor.offset));
            let image = metric.fractional(mismatch);
            for k in 0..3 {
                wrapped[k] |= periodic[k] && image[k].round() != 0.0;
            }
        }
        if wrapped == periodic {
            break;
        }
    }
    (0..3).filter(|&k| wrapped[k]).map(|k| metric.vector(k)).collect()
}
