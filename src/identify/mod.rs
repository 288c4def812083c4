mod aggregate;
mod config;
mod error;
mod linalg;
mod normal;
mod pairing;
mod pbc;
mod spatial;
mod splitter;

pub use config::IdentifyConfig;
pub use error::Error;

use crate::model::frame::Frame;
use crate::model::membrane::{Membrane, Snapshot};
use aggregate::Aggregation;
use pairing::{Monolayer, PairingParams};
use pbc::Metric;
use spatial::NeighborGraph;
use splitter::SplitOutcome;

/// Identifies aggregates and membranes in one frame.
///
/// The frame is not modified; the returned [`Snapshot`] owns a copy of it.
///
/// # Errors
///
/// Returns an [`Error`] for an invalid configuration, an unusable box, a
/// non-finite coordinate, or an empty frame when `allow_empty` is off.
pub fn identify(frame: &Frame, config: &IdentifyConfig) -> Result<Snapshot, Error> {
    config.validate()?;

    if frame.is_empty() && !config.allow_empty {
        return Err(Error::EmptyFrame);
    }
    if let Some(index) = frame
        .positions
        .iter()
        .position(|p| p.iter().any(|v| !v.is_finite()))
    {
        return Err(Error::NonFinitePosition { index });
    }

    let metric = Metric::new(&frame.simbox)?;
    if let Some(width) = metric.min_periodic_width()
        && config.cutoff > 0.5 * width
    {
        log::warn!(
            "cutoff {} exceeds half the smallest periodic box width ({width}); \
             particles may neighbor their own images",
            config.cutoff
        );
    }

    let graph = NeighborGraph::build(&frame.positions, &metric, config.cutoff);
    log::debug!(
        "neighbor graph: {} particles, {} edges, {} isolated (cutoff {})",
        graph.len(),
        graph.edge_count(),
        (0..graph.len()).filter(|&i| graph.degree(i) == 0).count(),
        config.cutoff
    );

    let aggregation = aggregate::find_aggregates(&frame.positions, &graph, &metric);
    log::debug!("found {} aggregates", aggregation.aggregates.len());

    let outcomes = split_all(&aggregation, &graph, config);

    let mut membranes = Vec::new();
    let mut monolayers = Vec::new();
    for (aggregate, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            SplitOutcome::Membrane(membrane) => membranes.push(membrane),
            SplitOutcome::NoMembrane {
                reason,
                orientation,
            } => {
                log::trace!("aggregate {aggregate} has no membrane: {reason:?}");
                if let Some(orientation) = orientation
                    && reason.is_single_sided()
                {
                    monolayers.push(Monolayer {
                        aggregate,
                        orientation,
                    });
                }
            }
        }
    }

    if config.pair_monolayers {
        let params = PairingParams {
            cutoff: config.effective_pairing_cutoff(),
            min_fraction: config.pairing_min_fraction,
            planarity_threshold: config.planarity_threshold,
        };
        let paired =
            pairing::pair_monolayers(&monolayers, &aggregation, &frame.positions, &metric, &params);
        log::debug!(
            "paired {} of {} single-sided aggregates",
            2 * paired.len(),
            monolayers.len()
        );
        membranes.extend(paired);
        membranes.sort_by_key(first_aggregate);
    }

    log::debug!("identified {} membranes", membranes.len());

    Ok(Snapshot {
        frame: frame.clone(),
        aggregates: aggregation.aggregates,
        membranes,
    })
}

fn first_aggregate(membrane: &Membrane) -> usize {
    membrane.aggregates().iter().copied().min().unwrap_or(usize::MAX)
}

fn split_one(
    id: usize,
    aggregation: &Aggregation,
    graph: &NeighborGraph,
    config: &IdentifyConfig,
) -> SplitOutcome {
    splitter::split_aggregate(
        id,
        aggregation.aggregates[id].indices(),
        graph,
        &aggregation.unwrapped,
        &aggregation.periods[id],
        config,
    )
}

#[cfg(feature = "parallel")]
fn split_all(
    aggregation: &Aggregation,
    graph: &NeighborGraph,
    config: &IdentifyConfig,
) -> Vec<SplitOutcome> {
    use rayon::prelude::*;

    (0..aggregation.aggregates.len())
        .into_par_iter()
        .map(|id| split_one(id, aggregation, graph, config))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn split_all(
    aggregation: &Aggregation,
    graph: &NeighborGraph,
    config: &IdentifyConfig,
) -> Vec<SplitOutcome> {
    split_sequential(aggregation, graph, config)
}

#[cfg(any(test, not(feature = "parallel")))]
fn split_sequential(
    aggregation: &Aggregation,
    graph: &NeighborGraph,
    config: &IdentifyConfig,
) -> Vec<SplitOutcome> {
    (0..aggregation.aggregates.len())
        .map(|id| split_one(id, aggregation, graph, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::frame::SimBox;

    #[test]
    fn rejects_invalid_cutoff() {
        let frame = Frame::new(vec![[0.0; 3]], SimBox::open());
        let result = identify(&frame, &IdentifyConfig::with_cutoff(0.0));
        assert!(matches!(result, Err(Error::InvalidCutoff(_))));
    }

    #[test]
    fn rejects_non_finite_positions() {
        let frame = Frame::new(vec![[0.0; 3], [f64::NAN, 0.0, 0.0]], SimBox::open());
        let result = identify(&frame, &IdentifyConfig::default());
        assert!(matches!(result, Err(Error::NonFinitePosition { index: 1 })));
    }

    #[test]
    fn empty_frame_follows_allow_empty() {
        let frame = Frame::new(Vec::new(), SimBox::open());
        let snapshot = identify(&frame, &IdentifyConfig::default()).unwrap();
        assert!(snapshot.aggregates().is_empty());
        assert!(snapshot.membranes().is_empty());

        let strict = IdentifyConfig {
            allow_empty: false,
            ..Default::default()
        };
        assert!(matches!(identify(&frame, &strict), Err(Error::EmptyFrame)));
    }

    #[test]
    fn snapshot_keeps_a_copy_of_the_frame() {
        let frame = Frame::new(vec![[1.0, 2.0, 3.0]], SimBox::orthorhombic([10.0; 3]));
        let snapshot = identify(&frame, &IdentifyConfig::default()).unwrap();
        assert_eq!(snapshot.frame(), &frame);
        assert_eq!(snapshot.aggregates().len(), 1);
    }

    /// Two bilayers, a lone monolayer and a few strays in one periodic box.
    fn crowded_frame() -> Frame {
        let mut positions = Vec::new();
        for (z, spacing) in [(4.0, 1.0), (6.0, 1.0), (14.0, 1.1), (16.0, 1.1), (24.0, 0.9)] {
            for i in 0..10 {
                for j in 0..10 {
                    positions.push([i as f64 * spacing + 0.25, j as f64 * spacing + 0.5, z]);
                }
            }
        }
        positions.extend([[5.0, 5.0, 10.0], [5.0, 5.0, 20.0], [2.0, 8.0, 29.0]]);
        Frame::new(positions, SimBox::orthorhombic([10.0, 10.0, 30.0]))
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_split_matches_sequential() {
        let frame = crowded_frame();
        let config = IdentifyConfig::with_cutoff(2.5);
        let metric = Metric::new(&frame.simbox).unwrap();
        let graph = NeighborGraph::build(&frame.positions, &metric, config.cutoff);
        let aggregation = aggregate::find_aggregates(&frame.positions, &graph, &metric);
        assert!(aggregation.aggregates.len() >= 4);

        let sequential = split_sequential(&aggregation, &graph, &config);
        let parallel = split_all(&aggregation, &graph, &config);
        assert_eq!(parallel, sequential);
        assert!(
            sequential
                .iter()
                .filter(|o| matches!(o, SplitOutcome::Membrane(_)))
                .count()
                >= 1
        );
    }

    #[test]
    fn identify_is_repeatable_on_a_crowded_frame() {
        let frame = crowded_frame();
        let config = IdentifyConfig::with_cutoff(2.5);
        let first = identify(&frame, &config).unwrap();
        let second = identify(&frame, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn distant_particles_with_tiny_cutoff_stay_apart() {
        let frame = Frame::new(vec![[0.0, 0.0, 0.0], [5.0e6, 0.0, 0.0]], SimBox::open());
        let snapshot = identify(&frame, &IdentifyConfig::with_cutoff(1e-3)).unwrap();
        assert_eq!(snapshot.aggregates().len(), 2);
        assert!(snapshot.membranes().is_empty());
    }
}
