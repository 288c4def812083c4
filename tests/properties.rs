mod common;

use std::collections::BTreeSet;

use membrane_topology::{Frame, IdentifyConfig, SimBox, Snapshot, identify};
use proptest::prelude::*;

fn cloud() -> impl Strategy<Value = Vec<[f64; 3]>> {
    prop::collection::vec(prop::array::uniform3(0.0f64..10.0), 1..120)
}

fn simbox() -> impl Strategy<Value = SimBox> {
    prop_oneof![
        Just(SimBox::open()),
        Just(SimBox::orthorhombic([10.0; 3])),
        Just(SimBox::orthorhombic([10.0; 3]).with_periodicity([true, true, false])),
        Just(SimBox::from_lengths_angles([10.0, 10.0, 10.0], [80.0, 95.0, 70.0])),
    ]
}

fn check_partition(snapshot: &Snapshot) -> Result<(), TestCaseError> {
    let n = snapshot.particle_count();
    let mut seen = vec![false; n];
    for aggregate in snapshot.aggregates() {
        prop_assert!(!aggregate.is_empty());
        prop_assert!(aggregate.indices().windows(2).all(|w| w[0] < w[1]));
        for &i in aggregate.indices() {
            prop_assert!(!seen[i], "particle {} in two aggregates", i);
            seen[i] = true;
        }
    }
    prop_assert!(seen.iter().all(|&s| s));

    let firsts: Vec<usize> = snapshot.aggregates().iter().map(|a| a.indices()[0]).collect();
    prop_assert!(firsts.windows(2).all(|w| w[0] < w[1]));
    Ok(())
}

fn check_leaflets(snapshot: &Snapshot) -> Result<(), TestCaseError> {
    for membrane in snapshot.membranes() {
        prop_assert_eq!(membrane.len(), 2);

        let members: BTreeSet<usize> = membrane
            .aggregates()
            .iter()
            .flat_map(|&a| snapshot.aggregates()[a].indices().iter().copied())
            .collect();
        let first: BTreeSet<usize> = membrane[0].indices().iter().copied().collect();
        let second: BTreeSet<usize> = membrane[1].indices().iter().copied().collect();
        let pivots: BTreeSet<usize> = membrane.pivots().iter().copied().collect();

        prop_assert!(!first.is_empty() && !second.is_empty());
        prop_assert_eq!(first.union(&second).copied().collect::<BTreeSet<_>>(), members);
        prop_assert_eq!(first.intersection(&second).copied().collect::<BTreeSet<_>>(), pivots);
        for leaflet in membrane {
            prop_assert!(leaflet.indices().windows(2).all(|w| w[0] < w[1]));
            prop_assert!(leaflet.planarity().is_finite());
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn aggregates_partition_the_particles(
        positions in cloud(),
        simbox in simbox(),
        cutoff in 0.3f64..3.0,
    ) {
        let frame = Frame::new(positions, simbox);
        let snapshot = identify(&frame, &IdentifyConfig::with_cutoff(cutoff)).unwrap();
        check_partition(&snapshot)?;
        check_leaflets(&snapshot)?;
    }

    #[test]
    fn identification_is_repeatable(
        positions in cloud(),
        simbox in simbox(),
        cutoff in 0.5f64..3.0,
    ) {
        let frame = Frame::new(positions, simbox);
        let config = IdentifyConfig { pair_monolayers: true, ..IdentifyConfig::with_cutoff(cutoff) };
        let first = identify(&frame, &config).unwrap();
        let second = identify(&frame, &config).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn permuting_particles_preserves_aggregate_sizes(
        positions in cloud(),
        cutoff in 0.5f64..3.0,
    ) {
        let frame = Frame::new(positions.clone(), SimBox::orthorhombic([10.0; 3]));
        let mut reversed = positions;
        reversed.reverse();
        let mirrored = Frame::new(reversed, SimBox::orthorhombic([10.0; 3]));

        let sizes = |f: &Frame| {
            let snapshot = identify(f, &IdentifyConfig::with_cutoff(cutoff)).unwrap();
            let mut sizes: Vec<usize> = snapshot.aggregates().iter().map(|a| a.size()).collect();
            sizes.sort_unstable();
            sizes
        };
        prop_assert_eq!(sizes(&frame), sizes(&mirrored));
    }

    #[test]
    fn jittered_bilayers_keep_two_leaflets(
        amplitude in 0.0f64..0.15,
        seed in any::<u64>(),
    ) {
        let model = common::flat_bilayer(8).jittered(amplitude, seed);
        let snapshot = identify(&model.frame, &IdentifyConfig::with_cutoff(common::CUTOFF)).unwrap();
        check_partition(&snapshot)?;
        check_leaflets(&snapshot)?;
        prop_assert_eq!(snapshot.membranes().len(), 1);
        prop_assert_eq!(snapshot.membranes()[0][0].indices(), model.upper.as_slice());
        prop_assert_eq!(snapshot.membranes()[0][1].indices(), model.lower.as_slice());
    }
}
