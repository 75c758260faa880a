use std::sync::Arc;
use std::thread;

use fleet_inference::{
    compatible, exclusion_mask, AdjacencyIndex, FleetConfig, Orientation, Placement,
    PlacementCatalog,
};
use proptest::prelude::*;

/// Reference rule: no two cells closer than Chebyshev distance 2.
fn separated(a: &Placement, b: &Placement) -> bool {
    a.cells()
        .iter()
        .all(|x| b.cells().iter().all(|y| x.chebyshev(y) >= 2))
}

fn placement(n: usize) -> impl Strategy<Value = Placement> {
    (1..=n)
        .prop_flat_map(move |len| (Just(len), 0..PlacementCatalog::generate(n, len).unwrap().len()))
        .prop_map(move |(len, i)| (*PlacementCatalog::generate(n, len).unwrap()[i]).clone())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn compatibility_is_symmetric((a, b) in (5usize..=10).prop_flat_map(|n| (placement(n), placement(n)))) {
        prop_assert_eq!(compatible(&a, &b), compatible(&b, &a));
    }

    #[test]
    fn compatibility_matches_chebyshev_rule((a, b) in (5usize..=10).prop_flat_map(|n| (placement(n), placement(n)))) {
        prop_assert_eq!(compatible(&a, &b), separated(&a, &b));
    }
}

#[test]
fn exclusion_mask_covers_the_boat() {
    let p = Placement::new(8, 3, Orientation::Vertical, (2, 4)).unwrap();
    let mask = exclusion_mask(&p);
    assert!(p.mask().is_subset(&mask));
    // 3x1 boat away from the edges: a 5x3 block.
    assert_eq!(mask.count_ones(), 15);
}

#[test]
fn index_agrees_with_direct_test() {
    let config = FleetConfig::new(6, vec![4, 3, 3]).unwrap();
    let index = AdjacencyIndex::new(&config).unwrap();
    for a in 0..index.slot_count() {
        for b in 0..index.slot_count() {
            for (i, pa) in index.placements(a).iter().enumerate() {
                for (j, pb) in index.placements(b).iter().enumerate() {
                    assert_eq!(index.compatible(a, i, b, j), compatible(pa, pb));
                    assert_eq!(index.compatible(a, i, b, j), index.compatible(b, j, a, i));
                }
            }
        }
    }
}

#[test]
fn equal_lengths_share_a_catalog() {
    let config = FleetConfig::new(6, vec![3, 2, 3]).unwrap();
    let index = AdjacencyIndex::new(&config).unwrap();
    assert!(index.same_length(0, 2));
    assert!(!index.same_length(0, 1));
    assert_eq!(index.placements(0).len(), 48);
    assert_eq!(index.fleet(), &[3, 2, 3]);
}

#[test]
fn shared_index_is_built_once_across_threads() {
    let config = FleetConfig::new(9, vec![4, 2, 2]).unwrap();
    let indices: Vec<Arc<AdjacencyIndex>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| AdjacencyIndex::shared(&config).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    let again = AdjacencyIndex::shared(&config).unwrap();
    assert!(indices.iter().all(|i| Arc::ptr_eq(i, &again)));
}
