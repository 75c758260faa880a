use std::sync::Arc;

use fleet_inference::{InferenceError, Orientation, PlacementCatalog};

#[test]
fn six_by_six_length_three_has_48_placements() {
    let placements = PlacementCatalog::generate(6, 3).unwrap();
    assert_eq!(placements.len(), 2 * 6 * (6 - 3 + 1));
}

#[test]
fn every_cell_stays_on_the_board() {
    for n in 1..=10 {
        for len in 1..=n {
            for p in PlacementCatalog::generate(n, len).unwrap().iter() {
                assert_eq!(p.cells().len(), len);
                for c in p.cells() {
                    assert!(c.row < n && c.col < n, "{:?} leaves {}x{}", p, n, n);
                }
            }
        }
    }
}

#[test]
fn offsets_per_line_are_n_minus_l_plus_one() {
    let horizontal = PlacementCatalog::for_orientation(10, 4, Orientation::Horizontal).unwrap();
    let in_first_row = horizontal.iter().filter(|p| p.origin().row == 0).count();
    assert_eq!(in_first_row, 10 - 4 + 1);
    assert!(horizontal.iter().all(|p| p.orientation() == Orientation::Horizontal));

    let vertical = PlacementCatalog::for_orientation(10, 4, Orientation::Vertical).unwrap();
    let in_first_col = vertical.iter().filter(|p| p.origin().col == 0).count();
    assert_eq!(in_first_col, 10 - 4 + 1);
}

#[test]
fn horizontal_placements_come_first() {
    let placements = PlacementCatalog::generate(5, 2).unwrap();
    let split = placements
        .iter()
        .position(|p| p.orientation() == Orientation::Vertical)
        .unwrap();
    assert_eq!(split, 5 * 4);
    assert!(placements[split..]
        .iter()
        .all(|p| p.orientation() == Orientation::Vertical));
}

#[test]
fn single_cells_are_not_duplicated() {
    assert_eq!(PlacementCatalog::generate(4, 1).unwrap().len(), 16);
}

#[test]
fn full_width_boat_has_one_offset() {
    assert_eq!(PlacementCatalog::generate(5, 5).unwrap().len(), 10);
}

#[test]
fn oversized_boat_is_a_configuration_error() {
    assert!(matches!(
        PlacementCatalog::generate(4, 5),
        Err(InferenceError::Configuration(_))
    ));
    assert!(matches!(
        PlacementCatalog::generate(4, 0),
        Err(InferenceError::Configuration(_))
    ));
}

#[test]
fn catalogs_are_cached() {
    let a = PlacementCatalog::generate(7, 3).unwrap();
    let b = PlacementCatalog::generate(7, 3).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}
