use fleet_inference::{
    filter_fleets, Coordinate, Fleet, FleetConfig, FleetSearch, GameState, Guess, GuessOutcome,
    InferenceError, SessionStatus,
};

fn state(size: usize, fleet: &[usize]) -> GameState {
    GameState::new(FleetConfig::new(size, fleet.to_vec()).unwrap()).unwrap()
}

fn live(s: &GameState) -> &[Fleet] {
    s.live_fleets().expect("small configurations are enumerated")
}

#[test]
fn fresh_state_holds_every_fleet() {
    let s = state(6, &[4, 3]);
    let expected = FleetSearch::for_config(s.config())
        .unwrap()
        .count(usize::MAX)
        .unwrap();
    assert_eq!(s.live_fleet_count(), Ok(expected));
    assert!(s.is_exact());
    assert!(s.history().is_empty());
    assert!(s.is_satisfiable());
    assert_eq!(s.status(), SessionStatus::InProgress);
}

#[test]
fn single_boat_narrows_to_two_placements() {
    let mut s = state(6, &[3]);
    assert_eq!(s.live_fleet_count(), Ok(48));
    // Placements covering (0,0) are gone.
    assert_eq!(s.apply_guess((0, 0), GuessOutcome::Miss), Ok(Some(46)));
    // Only placements ending at (5,5) remain.
    assert_eq!(s.apply_guess((5, 5), GuessOutcome::Hit), Ok(Some(2)));
    assert_eq!(s.history().len(), 2);
    assert!(s.hits().contains(5, 5));
    assert!(s.misses().contains(0, 0));
}

#[test]
fn miss_and_hit_filter_as_expected() {
    let mut s = state(6, &[3, 2]);
    s.apply_guess((2, 2), GuessOutcome::Hit).unwrap();
    s.apply_guess((0, 0), GuessOutcome::Miss).unwrap();
    for fleet in live(&s) {
        assert!(fleet.covers(Coordinate::new(2, 2)));
        assert!(!fleet.covers(Coordinate::new(0, 0)));
    }
}

#[test]
fn repeated_guess_is_rejected_without_change() {
    let mut s = state(6, &[3]);
    s.apply_guess((1, 1), GuessOutcome::Miss).unwrap();
    let snapshot = live(&s).to_vec();
    for outcome in [GuessOutcome::Miss, GuessOutcome::Hit] {
        assert_eq!(
            s.apply_guess((1, 1), outcome),
            Err(InferenceError::DuplicateGuess {
                coord: Coordinate::new(1, 1)
            })
        );
    }
    assert_eq!(live(&s), snapshot.as_slice());
    assert_eq!(s.history().len(), 1);
}

#[test]
fn out_of_bounds_guess_is_rejected() {
    let mut s = state(6, &[3]);
    assert_eq!(
        s.apply_guess((6, 0), GuessOutcome::Hit),
        Err(InferenceError::OutOfBounds {
            coord: Coordinate::new(6, 0),
            board_size: 6
        })
    );
    assert_eq!(s.live_fleet_count(), Ok(48));
    assert!(s.history().is_empty());
}

#[test]
fn contradiction_leaves_state_untouched() {
    let mut s = state(6, &[3]);
    assert_eq!(s.apply_guess((0, 0), GuessOutcome::Hit), Ok(Some(2)));
    // No single 3-boat covers both corners.
    assert_eq!(
        s.apply_guess((5, 5), GuessOutcome::Hit),
        Err(InferenceError::Unsatisfiable)
    );
    assert_eq!(s.live_fleet_count(), Ok(2));
    assert_eq!(s.history().len(), 1);
    assert!(!s.hits().contains(5, 5));
    // The coordinate is still open.
    assert_eq!(s.apply_guess((5, 5), GuessOutcome::Miss), Ok(Some(2)));
}

#[test]
fn sinking_the_last_candidate_wins() {
    let mut s = state(6, &[3]);
    s.apply_guess((0, 0), GuessOutcome::Hit).unwrap();
    s.apply_guess((0, 1), GuessOutcome::Hit).unwrap();
    assert_eq!(s.live_fleet_count(), Ok(1));
    assert_eq!(s.status(), SessionStatus::InProgress);
    s.apply_guess((0, 2), GuessOutcome::Hit).unwrap();
    assert_eq!(s.status(), SessionStatus::Won);
}

#[test]
fn filtering_twice_changes_nothing() {
    let s = state(6, &[3, 2]);
    let guess = Guess::new((3, 3), GuessOutcome::Hit);
    let once = filter_fleets(live(&s), &guess);
    let twice = filter_fleets(&once, &guess);
    assert_eq!(once, twice);
    assert!(once.len() < live(&s).len());
}

#[test]
fn suggestion_avoids_guessed_cells() {
    let mut s = state(6, &[3]);
    let first = s.suggested_coordinate().unwrap().unwrap();
    s.apply_guess(first, GuessOutcome::Miss).unwrap();
    let second = s.suggested_coordinate().unwrap().unwrap();
    assert_ne!(first, second);
}

#[test]
fn probability_grid_is_square() {
    let s = state(5, &[2]);
    let grid = s.probability_grid().unwrap();
    assert_eq!(grid.len(), 5);
    assert!(grid.iter().all(|row| row.len() == 5));
    assert!(grid.iter().flatten().all(|&p| (0.0..=1.0).contains(&p)));
}

#[test]
fn unplaceable_fleet_is_a_configuration_error() {
    let config = FleetConfig::new(3, vec![3, 3, 3]).unwrap();
    assert!(matches!(
        GameState::new(config),
        Err(InferenceError::Configuration(_))
    ));
}

fn constrained(size: usize, fleet: &[usize], limit: usize) -> GameState {
    let config = FleetConfig::new(size, fleet.to_vec())
        .unwrap()
        .with_fleet_limit(limit)
        .with_sample_count(limit);
    GameState::new(config).unwrap()
}

#[test]
fn oversized_set_is_held_as_constraints() {
    let mut s = constrained(6, &[3], 10);
    assert!(!s.is_exact());
    assert!(s.is_satisfiable());
    assert_eq!(
        s.live_fleet_count(),
        Err(InferenceError::FleetLimitExceeded { limit: 10 })
    );

    let heatmap = s.heatmap().unwrap();
    assert_eq!(heatmap.fleet_count(), 10);
    assert_eq!(heatmap.counts().iter().sum::<u64>(), 3 * 10);
    assert_eq!(s.heatmap().unwrap(), heatmap);

    // Two placements cover the corner: few enough to hold exactly.
    assert_eq!(s.apply_guess((0, 0), GuessOutcome::Hit), Ok(Some(2)));
    assert!(s.is_exact());
    assert_eq!(s.live_fleet_count(), Ok(2));
}

#[test]
fn constrained_contradiction_leaves_state_untouched() {
    let mut s = constrained(8, &[4, 3], 10);
    assert_eq!(s.apply_guess((0, 0), GuessOutcome::Hit), Ok(None));
    // A boat on (1,1) would touch the one on (0,0).
    assert_eq!(
        s.apply_guess((1, 1), GuessOutcome::Hit),
        Err(InferenceError::Unsatisfiable)
    );
    assert_eq!(s.history().len(), 1);
    assert_eq!(s.hits().count_ones(), 1);
    assert!(s.apply_guess((1, 1), GuessOutcome::Miss).is_ok());
}

#[test]
fn constrained_session_tracks_the_exact_one() {
    let mut exact = state(6, &[3, 2]);
    let mut lazy = constrained(6, &[3, 2], 100);
    assert!(!lazy.is_exact());
    let hidden = live(&exact)[17].clone();

    for i in 0..36 {
        let coord = Coordinate::new(i / 6, i % 6);
        let outcome = GuessOutcome::from_occupied(hidden.covers(coord));
        let n = exact.apply_guess(coord, outcome).unwrap().unwrap();
        let m = lazy.apply_guess(coord, outcome).unwrap();
        match lazy.live_fleet_count() {
            Ok(count) => assert_eq!(count, n),
            Err(err) => {
                assert_eq!(err, InferenceError::FleetLimitExceeded { limit: 100 });
                assert!(n > 100);
            }
        }
        if let Some(m) = m {
            assert_eq!(m, n);
            let mut a = live(&exact).to_vec();
            let mut b = live(&lazy).to_vec();
            a.sort_by_key(|f| f.picks().to_vec());
            b.sort_by_key(|f| f.picks().to_vec());
            assert_eq!(a, b);
        }
        assert_eq!(lazy.status(), exact.status());
        assert!(lazy.admits(&hidden));
        if exact.status() == SessionStatus::Won {
            return;
        }
    }
    panic!("sweeping every cell should sink the fleet");
}
