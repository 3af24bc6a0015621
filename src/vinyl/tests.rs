use super::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, PartialEq)]
struct T {
    id: usize,
    ms: Option<f64>,
}

impl HasDuration for T {
    fn duration_ms(&self) -> Option<f64> {
        self.ms
    }
}

fn tracks(ms: &[u64]) -> Vec<T> {
    ms.iter()
        .enumerate()
        .map(|(id, &ms)| T {
            id,
            ms: Some(ms as f64),
        })
        .collect()
}

fn ids(side: &Side<T>) -> Vec<usize> {
    side.tracks().iter().map(|t| t.id).collect()
}

#[test]
fn empty_input_yields_no_sides() {
    let sides = partition::<T>(&[], DEFAULT_SIDE_BUDGET_SECS).unwrap();
    assert!(sides.is_empty());
}

#[test]
fn single_short_track_is_padded_with_blank_b_side() {
    let sides = partition(&tracks(&[200_000]), DEFAULT_SIDE_BUDGET_SECS).unwrap();
    assert_eq!(sides.len(), 2);
    assert_eq!(ids(&sides[0]), vec![0]);
    assert_eq!(sides[0].duration_ms(), 200_000.0);
    assert!(sides[1].is_empty());
    assert_eq!(sides[1].duration_ms(), 0.0);
}

#[test]
fn overflow_starts_a_new_side() {
    let sides = partition(&tracks(&[500_000, 500_000, 500_000]), DEFAULT_SIDE_BUDGET_SECS).unwrap();
    assert_eq!(sides.len(), 2);
    assert_eq!(ids(&sides[0]), vec![0, 1]);
    assert_eq!(sides[0].duration_ms(), 1_000_000.0);
    assert_eq!(ids(&sides[1]), vec![2]);
}

#[test]
fn oversized_track_gets_its_own_side_without_leading_blank() {
    let sides = partition(&tracks(&[2_000_000, 100_000]), DEFAULT_SIDE_BUDGET_SECS).unwrap();
    assert_eq!(sides.len(), 2);
    assert_eq!(ids(&sides[0]), vec![0]);
    assert_eq!(sides[0].duration_ms(), 2_000_000.0);
    assert_eq!(ids(&sides[1]), vec![1]);
}

#[test]
fn oversized_track_in_the_middle_stands_alone() {
    let sides = partition(
        &tracks(&[100_000, 2_000_000, 100_000]),
        DEFAULT_SIDE_BUDGET_SECS,
    )
    .unwrap();
    let got: Vec<Vec<usize>> = sides.iter().map(ids).collect();
    assert_eq!(got, vec![vec![0], vec![1], vec![2], vec![]]);
}

#[test]
fn budget_boundary_is_inclusive() {
    let sides = partition(&tracks(&[264_000; 5]), DEFAULT_SIDE_BUDGET_SECS).unwrap();
    assert_eq!(sides.len(), 2);
    assert_eq!(ids(&sides[0]), vec![0, 1, 2, 3, 4]);
    assert_eq!(sides[0].duration_ms(), 1_320_000.0);
    assert!(sides[1].is_empty());
}

#[test]
fn one_millisecond_over_the_boundary_spills() {
    let sides = partition(&tracks(&[660_000, 660_001]), DEFAULT_SIDE_BUDGET_SECS).unwrap();
    assert_eq!(sides.len(), 2);
    assert_eq!(ids(&sides[0]), vec![0]);
    assert_eq!(ids(&sides[1]), vec![1]);
}

#[test]
fn smaller_budget_gives_more_sides() {
    let list = tracks(&[45_000, 30_000, 50_000, 20_000, 40_000, 15_000]);

    let lp = partition(&list, DEFAULT_SIDE_BUDGET_SECS).unwrap();
    assert_eq!(lp.len(), 2);
    assert_eq!(lp[0].len(), 6);

    let single = partition(&list, 60.0).unwrap();
    let got: Vec<Vec<usize>> = single.iter().map(ids).collect();
    assert_eq!(
        got,
        vec![vec![0], vec![1], vec![2], vec![3, 4], vec![5], vec![]]
    );
    assert!(single.len() > lp.len());
}

#[test]
fn zero_length_tracks_share_a_side() {
    let sides = partition(&tracks(&[0, 0, 0]), 0.0).unwrap();
    assert_eq!(sides.len(), 2);
    assert_eq!(ids(&sides[0]), vec![0, 1, 2]);
}

#[test]
fn rejects_invalid_budget() {
    let list = tracks(&[1_000]);
    assert_eq!(
        partition(&list, -1.0).unwrap_err(),
        PartitionError::InvalidBudget { budget: -1.0 }
    );
    assert!(matches!(
        partition(&list, f64::NAN),
        Err(PartitionError::InvalidBudget { .. })
    ));
    assert!(matches!(
        partition(&list, f64::INFINITY),
        Err(PartitionError::InvalidBudget { .. })
    ));
}

#[test]
fn rejects_invalid_or_missing_durations() {
    let mut list = tracks(&[1_000, 2_000, 3_000]);
    list[1].ms = Some(-5.0);
    assert_eq!(
        partition(&list, DEFAULT_SIDE_BUDGET_SECS).unwrap_err(),
        PartitionError::InvalidDuration {
            index: 1,
            duration_ms: -5.0
        }
    );

    list[1].ms = Some(f64::INFINITY);
    assert!(matches!(
        partition(&list, DEFAULT_SIDE_BUDGET_SECS),
        Err(PartitionError::InvalidDuration { index: 1, .. })
    ));

    list[1].ms = None;
    assert_eq!(
        partition(&list, DEFAULT_SIDE_BUDGET_SECS).unwrap_err(),
        PartitionError::MissingDuration { index: 1 }
    );
}

#[test]
fn empty_input_still_validates_budget() {
    assert!(partition::<T>(&[], -3.0).is_err());
}

#[test]
fn invariants_hold_for_generated_albums() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..500 {
        let len = rng.random_range(0..30);
        let ms: Vec<u64> = (0..len)
            .map(|_| {
                if rng.random_bool(0.05) {
                    rng.random_range(1_320_001..3_000_000)
                } else {
                    rng.random_range(0..600_000)
                }
            })
            .collect();
        let budget = if rng.random_bool(0.5) {
            DEFAULT_SIDE_BUDGET_SECS
        } else {
            rng.random_range(60.0..1500.0)
        };
        let list = tracks(&ms);
        let sides = partition(&list, budget).unwrap();

        // Conservation.
        let flat: Vec<T> = sides.iter().flat_map(|s| s.tracks().iter().cloned()).collect();
        assert_eq!(flat, list);

        // Evenness.
        if list.is_empty() {
            assert!(sides.is_empty());
        } else {
            assert_eq!(sides.len() % 2, 0);
        }

        for (i, side) in sides.iter().enumerate() {
            let total: f64 = side.tracks().iter().filter_map(|t| t.ms).sum();
            assert_eq!(side.duration_ms(), total);

            if side.len() > 1 {
                assert!(total / 1000.0 <= budget, "side {i} over budget");
            }
            if side.len() == 1 && total / 1000.0 > budget {
                // Oversized singleton: only allowed when the track alone is too long.
                assert!(side.tracks()[0].ms.unwrap() / 1000.0 > budget);
            }
            if side.is_empty() {
                // Only the trailing pad may be blank.
                assert_eq!(i, sides.len() - 1);
            }
        }

        // Determinism.
        assert_eq!(partition(&list, budget).unwrap(), sides);
    }
}

#[test]
fn pair_into_discs_groups_sides_two_by_two() {
    let sides = partition(&tracks(&[700_000, 700_000, 700_000]), DEFAULT_SIDE_BUDGET_SECS).unwrap();
    let discs = pair_into_discs(sides);
    assert_eq!(discs.len(), 2);
    assert_eq!(ids(&discs[0].a), vec![0]);
    assert_eq!(ids(&discs[0].b), vec![1]);
    assert_eq!(ids(&discs[1].a), vec![2]);
    assert!(discs[1].b.is_empty());
}

#[test]
fn pair_into_discs_fills_odd_leftover_with_blank_b_side() {
    let sides = vec![Side::with_total(tracks(&[1_000]), 1_000.0)];
    let discs = pair_into_discs(sides);
    assert_eq!(discs.len(), 1);
    assert!(discs[0].b.is_empty());
    assert_eq!(discs[0].duration(), std::time::Duration::from_secs(1));
}

#[test]
fn side_letters_round_trip_through_positions() {
    assert_eq!(side_letter(0), Some('A'));
    assert_eq!(side_letter(3), Some('D'));
    assert_eq!(side_letter(25), Some('Z'));
    assert_eq!(side_letter(26), None);

    assert_eq!(side_position('A'), Some(0));
    assert_eq!(side_position('d'), Some(3));
    assert_eq!(side_position('1'), None);
    assert_eq!(side_position('é'), None);
}

#[test]
fn durations_implement_the_track_contract() {
    let list = vec![
        std::time::Duration::from_secs(700),
        std::time::Duration::from_secs(700),
    ];
    let sides = partition(&list, DEFAULT_SIDE_BUDGET_SECS).unwrap();
    assert_eq!(sides.len(), 2);
    assert_eq!(sides[0].duration(), std::time::Duration::from_secs(700));
}

#[test]
fn huge_durations_saturate_instead_of_panicking() {
    use std::time::Duration;

    let sides = partition(&[Duration::MAX], DEFAULT_SIDE_BUDGET_SECS).unwrap();
    assert_eq!(sides[0].duration(), Duration::MAX);
    assert_eq!(sides[1].duration(), Duration::ZERO);

    let half = Duration::from_secs(u64::MAX / 2);
    let sides = partition(&[half, half, half], 1e30).unwrap();
    assert_eq!(sides[0].len(), 3);
    assert_eq!(sides[0].duration(), Duration::MAX);

    let discs = pair_into_discs(partition(&[Duration::MAX, Duration::MAX], 0.0).unwrap());
    assert_eq!(discs[0].duration(), Duration::MAX);
}

#[test]
fn format_side_length_uses_minutes_and_seconds() {
    assert_eq!(format_side_length(std::time::Duration::from_secs(1320)), "22:00");
    assert_eq!(format_side_length(std::time::Duration::from_secs(65)), "1:05");
}
