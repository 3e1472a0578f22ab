use super::*;

#[test]
fn test_complete_four_items_no_battles() {
    let p = progress(4, BattlePolicy::Complete, None, 0);
    assert_eq!(p.target_battles, Some(6));
    assert_eq!(p.completion_percent, Some(0.0));
    assert!(!p.is_completed);
}

#[test]
fn test_complete_target_is_pair_count() {
    assert_eq!(target_battles(0, BattlePolicy::Complete, None), Some(0));
    assert_eq!(target_battles(1, BattlePolicy::Complete, None), Some(0));
    assert_eq!(target_battles(3, BattlePolicy::Complete, None), Some(3));
    assert_eq!(target_battles(10, BattlePolicy::Complete, None), Some(45));
}

#[test]
fn test_complete_one_of_three() {
    let p = progress(3, BattlePolicy::Complete, None, 1);
    let percent = p.completion_percent.unwrap();
    assert!((percent - 100.0 / 3.0).abs() < 1e-9);
    assert!(!p.is_completed);
}

#[test]
fn test_zero_target_has_no_percent() {
    let p = progress(1, BattlePolicy::Complete, None, 0);
    assert_eq!(p.target_battles, Some(0));
    assert_eq!(p.completion_percent, None);
    assert!(p.is_completed);
}

#[test]
fn test_fixed_uses_limit_or_default() {
    assert_eq!(target_battles(20, BattlePolicy::Fixed, Some(12)), Some(12));
    assert_eq!(target_battles(20, BattlePolicy::Fixed, None), Some(50));

    let p = progress(20, BattlePolicy::Fixed, Some(12), 12);
    assert!(p.is_completed);
    assert_eq!(p.completion_percent, Some(100.0));
}

#[test]
fn test_per_movie_multiplies_by_items() {
    assert_eq!(target_battles(5, BattlePolicy::PerMovie, Some(3)), Some(15));
    assert_eq!(target_battles(5, BattlePolicy::PerMovie, None), Some(50));

    let p = progress(5, BattlePolicy::PerMovie, Some(3), 6);
    assert!((p.completion_percent.unwrap() - 40.0).abs() < 1e-9);
    assert!(!p.is_completed);
}

#[test]
fn test_infinite_never_completes() {
    for completed in [0, 1, 50, 10_000] {
        let p = progress(8, BattlePolicy::Infinite, None, completed);
        assert_eq!(p.target_battles, None);
        assert_eq!(p.completion_percent, None);
        assert!(!p.is_completed);
        assert_eq!(p.completed_battles, completed);
    }
}

#[test]
fn test_over_completion_not_clamped() {
    let p = progress(3, BattlePolicy::Complete, None, 6);
    assert_eq!(p.completion_percent, Some(200.0));
    assert!(p.is_completed);
}

#[test]
fn test_percent_within_bounds_up_to_target() {
    for completed in 0..=6 {
        let percent = progress(4, BattlePolicy::Complete, None, completed)
            .completion_percent
            .unwrap();
        assert!((0.0..=100.0).contains(&percent));
    }
}
