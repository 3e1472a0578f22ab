use super::*;

#[test]
fn test_expected_score_equal_ratings() {
    // Equal ratings should give 50% expected score
    let expected = expected_score(1200.0, 1200.0);
    assert!((expected - 0.5).abs() < 1e-12);
}

#[test]
fn test_expected_score_400_gap() {
    let favourite = expected_score(1600.0, 1200.0);
    assert!((favourite - 10.0 / 11.0).abs() < 1e-9);
    assert!((favourite + expected_score(1200.0, 1600.0) - 1.0).abs() < 1e-12);
}

#[test]
fn test_update_equal_ratings() {
    let result = update(1200.0, 1200.0, 32.0);
    assert_eq!(result.winner_new, 1216.0);
    assert_eq!(result.loser_new, 1184.0);
    assert_eq!(result.winner_delta, 16.0);
    assert_eq!(result.loser_delta, -16.0);
}

#[test]
fn test_equal_ratings_split_k_evenly() {
    for k in [10.0, 24.0, 32.0, 40.0] {
        for rating in [800.0, 1200.0, 1500.0, 2100.0] {
            let result = update(rating, rating, k);
            assert_eq!(result.winner_delta, k / 2.0);
            assert_eq!(result.loser_delta, -k / 2.0);
        }
    }
}

#[test]
fn test_update_is_zero_sum() {
    let ratings = [900.0, 1180.5, 1200.0, 1433.3, 1750.0, 2400.0];
    for &a in &ratings {
        for &b in &ratings {
            let result = update(a, b, 32.0);
            assert_eq!(result.winner_delta, -result.loser_delta, "a={a} b={b}");
        }
    }
}

#[test]
fn test_opposite_outcomes_are_complementary() {
    // a beating b and b beating a share the same K between them
    let ratings = [1000.0, 1200.0, 1320.0, 1650.0];
    for &a in &ratings {
        for &b in &ratings {
            let a_wins = update(a, b, 32.0);
            let b_wins = update(b, a, 32.0);
            let total = a_wins.winner_delta + b_wins.winner_delta;
            assert!((total - 32.0).abs() <= 0.1 + 1e-9, "a={a} b={b} total={total}");
        }
    }
}

#[test]
fn test_update_depends_only_on_difference() {
    let low = update(1100.0, 1300.0, 32.0);
    let high = update(1500.0, 1700.0, 32.0);
    assert_eq!(low.winner_delta, high.winner_delta);
    assert_eq!(low.loser_delta, high.loser_delta);
}

#[test]
fn test_upset_moves_more_than_expected_win() {
    let upset = update(1200.0, 1600.0, 32.0);
    let expected_win = update(1600.0, 1200.0, 32.0);
    assert!(upset.winner_delta > expected_win.winner_delta);
    assert!(upset.winner_new > 1200.0);
    assert!(upset.loser_new < 1600.0);
}

#[test]
fn test_results_rounded_to_one_decimal() {
    let result = update(1234.0, 1187.0, 32.0);
    for value in [
        result.winner_new,
        result.loser_new,
        result.winner_delta,
        result.loser_delta,
    ] {
        assert!(((value * 10.0).round() - value * 10.0).abs() < 1e-6, "{value}");
    }
}

#[test]
fn test_new_rating_moves_by_exactly_the_delta() {
    let result = update(1234.56, 1187.04, 32.0);
    assert!((result.winner_new - 1234.6 - result.winner_delta).abs() < 1e-9);
    assert!((result.loser_new - 1187.0 - result.loser_delta).abs() < 1e-9);
    assert_eq!(result.winner_delta, -result.loser_delta);

    let precise = update(1200.04, 1199.96, 32.0);
    assert_eq!(precise.winner_new, 1216.0);
    assert_eq!(precise.loser_new, 1184.0);
}

#[test]
fn test_round_rating() {
    assert_eq!(round_rating(1234.56), 1234.6);
    assert_eq!(round_rating(1184.04), 1184.0);
    assert_eq!(round_rating(-15.26), -15.3);
}

#[test]
fn test_fixed_k_factor_ignores_ratings() {
    let k = KFactor::default();
    assert_eq!(k.resolve(1200.0, 2000.0), K_FACTOR);
    assert_eq!(KFactor::Fixed { k: 16.0 }.resolve(1200.0, 1200.0), 16.0);
}

#[test]
fn test_dynamic_k_factor_bands() {
    let k = KFactor::Dynamic;
    assert_eq!(k.resolve(1200.0, 1200.0), 24.0);
    assert_eq!(k.resolve(1200.0, 1400.0), 24.0);
    assert_eq!(k.resolve(1200.0, 1401.0), 32.0);
    assert_eq!(k.resolve(1601.0, 1200.0), 40.0);
    assert_eq!(k.resolve(1200.0, 1700.0), 40.0);
}

#[test]
fn test_k_factor_serde_shape() {
    let dynamic: KFactor = serde_json::from_str(r#"{"mode":"dynamic"}"#).unwrap();
    assert_eq!(dynamic, KFactor::Dynamic);

    let fixed: KFactor = serde_json::from_str(r#"{"mode":"fixed","k":20.0}"#).unwrap();
    assert_eq!(fixed, KFactor::Fixed { k: 20.0 });
}
