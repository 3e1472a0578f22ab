use super::*;
use crate::types::PairKey;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeSet, HashMap};

fn items(ids: &[&str]) -> Vec<ComparableItem> {
    ids.iter().map(|id| ComparableItem::new(*id, 1200.0)).collect()
}

fn keys(pairs: &[Pair]) -> BTreeSet<PairKey> {
    pairs.iter().map(Pair::key).collect()
}

fn full_key_set(ids: &[&str]) -> BTreeSet<PairKey> {
    let mut all = BTreeSet::new();
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            all.insert(PairKey::new((*a).into(), (*b).into()));
        }
    }
    all
}

#[test]
fn test_complete_covers_every_pair_once() {
    let mut rng = StdRng::seed_from_u64(7);
    let ids = ["a", "b", "c", "d", "e"];
    let pairs = generate_pairs(
        &items(&ids),
        &CompletedPairs::new(),
        BattlePolicy::Complete,
        None,
        &mut rng,
    );

    assert_eq!(pairs.len(), 10);
    assert_eq!(keys(&pairs), full_key_set(&ids));
    assert!(pairs.iter().all(|pair| pair.first != pair.second));
}

#[test]
fn test_complete_skips_completed_pairs() {
    let ids = ["a", "b", "c", "d"];
    let mut completed = CompletedPairs::new();
    completed.insert(PairKey::new("b".into(), "a".into()));
    completed.insert(PairKey::new("c".into(), "d".into()));

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let pairs = generate_pairs(
            &items(&ids),
            &completed,
            BattlePolicy::Complete,
            None,
            &mut rng,
        );
        let generated = keys(&pairs);

        assert_eq!(pairs.len(), generated.len(), "no duplicates");
        assert!(generated.is_disjoint(&completed));
        let union: BTreeSet<_> = generated.union(&completed).cloned().collect();
        assert_eq!(union, full_key_set(&ids));
    }
}

#[test]
fn test_complete_exhausted_returns_empty() {
    let ids = ["a", "b", "c"];
    let completed = full_key_set(&ids);
    let mut rng = StdRng::seed_from_u64(1);
    let pairs = generate_pairs(&items(&ids), &completed, BattlePolicy::Complete, None, &mut rng);
    assert!(pairs.is_empty());
}

#[test]
fn test_fixed_truncates_to_limit() {
    let ids = ["a", "b", "c", "d", "e", "f"];
    let mut rng = StdRng::seed_from_u64(3);
    let pairs = generate_pairs(
        &items(&ids),
        &CompletedPairs::new(),
        BattlePolicy::Fixed,
        Some(4),
        &mut rng,
    );
    assert_eq!(pairs.len(), 4);
    assert_eq!(keys(&pairs).len(), 4);
}

#[test]
fn test_fixed_limit_above_pair_count() {
    let ids = ["a", "b", "c"];
    let mut rng = StdRng::seed_from_u64(3);
    let pairs = generate_pairs(
        &items(&ids),
        &CompletedPairs::new(),
        BattlePolicy::Fixed,
        Some(50),
        &mut rng,
    );
    assert_eq!(pairs.len(), 3);
}

#[test]
fn test_per_movie_truncates_to_items_times_limit() {
    let ids: Vec<String> = (0..8).map(|i| format!("m{i}")).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let mut rng = StdRng::seed_from_u64(11);
    let pairs = generate_pairs(
        &items(&refs),
        &CompletedPairs::new(),
        BattlePolicy::PerMovie,
        Some(2),
        &mut rng,
    );
    // 8 items x 2 = 16 out of 28 unique pairs
    assert_eq!(pairs.len(), 16);
    assert_eq!(keys(&pairs).len(), 16);
}

#[test]
fn test_ineligible_items_are_filtered() {
    let mut list = items(&["a", "b", "c"]);
    list.push(ComparableItem::new("", 1200.0));
    list.push(ComparableItem::new("   ", 1200.0));
    list.push(ComparableItem::new("nan", f64::NAN));

    let mut rng = StdRng::seed_from_u64(5);
    let pairs = generate_pairs(&list, &CompletedPairs::new(), BattlePolicy::Complete, None, &mut rng);
    assert_eq!(keys(&pairs), full_key_set(&["a", "b", "c"]));
}

#[test]
fn test_duplicate_ids_pair_once() {
    let list = items(&["a", "b", "a"]);
    let mut rng = StdRng::seed_from_u64(5);
    let pairs = generate_pairs(&list, &CompletedPairs::new(), BattlePolicy::Complete, None, &mut rng);
    assert_eq!(pairs.len(), 1);
}

#[test]
fn test_fewer_than_two_items_produce_nothing() {
    let mut rng = StdRng::seed_from_u64(9);
    for policy in [
        BattlePolicy::Complete,
        BattlePolicy::Fixed,
        BattlePolicy::PerMovie,
        BattlePolicy::Infinite,
    ] {
        assert!(generate_pairs(&items(&["solo"]), &CompletedPairs::new(), policy, Some(5), &mut rng)
            .is_empty());
        assert!(generate_pairs(&[], &CompletedPairs::new(), policy, Some(5), &mut rng).is_empty());
    }
    assert!(random_pair(&items(&["solo"]), &mut rng).is_none());
}

#[test]
fn test_infinite_ignores_completed_pairs() {
    let ids = ["a", "b"];
    let completed = full_key_set(&ids);
    let mut rng = StdRng::seed_from_u64(2);
    let pairs = generate_pairs(&items(&ids), &completed, BattlePolicy::Infinite, None, &mut rng);
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].key(), PairKey::new("a".into(), "b".into()));
}

#[test]
fn test_random_pair_distinct_and_roughly_uniform() {
    let ids = ["a", "b", "c", "d"];
    let list = items(&ids);
    let mut rng = StdRng::seed_from_u64(42);
    let mut appearances: HashMap<ItemId, u32> = HashMap::new();

    for _ in 0..4000 {
        let pair = random_pair(&list, &mut rng).unwrap();
        assert_ne!(pair.first, pair.second);
        *appearances.entry(pair.first).or_insert(0) += 1;
        *appearances.entry(pair.second).or_insert(0) += 1;
    }

    // 8000 appearances over 4 items, expect ~2000 each
    assert_eq!(appearances.len(), 4);
    for count in appearances.values() {
        assert!((1700..=2300).contains(count), "count {count}");
    }
}

#[test]
fn test_shuffle_varies_order() {
    let ids = ["a", "b", "c", "d", "e", "f"];
    let list = items(&ids);
    let orders: BTreeSet<Vec<PairKey>> = (0..10)
        .map(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            generate_pairs(&list, &CompletedPairs::new(), BattlePolicy::Complete, None, &mut rng)
                .iter()
                .map(Pair::key)
                .collect()
        })
        .collect();
    assert!(orders.len() > 1);
}

#[test]
fn test_unique_pair_count() {
    assert_eq!(unique_pair_count(0), 0);
    assert_eq!(unique_pair_count(1), 0);
    assert_eq!(unique_pair_count(4), 6);
    assert_eq!(unique_pair_count(10), 45);
}
