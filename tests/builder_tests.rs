use flagplan::builder::{AddOutcome, CompositionList, Totals};
use flagplan::models::{Drill, DrillCategory, DrillLevel, Locale, LocalizedText};
use proptest::prelude::*;

/// Integration tests for the composition list invariants

fn drill(id: &str, duration: u32) -> Drill {
    Drill {
        id: id.to_string(),
        duration,
        category: DrillCategory::Passing,
        level: DrillLevel::Beginner,
        name: LocalizedText::with(Locale::En, format!("Drill {}", id)),
        description: LocalizedText::with(Locale::En, "Integration test drill"),
        instructions: LocalizedText::new(),
        tips: LocalizedText::new(),
    }
}

fn assert_dense_orders(list: &CompositionList) {
    for (i, entry) in list.entries().iter().enumerate() {
        assert_eq!(entry.order, i, "order must be dense and strictly increasing");
    }
}

#[test]
fn test_session_scenario_add_and_remove() {
    let mut list = CompositionList::new();
    list.add_drill(&drill("a", 10));
    list.add_drill(&drill("b", 15));
    list.add_drill(&drill("c", 5));

    assert_eq!(list.totals(), Totals { total_duration: 30, count: 3 });
    assert_dense_orders(&list);

    list.remove_drill(1);
    let ids: Vec<&str> = list.entries().iter().map(|e| e.drill_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert_eq!(list.totals(), Totals { total_duration: 15, count: 2 });
    assert_dense_orders(&list);
}

#[test]
fn test_add_changes_total_by_exactly_duration() {
    let mut list = CompositionList::new();
    let mut expected = 0u32;
    for (i, d) in [10u32, 7, 22, 1].iter().enumerate() {
        let before = list.totals().total_duration;
        list.add_drill(&drill(&format!("d{}", i), *d));
        expected += d;
        assert_eq!(list.totals().total_duration, before + d);
    }
    assert_eq!(list.totals().total_duration, expected);
}

#[test]
fn test_duplicate_add_reports_failure_and_preserves_state() {
    let mut list = CompositionList::new();
    list.add_drill(&drill("a", 10));
    list.add_drill(&drill("b", 15));

    let orders_before: Vec<usize> = list.entries().iter().map(|e| e.order).collect();
    assert_eq!(list.add_drill(&drill("b", 40)), AddOutcome::Duplicate);

    assert_eq!(list.len(), 2);
    let orders_after: Vec<usize> = list.entries().iter().map(|e| e.order).collect();
    assert_eq!(orders_before, orders_after);
}

#[test]
fn test_reorder_roundtrip_restores_order() {
    for (a, b) in [(0usize, 4usize), (1, 3), (4, 0), (2, 1)] {
        let mut list = CompositionList::new();
        for i in 0..5 {
            list.add_drill(&drill(&format!("d{}", i), 10 + i));
        }
        let original: Vec<String> = list.entries().iter().map(|e| e.drill_id.clone()).collect();

        list.reorder_drills(a, b);
        list.reorder_drills(b, a);

        let restored: Vec<String> = list.entries().iter().map(|e| e.drill_id.clone()).collect();
        assert_eq!(original, restored, "reorder({},{}) then inverse", a, b);
        assert_dense_orders(&list);
    }
}

proptest! {
    /// Any sequence of adds with distinct ids yields one entry per id in
    /// insertion order with orders 0,1,2,...
    #[test]
    fn prop_distinct_adds_keep_insertion_order(durations in prop::collection::vec(1u32..120, 1..40)) {
        let mut list = CompositionList::new();
        for (i, d) in durations.iter().enumerate() {
            let id = format!("d{}", i);
            prop_assert!(list.add_drill(&drill(&id, *d)).is_added());
        }

        prop_assert_eq!(list.len(), durations.len());
        for (i, entry) in list.entries().iter().enumerate() {
            prop_assert_eq!(entry.order, i);
            let expected_id = format!("d{}", i);
            prop_assert_eq!(entry.drill_id.as_str(), expected_id.as_str());
        }
        let total: u32 = durations.iter().sum();
        prop_assert_eq!(list.totals().total_duration, total);
    }

    /// Removals at arbitrary valid indexes keep orders dense and the
    /// relative order of survivors intact
    #[test]
    fn prop_removals_keep_orders_dense(
        count in 2usize..30,
        removals in prop::collection::vec(0usize..100, 1..10),
    ) {
        let mut list = CompositionList::new();
        for i in 0..count {
            list.add_drill(&drill(&format!("d{}", i), 10));
        }

        let mut survivors: Vec<String> =
            list.entries().iter().map(|e| e.drill_id.clone()).collect();

        for r in removals {
            if list.is_empty() {
                break;
            }
            let index = r % list.len();
            let removed = list.remove_drill(index);
            survivors.retain(|id| id != &removed.drill_id);

            let ids: Vec<String> = list.entries().iter().map(|e| e.drill_id.clone()).collect();
            prop_assert_eq!(&ids, &survivors);
            for (i, entry) in list.entries().iter().enumerate() {
                prop_assert_eq!(entry.order, i);
            }
        }
    }

    /// Total duration always equals the sum of entry durations across
    /// mixed add/override mutations
    #[test]
    fn prop_totals_match_entry_sum(
        durations in prop::collection::vec(1u32..120, 1..20),
        overrides in prop::collection::vec((0usize..20, 1u32..240), 0..10),
    ) {
        let mut list = CompositionList::new();
        for (i, d) in durations.iter().enumerate() {
            list.add_drill(&drill(&format!("d{}", i), *d));
        }
        for (index, minutes) in overrides {
            let index = index % list.len();
            list.set_duration(index, minutes);
        }

        let expected: u32 = list.entries().iter().map(|e| e.duration).sum();
        prop_assert_eq!(list.totals().total_duration, expected);
        prop_assert_eq!(list.totals().count, list.len());
    }
}
