//! Session builder: the in-memory composition list and its aggregator
//!
//! A `CompositionList` holds the ordered drill entries of one session
//! under construction. `order` fields stay dense and strictly increasing
//! from zero across every mutation, and a drill id appears at most once.
//! Nothing here persists anything durably; saving goes through
//! `plans::PlanStore`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{BuilderEntry, Drill};

/// Outcome of an `add_drill` call
///
/// Duplicates are a normal, non-fatal signal the caller surfaces to the
/// user, so they are a value rather than an error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Duplicate,
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added)
    }
}

/// Derived totals over the composition list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of all entry durations in minutes
    pub total_duration: u32,

    /// Number of entries
    pub count: usize,
}

/// Observer invoked after every mutation with the fresh totals
pub type TotalsObserver = Box<dyn FnMut(Totals)>;

/// Ordered, duplicate-free list of builder entries for one session
#[derive(Default)]
pub struct CompositionList {
    entries: Vec<BuilderEntry>,
    observers: Vec<TotalsObserver>,
}

impl CompositionList {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Rebuild a list from previously serialized entries (session files)
    ///
    /// Orders are renumbered from the sequence position and duplicate
    /// drill ids beyond the first occurrence are dropped, so a list
    /// restored from disk satisfies the same invariants as a fresh one.
    pub fn from_entries(entries: Vec<BuilderEntry>) -> Self {
        let mut list = Self::new();
        for entry in entries {
            if list.find(&entry.drill_id).is_some() {
                continue;
            }
            let order = list.entries.len();
            list.entries.push(BuilderEntry { order, ..entry });
        }
        list
    }

    /// Append a drill to the session
    ///
    /// Duration is initialized from the drill's canonical duration and
    /// `order` from the current length. Returns `Duplicate` without
    /// touching the list when the drill is already present.
    pub fn add_drill(&mut self, drill: &Drill) -> AddOutcome {
        if self.is_drill_in_training(&drill.id) {
            debug!(drill_id = %drill.id, "rejected duplicate drill");
            return AddOutcome::Duplicate;
        }

        self.entries.push(BuilderEntry {
            drill_id: drill.id.clone(),
            duration: drill.duration,
            notes: None,
            order: self.entries.len(),
        });
        self.notify();
        AddOutcome::Added
    }

    /// Remove the entry at `index` and renumber survivors
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`. Out-of-range removal is a programming
    /// error, not a user-facing error path.
    pub fn remove_drill(&mut self, index: usize) -> BuilderEntry {
        assert!(
            index < self.entries.len(),
            "remove_drill index {} out of range for list of length {}",
            index,
            self.entries.len()
        );
        let removed = self.entries.remove(index);
        self.renumber();
        self.notify();
        removed
    }

    /// Move the entry at `from` to position `to`, renumbering afterward
    ///
    /// Both indexes are clamped to the valid range; `from == to` is a
    /// no-op that fires no notification.
    pub fn reorder_drills(&mut self, from: usize, to: usize) {
        if self.entries.is_empty() {
            return;
        }
        let last = self.entries.len() - 1;
        let from = from.min(last);
        let to = to.min(last);
        if from == to {
            return;
        }

        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        self.renumber();
        self.notify();
    }

    /// Empty the list unconditionally
    pub fn clear_all_drills(&mut self) {
        self.entries.clear();
        self.notify();
    }

    /// Membership test backing the duplicate rule, exposed for UI queries
    pub fn is_drill_in_training(&self, drill_id: &str) -> bool {
        self.find(drill_id).is_some()
    }

    /// Override the allocated duration of the entry at `index`
    ///
    /// Zero durations are rejected; the entry keeps its previous value.
    pub fn set_duration(&mut self, index: usize, minutes: u32) -> bool {
        assert!(
            index < self.entries.len(),
            "set_duration index {} out of range for list of length {}",
            index,
            self.entries.len()
        );
        if minutes == 0 {
            return false;
        }
        self.entries[index].duration = minutes;
        self.notify();
        true
    }

    /// Set or clear the coach notes of the entry at `index`
    pub fn set_notes(&mut self, index: usize, notes: Option<String>) {
        assert!(
            index < self.entries.len(),
            "set_notes index {} out of range for list of length {}",
            index,
            self.entries.len()
        );
        self.entries[index].notes = notes;
        self.notify();
    }

    /// Current derived totals (the aggregator)
    ///
    /// Pure recomputation over the list; an empty list yields zero/zero.
    pub fn totals(&self) -> Totals {
        Totals {
            total_duration: self.entries.iter().map(|e| e.duration).sum(),
            count: self.entries.len(),
        }
    }

    /// Register an observer called with fresh totals after every mutation
    pub fn observe(&mut self, observer: TotalsObserver) {
        self.observers.push(observer);
    }

    pub fn entries(&self) -> &[BuilderEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, drill_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.drill_id == drill_id)
    }

    fn renumber(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.order = i;
        }
    }

    fn notify(&mut self) {
        let totals = Totals {
            total_duration: self.entries.iter().map(|e| e.duration).sum(),
            count: self.entries.len(),
        };
        for observer in &mut self.observers {
            observer(totals);
        }
    }
}

impl std::fmt::Debug for CompositionList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositionList")
            .field("entries", &self.entries)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DrillCategory, DrillLevel, Locale, LocalizedText};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn drill(id: &str, duration: u32) -> Drill {
        Drill {
            id: id.to_string(),
            duration,
            category: DrillCategory::Passing,
            level: DrillLevel::Beginner,
            name: LocalizedText::with(Locale::En, format!("Drill {}", id)),
            description: LocalizedText::with(Locale::En, "Test drill"),
            instructions: LocalizedText::new(),
            tips: LocalizedText::new(),
        }
    }

    fn orders(list: &CompositionList) -> Vec<usize> {
        list.entries().iter().map(|e| e.order).collect()
    }

    #[test]
    fn test_add_assigns_dense_orders_in_insertion_order() {
        let mut list = CompositionList::new();
        assert!(list.add_drill(&drill("a", 10)).is_added());
        assert!(list.add_drill(&drill("b", 15)).is_added());
        assert!(list.add_drill(&drill("c", 5)).is_added());

        let ids: Vec<&str> = list.entries().iter().map(|e| e.drill_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(orders(&list), vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicate_add_is_rejected_without_change() {
        let mut list = CompositionList::new();
        list.add_drill(&drill("a", 10));
        list.add_drill(&drill("b", 15));

        let before: Vec<BuilderEntry> = list.entries().to_vec();
        assert_eq!(list.add_drill(&drill("a", 99)), AddOutcome::Duplicate);
        assert_eq!(list.entries(), before.as_slice());
        assert_eq!(list.totals().total_duration, 25);
    }

    #[test]
    fn test_remove_renumbers_survivors() {
        let mut list = CompositionList::new();
        list.add_drill(&drill("a", 10));
        list.add_drill(&drill("b", 15));
        list.add_drill(&drill("c", 5));

        let removed = list.remove_drill(1);
        assert_eq!(removed.drill_id, "b");

        let ids: Vec<&str> = list.entries().iter().map(|e| e.drill_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(orders(&list), vec![0, 1]);
        assert_eq!(list.totals(), Totals { total_duration: 15, count: 2 });
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_remove_out_of_range_panics() {
        let mut list = CompositionList::new();
        list.add_drill(&drill("a", 10));
        list.remove_drill(1);
    }

    #[test]
    fn test_reorder_and_inverse_restore_original() {
        let mut list = CompositionList::new();
        for (id, d) in [("a", 10), ("b", 15), ("c", 5), ("d", 20)] {
            list.add_drill(&drill(id, d));
        }
        let original: Vec<String> = list.entries().iter().map(|e| e.drill_id.clone()).collect();

        list.reorder_drills(0, 3);
        assert_ne!(
            original,
            list.entries().iter().map(|e| e.drill_id.clone()).collect::<Vec<_>>()
        );
        list.reorder_drills(3, 0);

        let restored: Vec<String> = list.entries().iter().map(|e| e.drill_id.clone()).collect();
        assert_eq!(original, restored);
        assert_eq!(orders(&list), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_reorder_same_index_is_noop() {
        let mut list = CompositionList::new();
        list.add_drill(&drill("a", 10));
        list.add_drill(&drill("b", 15));

        let fired = Rc::new(RefCell::new(0));
        let fired_clone = Rc::clone(&fired);
        list.observe(Box::new(move |_| *fired_clone.borrow_mut() += 1));

        list.reorder_drills(1, 1);
        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn test_reorder_clamps_out_of_range_target() {
        let mut list = CompositionList::new();
        list.add_drill(&drill("a", 10));
        list.add_drill(&drill("b", 15));

        list.reorder_drills(0, 10);
        let ids: Vec<&str> = list.entries().iter().map(|e| e.drill_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(orders(&list), vec![0, 1]);
    }

    #[test]
    fn test_clear_empties_unconditionally() {
        let mut list = CompositionList::new();
        list.add_drill(&drill("a", 10));
        list.clear_all_drills();
        assert!(list.is_empty());
        assert_eq!(list.totals(), Totals::default());
    }

    #[test]
    fn test_membership_query_matches_add_rule() {
        let mut list = CompositionList::new();
        list.add_drill(&drill("a", 10));
        assert!(list.is_drill_in_training("a"));
        assert!(!list.is_drill_in_training("b"));
    }

    #[test]
    fn test_totals_track_every_mutation() {
        let mut list = CompositionList::new();
        assert_eq!(list.totals(), Totals::default());

        list.add_drill(&drill("a", 10));
        list.add_drill(&drill("b", 15));
        list.add_drill(&drill("c", 5));
        assert_eq!(list.totals(), Totals { total_duration: 30, count: 3 });

        list.remove_drill(1);
        assert_eq!(list.totals(), Totals { total_duration: 15, count: 2 });
    }

    #[test]
    fn test_observer_fires_with_fresh_totals() {
        let mut list = CompositionList::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        list.observe(Box::new(move |t| seen_clone.borrow_mut().push(t)));

        list.add_drill(&drill("a", 10));
        list.add_drill(&drill("b", 15));
        list.remove_drill(0);

        assert_eq!(
            *seen.borrow(),
            vec![
                Totals { total_duration: 10, count: 1 },
                Totals { total_duration: 25, count: 2 },
                Totals { total_duration: 15, count: 1 },
            ]
        );
    }

    #[test]
    fn test_set_duration_overrides_canonical() {
        let mut list = CompositionList::new();
        list.add_drill(&drill("a", 10));

        assert!(list.set_duration(0, 25));
        assert_eq!(list.entries()[0].duration, 25);
        assert_eq!(list.totals().total_duration, 25);

        // Zero is rejected, previous value kept
        assert!(!list.set_duration(0, 0));
        assert_eq!(list.entries()[0].duration, 25);
    }

    #[test]
    fn test_set_notes() {
        let mut list = CompositionList::new();
        list.add_drill(&drill("a", 10));
        list.set_notes(0, Some("focus on footwork".to_string()));
        assert_eq!(list.entries()[0].notes.as_deref(), Some("focus on footwork"));
        list.set_notes(0, None);
        assert!(list.entries()[0].notes.is_none());
    }

    #[test]
    fn test_from_entries_renumbers_and_dedups() {
        let entries = vec![
            BuilderEntry { drill_id: "a".into(), duration: 10, notes: None, order: 7 },
            BuilderEntry { drill_id: "b".into(), duration: 15, notes: None, order: 2 },
            BuilderEntry { drill_id: "a".into(), duration: 99, notes: None, order: 4 },
        ];
        let list = CompositionList::from_entries(entries);
        let ids: Vec<&str> = list.entries().iter().map(|e| e.drill_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(orders(&list), vec![0, 1]);
        assert_eq!(list.entries()[0].duration, 10);
    }
}
