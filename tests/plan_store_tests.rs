use flagplan::builder::CompositionList;
use flagplan::error::FlagPlanError;
use flagplan::models::{Drill, DrillCategory, DrillLevel, Locale, LocalizedText};
use flagplan::plans::{PlanStore, SaveRequest};
use flagplan::store::{DocumentStore, SqliteStore};

/// End-to-end persistence tests against the SQLite-backed store

fn drill(id: &str, duration: u32) -> Drill {
    Drill {
        id: id.to_string(),
        duration,
        category: DrillCategory::Defense,
        level: DrillLevel::Intermediate,
        name: LocalizedText::with(Locale::En, id.to_uppercase()),
        description: LocalizedText::with(Locale::En, "Store test drill"),
        instructions: LocalizedText::new(),
        tips: LocalizedText::new(),
    }
}

fn session() -> CompositionList {
    let mut list = CompositionList::new();
    list.add_drill(&drill("warmup", 10));
    list.add_drill(&drill("routes", 20));
    list
}

#[test]
fn test_save_and_reload_through_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("plans.db");

    let id = {
        let plans = PlanStore::new(SqliteStore::open(&db_path).unwrap());
        plans
            .save(&SaveRequest::named("Tuesday Practice"), &session())
            .unwrap()
    };
    assert!(!id.is_empty());

    // Reopen the database to prove the write was durable
    let plans = PlanStore::new(SqliteStore::open(&db_path).unwrap());
    let plan = plans.get_by_id(&id).unwrap().unwrap();

    assert_eq!(plan.name, "Tuesday Practice");
    assert_eq!(plan.drills.len(), 2);
    assert_eq!(plan.total_duration, 30);
    assert_eq!(plan.drills[0].drill_id, "warmup");
    assert_eq!(plan.drills[0].order, 0);
    assert_eq!(plan.drills[1].drill_id, "routes");
    assert_eq!(plan.drills[1].order, 1);
}

#[test]
fn test_created_at_is_stored_as_iso8601_text() {
    let store = SqliteStore::open_in_memory().unwrap();
    let id = {
        let plans = PlanStore::new(&store);
        plans
            .save(&SaveRequest::named("Layout check"), &session())
            .unwrap()
    };

    let raw = store
        .get_one(flagplan::plans::PLANS_COLLECTION, &id)
        .unwrap()
        .unwrap();
    let created_at = raw["created_at"].as_str().expect("created_at is a string");
    assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());
    assert!(raw["drills"].is_array());
    assert!(raw["total_duration"].is_u64());
}

#[test]
fn test_get_by_id_of_unsaved_plan_is_not_found() {
    let plans = PlanStore::new(SqliteStore::open_in_memory().unwrap());
    assert!(plans.get_by_id("never-saved").unwrap().is_none());
}

#[test]
fn test_validation_errors_never_reach_the_store() {
    let plans = PlanStore::new(SqliteStore::open_in_memory().unwrap());

    let err = plans
        .save(&SaveRequest::named(""), &session())
        .unwrap_err();
    assert!(matches!(err, FlagPlanError::Validation(_)));

    let err = plans
        .save(&SaveRequest::named("Empty"), &CompositionList::new())
        .unwrap_err();
    assert!(matches!(err, FlagPlanError::Validation(_)));

    assert!(plans.list_all().unwrap().is_empty());
}

#[test]
fn test_list_all_orders_newest_first() {
    let plans = PlanStore::new(SqliteStore::open_in_memory().unwrap());

    let first = plans.save(&SaveRequest::named("First"), &session()).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = plans.save(&SaveRequest::named("Second"), &session()).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let third = plans.save(&SaveRequest::named("Third"), &session()).unwrap();

    let ids: Vec<String> = plans.list_all().unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![third, second, first]);
}

#[test]
fn test_delete_then_get_is_not_found() {
    let plans = PlanStore::new(SqliteStore::open_in_memory().unwrap());
    let id = plans.save(&SaveRequest::named("Doomed"), &session()).unwrap();

    plans.delete(&id).unwrap();
    assert!(plans.get_by_id(&id).unwrap().is_none());
    // Idempotent: a second delete still succeeds
    plans.delete(&id).unwrap();
}

#[test]
fn test_failed_save_leaves_composition_untouched() {
    let plans = PlanStore::new(SqliteStore::open_in_memory().unwrap());
    let list = session();
    let before: Vec<_> = list.entries().to_vec();

    let _ = plans.save(&SaveRequest::named("  "), &list);

    assert_eq!(list.entries(), before.as_slice());
    assert_eq!(list.totals().total_duration, 30);
}
