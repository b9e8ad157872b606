//! Persistence adapter between the in-memory composition list and the
//! durable training-plan records in the document store
//!
//! Each save is one atomic document write; the composition list is never
//! mutated here, so a failed save leaves in-memory state untouched and
//! the user can retry.

use chrono::Utc;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{info, warn};

use crate::builder::CompositionList;
use crate::error::{FlagPlanError, Result};
use crate::models::{PlanEntry, TrainingPlan};
use crate::store::DocumentStore;

/// Collection name for training-plan documents
pub const PLANS_COLLECTION: &str = "training_plans";

/// Request parameters for saving a plan
#[derive(Debug, Clone, Default)]
pub struct SaveRequest {
    pub name: String,
    pub description: Option<String>,
    pub created_by: Option<String>,
}

impl SaveRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Adapter over a document store for training plans
pub struct PlanStore<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> PlanStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist the composition list as a new training plan
    ///
    /// Validates a non-empty name and non-empty list before any store
    /// call. `created_at` is client-assigned at call time and the totals
    /// are captured from the aggregator, stored denormalized.
    pub fn save(&self, request: &SaveRequest, list: &CompositionList) -> Result<String> {
        if request.name.trim().is_empty() {
            return Err(FlagPlanError::Validation(
                "plan name must not be empty".to_string(),
            ));
        }
        if list.is_empty() {
            return Err(FlagPlanError::Validation(
                "cannot save a plan without drills".to_string(),
            ));
        }

        let totals = list.totals();
        let plan = TrainingPlan {
            // Placeholder until the store assigns the real id
            id: String::new(),
            name: request.name.trim().to_string(),
            description: request.description.clone(),
            created_by: request.created_by.clone(),
            drills: list.entries().iter().map(PlanEntry::from).collect(),
            total_duration: totals.total_duration,
            created_at: Utc::now(),
        };

        let document = serde_json::to_value(&plan)
            .map_err(|e| FlagPlanError::Validation(format!("plan serialization failed: {}", e)))?;
        let id = self.store.create(PLANS_COLLECTION, &document)?;

        info!(plan_id = %id, drills = plan.drills.len(), total_duration = plan.total_duration, "training plan saved");
        Ok(id)
    }

    /// All saved plans, newest first
    ///
    /// Documents that no longer decode as plans are skipped with a
    /// warning rather than failing the whole listing.
    pub fn list_all(&self) -> Result<Vec<TrainingPlan>> {
        let documents = self.store.list_all(PLANS_COLLECTION)?;
        let mut plans: Vec<TrainingPlan> = documents
            .into_iter()
            .filter_map(|doc| decode_plan(doc).ok())
            .collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(plans)
    }

    /// Resolve a single plan; `None` is the normal not-found branch
    pub fn get_by_id(&self, id: &str) -> Result<Option<TrainingPlan>> {
        match self.store.get_one(PLANS_COLLECTION, id)? {
            Some(doc) => Ok(Some(decode_plan(doc)?)),
            None => Ok(None),
        }
    }

    /// Durable removal; deleting a missing id succeeds
    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(PLANS_COLLECTION, id)?;
        info!(plan_id = %id, "training plan deleted");
        Ok(())
    }
}

fn decode_plan(document: Value) -> Result<TrainingPlan> {
    serde_json::from_value(document).map_err(|e| {
        warn!(error = %e, "undecodable plan document");
        FlagPlanError::Storage(crate::store::StoreError::Serialization(e.to_string()))
    })
}

/// Handle for a polling subscription to the plan listing
///
/// The background poll stops and joins when the handle is dropped, so a
/// view-scoped subscription cannot leak its thread.
pub struct PlanSubscription {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PlanSubscription {
    /// Explicit teardown, equivalent to dropping the handle
    pub fn unsubscribe(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PlanSubscription {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<S: DocumentStore + Send + 'static> PlanStore<S> {
    /// Eventually consistent live view of `list_all`
    ///
    /// Polls the store at `interval` and invokes `on_update` with a fresh
    /// snapshot whenever the listing changes. Store failures during a
    /// poll are logged and retried on the next tick.
    pub fn watch_all<F>(self, interval: Duration, mut on_update: F) -> PlanSubscription
    where
        F: FnMut(Vec<TrainingPlan>) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = std::thread::spawn(move || {
            let mut last_seen: Option<Vec<String>> = None;
            while !stop_flag.load(Ordering::Relaxed) {
                match self.list_all() {
                    Ok(plans) => {
                        let ids: Vec<String> = plans.iter().map(|p| p.id.clone()).collect();
                        if last_seen.as_ref() != Some(&ids) {
                            last_seen = Some(ids);
                            on_update(plans);
                        }
                    }
                    Err(e) => warn!(error = %e, "plan watch poll failed"),
                }
                std::thread::sleep(interval);
            }
        });

        PlanSubscription {
            stop,
            handle: Some(handle),
        }
    }
}
