use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::catalog::Catalog;
use crate::models::{Locale, TrainingPlan};

pub mod json;
pub mod text;

/// Export error types
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
}

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Text,
    Json,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Result<Self, ExportError> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// One drill section of a rendered plan document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillSection {
    /// 1-based sequence number within the plan
    pub sequence: usize,
    pub name: String,
    pub category: String,
    pub level: String,
    /// Minutes allocated in the plan (the session override)
    pub duration: u32,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Format-neutral document tree for a training plan
///
/// This is the finished tree an export sink consumes: a header, a
/// summary block, and one section per resolvable drill in plan order,
/// separated by divider rules at render time. An external paginating
/// renderer (e.g. a PDF library) takes the same tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Stored aggregate from the plan, not recomputed
    pub total_duration: u32,
    pub sections: Vec<DrillSection>,
    /// Drill ids the catalog could no longer resolve
    pub skipped_drill_ids: Vec<String>,
}

impl PlanDocument {
    /// Build the document tree for a plan against the current catalog
    ///
    /// Drills referenced by the plan but absent from the catalog are
    /// silently skipped; plans outlive drill deletions by design.
    pub fn build(plan: &TrainingPlan, catalog: &Catalog, locale: Locale) -> Self {
        let mut sections = Vec::new();
        let mut skipped = Vec::new();

        let mut entries: Vec<_> = plan.drills.iter().collect();
        entries.sort_by_key(|e| e.order);

        for entry in entries {
            let Some(drill) = catalog.get_by_id(&entry.drill_id) else {
                warn!(drill_id = %entry.drill_id, plan_id = %plan.id, "drill missing from catalog, skipping section");
                skipped.push(entry.drill_id.clone());
                continue;
            };
            sections.push(DrillSection {
                sequence: sections.len() + 1,
                name: drill.name.resolve(locale).to_string(),
                category: drill.category.to_string(),
                level: drill.level.to_string(),
                duration: entry.duration,
                description: drill.description.resolve(locale).to_string(),
                notes: entry.notes.clone(),
            });
        }

        Self {
            title: plan.name.clone(),
            created_at: plan.created_at,
            total_duration: plan.total_duration,
            sections,
            skipped_drill_ids: skipped,
        }
    }

    /// Suggested filename: plan name with whitespace replaced
    pub fn suggested_filename(&self, format: ExportFormat) -> String {
        let stem: String = self
            .title
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        let stem = if stem.is_empty() { "training_plan".to_string() } else { stem };
        let ext = match format {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
        };
        format!("{}.{}", stem, ext)
    }
}

/// Sink that performs the rendering/download side effect
///
/// The core only supplies the finished tree and a suggested filename.
pub trait ExportSink {
    fn export(&self, document: &PlanDocument, suggested_filename: &str) -> Result<(), ExportError>;
}

/// Sink writing rendered documents into a target directory
pub struct FileSink {
    directory: std::path::PathBuf,
    format: ExportFormat,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(directory: P, format: ExportFormat) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            format,
        }
    }
}

impl ExportSink for FileSink {
    fn export(&self, document: &PlanDocument, suggested_filename: &str) -> Result<(), ExportError> {
        let path = self.directory.join(suggested_filename);
        match self.format {
            ExportFormat::Text => text::export_plan_document(document, &path),
            ExportFormat::Json => json::export_plan_document(document, &path),
        }
    }
}
