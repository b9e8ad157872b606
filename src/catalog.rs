//! Drill catalog: the read-only source of available drills
//!
//! Seeded from a JSON file (the canonical format) or imported from CSV
//! for admin-side content loading. The builder only ever references
//! drills by id; resolution happens here.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::models::{Drill, DrillCategory, DrillLevel, Locale, LocalizedText};

/// Filter over catalog drills; unset fields match everything
#[derive(Debug, Clone, Default)]
pub struct DrillFilter {
    pub category: Option<DrillCategory>,
    pub level: Option<DrillLevel>,
}

impl DrillFilter {
    fn matches(&self, drill: &Drill) -> bool {
        self.category.map_or(true, |c| drill.category == c)
            && self.level.map_or(true, |l| drill.level == l)
    }
}

/// In-memory drill catalog with id lookup
#[derive(Debug, Default)]
pub struct Catalog {
    drills: Vec<Drill>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(drills: Vec<Drill>) -> Self {
        let by_id = drills
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id.clone(), i))
            .collect();
        Self { drills, by_id }
    }

    /// Load a catalog from a JSON seed file (array of drills)
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        let drills: Vec<Drill> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog file: {}", path.display()))?;

        info!(drills = drills.len(), path = %path.display(), "catalog loaded");
        Ok(Self::new(drills))
    }

    /// Import drills from a CSV file
    ///
    /// Expected columns: `id,duration,category,level,name_en,description_en`
    /// with optional `name_<locale>`/`description_<locale>`/
    /// `instructions_<locale>`/`tips_<locale>` columns for translations.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open catalog CSV: {}", path.display()))?;

        let headers = reader.headers()?.clone();
        let mut drills = Vec::new();

        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let row = CsvRow::parse(&headers, &record)
                .with_context(|| format!("Invalid drill record on line {}", line + 2))?;
            drills.push(row.into_drill());
        }

        info!(drills = drills.len(), path = %path.display(), "catalog imported from CSV");
        Ok(Self::new(drills))
    }

    /// All drills in catalog order
    pub fn list(&self) -> &[Drill] {
        &self.drills
    }

    /// Resolve a drill by id; `None` is the normal not-found branch
    pub fn get_by_id(&self, id: &str) -> Option<&Drill> {
        self.by_id.get(id).map(|&i| &self.drills[i])
    }

    /// Drills matching the category/level filter
    pub fn filter(&self, filter: &DrillFilter) -> Vec<&Drill> {
        self.drills.iter().filter(|d| filter.matches(d)).collect()
    }

    /// Case-insensitive substring search over localized names
    ///
    /// Matches against every available translation so a Czech query
    /// finds a drill even when the active locale is English.
    pub fn search(&self, query: &str) -> Vec<&Drill> {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return self.drills.iter().collect();
        }
        self.drills
            .iter()
            .filter(|d| {
                d.name
                    .0
                    .values()
                    .any(|name| name.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.drills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drills.is_empty()
    }
}

#[derive(Debug)]
struct CsvRow {
    id: String,
    duration: u32,
    category: DrillCategory,
    level: DrillLevel,
    name: LocalizedText,
    description: LocalizedText,
    instructions: LocalizedText,
    tips: LocalizedText,
}

impl CsvRow {
    fn parse(headers: &csv::StringRecord, record: &csv::StringRecord) -> Result<Self> {
        let mut id = None;
        let mut duration = None;
        let mut category = None;
        let mut level = None;
        let mut name = LocalizedText::new();
        let mut description = LocalizedText::new();
        let mut instructions = LocalizedText::new();
        let mut tips = LocalizedText::new();

        for (header, field) in headers.iter().zip(record.iter()) {
            let header = header.to_lowercase();
            match header.as_str() {
                "id" => id = Some(field.to_string()),
                "duration" => {
                    duration = Some(
                        field
                            .parse::<u32>()
                            .with_context(|| format!("Invalid duration: {}", field))?,
                    )
                }
                "category" => {
                    category = Some(DrillCategory::from_str(field).map_err(anyhow::Error::msg)?)
                }
                "level" => level = Some(DrillLevel::from_str(field).map_err(anyhow::Error::msg)?),
                _ => {
                    if field.is_empty() {
                        continue;
                    }
                    if let Some((kind, code)) = header.rsplit_once('_') {
                        if let Ok(locale) = code.parse::<Locale>() {
                            match kind {
                                "name" => name.insert(locale, field),
                                "description" => description.insert(locale, field),
                                "instructions" => instructions.insert(locale, field),
                                "tips" => tips.insert(locale, field),
                                _ => debug!(column = %header, "ignoring unknown CSV column"),
                            }
                        }
                    }
                }
            }
        }

        let id = id.filter(|s| !s.is_empty()).context("Missing drill id")?;
        let duration = duration.context("Missing drill duration")?;
        anyhow::ensure!(duration > 0, "Drill duration must be positive: {}", id);

        Ok(Self {
            id,
            duration,
            category: category.context("Missing drill category")?,
            level: level.context("Missing drill level")?,
            name,
            description,
            instructions,
            tips,
        })
    }

    fn into_drill(self) -> Drill {
        Drill {
            id: self.id,
            duration: self.duration,
            category: self.category,
            level: self.level,
            name: self.name,
            description: self.description,
            instructions: self.instructions,
            tips: self.tips,
        }
    }
}
