use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Drill categories used to group catalog entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrillCategory {
    Passing,
    Catching,
    Routes,
    Defense,
    FlagPulling,
    Conditioning,
    Agility,
    TeamPlay,
}

/// Difficulty levels for drills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// Locale identifier for localized drill content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Cs,
    De,
    Es,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Cs => "cs",
            Locale::De => "de",
            Locale::Es => "es",
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "cs" => Ok(Locale::Cs),
            "de" => Ok(Locale::De),
            "es" => Ok(Locale::Es),
            _ => Err(format!("Unknown locale: {}", s)),
        }
    }
}

/// Locale-keyed text with fallback resolution
///
/// Lookup order: requested locale, then English, then any available
/// translation. Missing text resolves to an empty string so renderers
/// never fail on partially translated content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(pub HashMap<String, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn with(locale: Locale, text: impl Into<String>) -> Self {
        let mut map = HashMap::new();
        map.insert(locale.code().to_string(), text.into());
        Self(map)
    }

    pub fn insert(&mut self, locale: Locale, text: impl Into<String>) {
        self.0.insert(locale.code().to_string(), text.into());
    }

    /// Resolve text for a locale with fallback
    pub fn resolve(&self, locale: Locale) -> &str {
        if let Some(text) = self.0.get(locale.code()) {
            return text;
        }
        if let Some(text) = self.0.get(Locale::En.code()) {
            return text;
        }
        // Deterministic pick among whatever translations exist
        self.0
            .iter()
            .min_by(|a, b| a.0.cmp(b.0))
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|v| v.is_empty())
    }
}

/// A single trainable exercise from the catalog
///
/// Drills are owned by the catalog and immutable from the builder's
/// perspective; sessions reference them by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drill {
    /// Unique identifier
    pub id: String,

    /// Canonical duration in minutes (positive)
    pub duration: u32,

    /// Category for filtering and grouping
    pub category: DrillCategory,

    /// Difficulty level
    pub level: DrillLevel,

    /// Localized display name
    pub name: LocalizedText,

    /// Localized description
    pub description: LocalizedText,

    /// Localized step-by-step instructions
    #[serde(default)]
    pub instructions: LocalizedText,

    /// Localized coaching tips
    #[serde(default)]
    pub tips: LocalizedText,
}

/// One occurrence of a drill within a session under construction
///
/// The duration is a session-specific override, initialized from the
/// drill's canonical duration but independently editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderEntry {
    /// Weak reference to a catalog drill, resolved by lookup
    pub drill_id: String,

    /// Minutes allocated to this occurrence (positive)
    pub duration: u32,

    /// Optional coach annotation
    pub notes: Option<String>,

    /// Zero-based position, dense and contiguous within the list
    pub order: usize,
}

/// Persisted form of a builder entry inside a training plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub drill_id: String,
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub order: usize,
}

impl From<&BuilderEntry> for PlanEntry {
    fn from(entry: &BuilderEntry) -> Self {
        Self {
            drill_id: entry.drill_id.clone(),
            duration: entry.duration,
            notes: entry.notes.clone(),
            order: entry.order,
        }
    }
}

/// A durable training plan record
///
/// The document store owns the canonical copy; in-memory instances are
/// read-only projections. `total_duration` is the aggregate captured at
/// save time and is never recomputed on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPlan {
    /// Identifier assigned by the persistence layer on creation
    pub id: String,

    /// Required, non-empty, user-supplied name
    pub name: String,

    /// Optional longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Optional author identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    /// Ordered drill entries
    pub drills: Vec<PlanEntry>,

    /// Total duration in minutes at time of save
    pub total_duration: u32,

    /// Creation timestamp, client-assigned, immutable
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
}

/// `created_at` is persisted as an ISO-8601 string; consumers reconstruct
/// a temporal value on read.
mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

// String conversions used by the document store and CSV import
impl DrillCategory {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "passing" => Ok(DrillCategory::Passing),
            "catching" => Ok(DrillCategory::Catching),
            "routes" | "routerunning" => Ok(DrillCategory::Routes),
            "defense" | "defence" => Ok(DrillCategory::Defense),
            "flagpulling" => Ok(DrillCategory::FlagPulling),
            "conditioning" => Ok(DrillCategory::Conditioning),
            "agility" => Ok(DrillCategory::Agility),
            "teamplay" => Ok(DrillCategory::TeamPlay),
            _ => Err(format!("Unknown drill category: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DrillCategory::Passing => "Passing",
            DrillCategory::Catching => "Catching",
            DrillCategory::Routes => "Routes",
            DrillCategory::Defense => "Defense",
            DrillCategory::FlagPulling => "FlagPulling",
            DrillCategory::Conditioning => "Conditioning",
            DrillCategory::Agility => "Agility",
            DrillCategory::TeamPlay => "TeamPlay",
        }
    }
}

impl std::fmt::Display for DrillCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DrillLevel {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(DrillLevel::Beginner),
            "intermediate" => Ok(DrillLevel::Intermediate),
            "advanced" => Ok(DrillLevel::Advanced),
            _ => Err(format!("Unknown drill level: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DrillLevel::Beginner => "Beginner",
            DrillLevel::Intermediate => "Intermediate",
            DrillLevel::Advanced => "Advanced",
        }
    }
}

impl std::fmt::Display for DrillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
