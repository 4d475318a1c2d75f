use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

use crate::journal::{DailyRecord, Principles};

/// One day's summary as stored in the dashboard metrics file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: String,
    #[serde(default)]
    pub sleep: Option<f64>,
    #[serde(default)]
    pub exercise: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub thinking: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mood: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub principles: Principles,
    /// Fields added by the dashboard; kept across reruns for the same date.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Older dashboards write `null` for days without a journal.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl DailySummary {
    pub fn from_record(record: &DailyRecord) -> Self {
        Self {
            date: record.date.clone(),
            sleep: record.sleep,
            exercise: record.exercise,
            thinking: record.thinking_chars.unwrap_or(0),
            mood: record.mood.label().to_string(),
            principles: record.principles,
            extra: Map::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsStore {
    #[serde(default = "default_weekly")]
    pub weekly: Value,
    #[serde(default = "default_monthly")]
    pub monthly: Value,
    #[serde(default)]
    pub history: Vec<DailySummary>,
    #[serde(default)]
    pub today: Option<DailySummary>,
    /// Keys written by other tools; carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_weekly() -> Value {
    json!({ "days": [] })
}

fn default_monthly() -> Value {
    json!({ "principleCompletion": {} })
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self {
            weekly: default_weekly(),
            monthly: default_monthly(),
            history: Vec::new(),
            today: None,
            extra: Map::new(),
        }
    }
}

impl MetricsStore {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read metrics {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse metrics {}", path.display()))
    }

    /// Replaces the history entry for the summary's date (or appends one) and
    /// points `today` at it.
    pub fn upsert(&mut self, mut summary: DailySummary) {
        match self.history.iter_mut().find(|h| h.date == summary.date) {
            Some(existing) => {
                for (key, value) in std::mem::take(&mut existing.extra) {
                    summary.extra.entry(key).or_insert(value);
                }
                *existing = summary.clone();
            }
            None => self.history.push(summary.clone()),
        }
        self.today = Some(summary);
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        fs::write(path, out).with_context(|| format!("failed to write metrics {}", path.display()))
    }
}
