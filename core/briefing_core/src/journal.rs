use std::{fs, path::Path, sync::OnceLock};

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::date::TargetDate;

const STRUCTURED_HEADING: &str = "## Structured";
const RAW_INPUT_HEADING: &str = "## Raw Input";

const POSITIVE_MARKERS: &[&str] = &["积极", "😊"];
const NEGATIVE_MARKERS: &[&str] = &["消极", "沮丧", "😔"];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid {field} value '{raw}' in journal")]
    InvalidNumber { field: &'static str, raw: String },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mood {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Mood {
    pub fn label(self) -> &'static str {
        match self {
            Mood::Positive => "积极",
            Mood::Negative => "消极",
            Mood::Neutral => "中性",
        }
    }

    /// Positive markers win over negative ones; anything else is neutral.
    pub fn classify(content: &str) -> Self {
        if POSITIVE_MARKERS.iter().any(|m| content.contains(m)) {
            Mood::Positive
        } else if NEGATIVE_MARKERS.iter().any(|m| content.contains(m)) {
            Mood::Negative
        } else {
            Mood::Neutral
        }
    }
}

/// The three habit checks. Nothing sets them yet; they pass through as-is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principles {
    #[serde(default)]
    pub app: bool,
    #[serde(default)]
    pub margin: bool,
    #[serde(default)]
    pub output: bool,
}

impl Principles {
    pub fn completed(&self) -> usize {
        [self.app, self.margin, self.output]
            .iter()
            .filter(|v| **v)
            .count()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DailyRecord {
    pub date: String,
    pub weekday: &'static str,
    pub sleep: Option<f64>,
    pub exercise: Option<u32>,
    pub mood: Mood,
    pub work: Vec<String>,
    pub insights: Vec<String>,
    pub ai_collab: Vec<String>,
    pub todos: Vec<String>,
    pub thinking_chars: Option<usize>,
    pub principles: Principles,
}

impl DailyRecord {
    pub fn empty(target: &TargetDate) -> Self {
        Self {
            date: target.display.clone(),
            weekday: target.weekday,
            sleep: None,
            exercise: None,
            mood: Mood::default(),
            work: Vec::new(),
            insights: Vec::new(),
            ai_collab: Vec::new(),
            todos: Vec::new(),
            thinking_chars: None,
            principles: Principles::default(),
        }
    }

    pub fn parse(target: &TargetDate, content: &str) -> Result<Self, ExtractError> {
        let mut record = Self::empty(target);

        if let Some(idx) = content.find(STRUCTURED_HEADING) {
            let structured = &content[idx + STRUCTURED_HEADING.len()..];
            let tags = tag_patterns();
            record.work = capture_all(&tags.work, structured);
            record.insights = capture_all(&tags.insight, structured);
            record.ai_collab = capture_all(&tags.ai, structured);
            record.todos = capture_all(&tags.todo, structured);
        }

        record.thinking_chars = raw_input_len(content);
        record.mood = Mood::classify(content);

        record.sleep = match sleep_matchers().first_capture(content) {
            Some(raw) => Some(raw.parse::<f64>().map_err(|_| ExtractError::InvalidNumber {
                field: "sleep",
                raw: raw.to_string(),
            })?),
            None => None,
        };
        record.exercise = match exercise_matchers().first_capture(content) {
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| ExtractError::InvalidNumber {
                field: "exercise",
                raw: raw.to_string(),
            })?),
            None => None,
        };

        Ok(record)
    }
}

/// Reads the journal at `path`, or `None` when there is no file for the day.
pub fn read_journal(path: &Path) -> anyhow::Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read journal {}", path.display()))?;
    Ok(Some(content))
}

/// Patterns tried in order; the first one that matches decides the value.
pub struct RankedMatcher {
    patterns: Vec<Regex>,
}

impl RankedMatcher {
    fn new(patterns: &[&str]) -> Self {
        Self {
            patterns: patterns
                .iter()
                .map(|p| Regex::new(p).expect("static matcher pattern"))
                .collect(),
        }
    }

    pub fn first_capture<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.patterns
            .iter()
            .find_map(|re| re.captures(text))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}

pub fn sleep_matchers() -> &'static RankedMatcher {
    static M: OnceLock<RankedMatcher> = OnceLock::new();
    M.get_or_init(|| {
        RankedMatcher::new(&[
            r"睡眠[:：]\s*([\d.]+)\s*(?:小时|h)",
            r"睡了\s*([\d.]+)\s*(?:个)?小时",
            r"(?i)sleep[:：]?\s*([\d.]+)\s*h",
        ])
    })
}

pub fn exercise_matchers() -> &'static RankedMatcher {
    static M: OnceLock<RankedMatcher> = OnceLock::new();
    M.get_or_init(|| {
        RankedMatcher::new(&[
            r"运动[:：]\s*(\d+)\s*分钟",
            r"锻炼\s*(\d+)\s*分钟",
            r"(?i)exercise[:：]?\s*(\d+)\s*min",
        ])
    })
}

struct TagPatterns {
    work: Regex,
    insight: Regex,
    ai: Regex,
    todo: Regex,
}

fn tag_patterns() -> &'static TagPatterns {
    static P: OnceLock<TagPatterns> = OnceLock::new();
    P.get_or_init(|| {
        // Text after the tag up to " #" or the end of the line.
        let tag = |name: &str| {
            Regex::new(&format!(r"(?mR)\[{name}\] (.+?)(?: #|$)")).expect("static tag pattern")
        };
        TagPatterns {
            work: tag("work"),
            insight: tag("insight"),
            ai: tag("ai"),
            todo: tag("todo"),
        }
    })
}

fn capture_all(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn raw_input_len(content: &str) -> Option<usize> {
    let start = content.find(RAW_INPUT_HEADING)? + RAW_INPUT_HEADING.len();
    let end = content[start..].find(STRUCTURED_HEADING)? + start;
    Some(content[start..end].trim().chars().count())
}
