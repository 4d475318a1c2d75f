use std::{collections::HashMap, fs, path::Path, sync::OnceLock};

use anyhow::Context;
use chrono::NaiveDateTime;
use regex::{Captures, Regex};

use crate::journal::{DailyRecord, Mood};

const NO_RECORD: &str = "- 无记录";
const NO_TODO: &str = "- [ ] 暂无待办";
const NOT_RECORDED: &str = "未记录";
const NO_SLEEP_RATING: &str = "➖";
const STAR: &str = "⭐";
const TOMORROW_FOCUS_LIMIT: usize = 3;

// Streak counters are not derived from history yet.
const STREAK_DAYS_PLACEHOLDER: &str = "0";
const TOTAL_DAYS_PLACEHOLDER: &str = "0";

pub const DEFAULT_TEMPLATE: &str = "# 📋 生活简报 | {{date}} {{weekday}}

## 🌙 身体状态
- **睡眠**: {{sleep_rating}} {{sleep_hours}}
- **睡眠详情**: {{sleep_detail}}
- **运动**: {{exercise_detail}}
- **情绪**: {{mood_emoji}} {{mood_text}}

## 💼 工作
{{work_items}}

## 💡 洞察
{{insights}}

## 🤖 AI 协作
{{ai_collaboration}}

## 📦 今日产出
{{outputs}}

## 🎯 明日聚焦
{{tomorrow_focus}}

## 📐 三条原则
- 完成: {{principles_completed}}/3 {{principles_status}}

## 🔥 连续记录
- 连续: {{streak_days}} 天 | 累计: {{total_days}} 天

---
*生成时间: {{timestamp}}*
";

/// Loads the template file, or the built-in one when the file is absent.
pub fn load_template(path: &Path) -> anyhow::Result<String> {
    if !path.exists() {
        tracing::info!("No template at {}, using built-in", path.display());
        return Ok(DEFAULT_TEMPLATE.to_string());
    }
    fs::read_to_string(path).with_context(|| format!("failed to read template {}", path.display()))
}

pub fn render(template: &str, record: &DailyRecord, generated_at: NaiveDateTime) -> String {
    let completed = record.principles.completed();
    let values: HashMap<&str, String> = HashMap::from([
        ("date", record.date.clone()),
        ("weekday", record.weekday.to_string()),
        ("sleep_rating", sleep_rating(record.sleep)),
        (
            "sleep_hours",
            record
                .sleep
                .filter(|h| *h != 0.0)
                .map(|h| format!("({}h)", fmt_hours(h)))
                .unwrap_or_default(),
        ),
        (
            "sleep_detail",
            record
                .sleep
                .map(|h| format!("{} 小时", fmt_hours(h)))
                .unwrap_or_else(|| NOT_RECORDED.to_string()),
        ),
        (
            "exercise_detail",
            record
                .exercise
                .map(|m| format!("{m} 分钟"))
                .unwrap_or_else(|| NOT_RECORDED.to_string()),
        ),
        ("mood_emoji", mood_emoji(record.mood).to_string()),
        ("mood_text", record.mood.label().to_string()),
        ("work_items", bullets(record.work.iter().map(|s| s.to_string()))),
        (
            "insights",
            bullets(record.insights.iter().map(|s| format!("**洞察**: {s}"))),
        ),
        (
            "ai_collaboration",
            bullets(record.ai_collab.iter().map(|s| s.to_string())),
        ),
        ("outputs", outputs(record)),
        ("tomorrow_focus", tomorrow_focus(&record.todos)),
        ("principles_completed", completed.to_string()),
        (
            "principles_status",
            (if completed == 3 { "✅" } else { "⚠️" }).to_string(),
        ),
        ("streak_days", STREAK_DAYS_PLACEHOLDER.to_string()),
        ("total_days", TOTAL_DAYS_PLACEHOLDER.to_string()),
        (
            "timestamp",
            generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ),
    ]);

    // One pass over the template, so values that contain `{{...}}` stay literal.
    placeholder_pattern()
        .replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn placeholder_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("static placeholder pattern"))
}

/// Star count for a night's sleep, `None` when sleep was not recorded.
pub fn sleep_stars(hours: Option<f64>) -> Option<usize> {
    let h = hours?;
    Some(if h >= 7.5 {
        5
    } else if h >= 7.0 {
        4
    } else if h >= 6.0 {
        3
    } else if h >= 5.0 {
        2
    } else {
        1
    })
}

fn sleep_rating(hours: Option<f64>) -> String {
    match sleep_stars(hours) {
        Some(n) => STAR.repeat(n),
        None => NO_SLEEP_RATING.to_string(),
    }
}

fn mood_emoji(mood: Mood) -> &'static str {
    match mood {
        Mood::Positive => "😊",
        Mood::Negative => "😔",
        Mood::Neutral => "😐",
    }
}

fn fmt_hours(h: f64) -> String {
    if h.fract() == 0.0 {
        format!("{h:.1}")
    } else {
        format!("{h}")
    }
}

fn bullets(items: impl Iterator<Item = String>) -> String {
    let lines: Vec<String> = items.map(|s| format!("- {s}")).collect();
    if lines.is_empty() {
        NO_RECORD.to_string()
    } else {
        lines.join("\n")
    }
}

fn outputs(record: &DailyRecord) -> String {
    bullets(
        record
            .work
            .iter()
            .map(|s| format!("[工作] {s}"))
            .chain(record.ai_collab.iter().map(|s| format!("[AI协作] {s}"))),
    )
}

fn tomorrow_focus(todos: &[String]) -> String {
    if todos.is_empty() {
        return NO_TODO.to_string();
    }
    todos
        .iter()
        .take(TOMORROW_FOCUS_LIMIT)
        .map(|s| format!("- [ ] {s}"))
        .collect::<Vec<_>>()
        .join("\n")
}
