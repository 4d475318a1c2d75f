use std::path::PathBuf;

use chrono::NaiveDate;

pub const DEFAULT_JOURNALS_DIR: &str = "../obsidian-sync/journals";
pub const DEFAULT_BRIEFINGS_DIR: &str = "../briefings";
pub const DEFAULT_TEMPLATES_DIR: &str = "../templates";
pub const DEFAULT_DASHBOARD_DIR: &str = "../dashboard";

const TEMPLATE_FILE: &str = "briefing.md";
const METRICS_FILE: &str = "metrics.json";

/// Where the generator reads journals/templates and writes briefings/metrics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub journals_dir: PathBuf,
    pub briefings_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub dashboard_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            journals_dir: PathBuf::from(DEFAULT_JOURNALS_DIR),
            briefings_dir: PathBuf::from(DEFAULT_BRIEFINGS_DIR),
            templates_dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
            dashboard_dir: PathBuf::from(DEFAULT_DASHBOARD_DIR),
        }
    }
}

impl Config {
    #[cfg(test)]
    /// Every location under one root, laid out like the default relative paths.
    pub fn rooted_at(root: &std::path::Path) -> Self {
        Self {
            journals_dir: root.join("obsidian-sync").join("journals"),
            briefings_dir: root.join("briefings"),
            templates_dir: root.join("templates"),
            dashboard_dir: root.join("dashboard"),
        }
    }

    /// `<journals>/<YYYY_MM_DD>.md`
    pub fn journal_path(&self, file_key: &str) -> PathBuf {
        self.journals_dir.join(format!("{file_key}.md"))
    }

    pub fn template_path(&self) -> PathBuf {
        self.templates_dir.join(TEMPLATE_FILE)
    }

    /// `<briefings>/<YYYY>/<MM>/<YYYY-MM-DD>.md`
    pub fn briefing_path(&self, date: NaiveDate) -> PathBuf {
        self.briefings_dir
            .join(date.format("%Y").to_string())
            .join(date.format("%m").to_string())
            .join(format!("{}.md", date.format("%Y-%m-%d")))
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.dashboard_dir.join(METRICS_FILE)
    }
}
