use std::{fs, path::PathBuf};

use anyhow::Context;
use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::{
    config::Config,
    date::TargetDate,
    journal::{self, DailyRecord},
    metrics::{DailySummary, MetricsStore},
    render,
};

#[derive(Debug)]
pub struct RunReport {
    pub date: String,
    pub journal_found: bool,
    pub briefing_path: PathBuf,
    pub metrics_path: PathBuf,
}

pub struct BriefingGenerator {
    config: Config,
    target: TargetDate,
}

impl BriefingGenerator {
    pub fn new(config: Config, target: TargetDate) -> Self {
        Self { config, target }
    }

    /// Journal contents for the target day; an empty record when there is no journal.
    pub fn extract(&self) -> anyhow::Result<(DailyRecord, bool)> {
        let path = self.config.journal_path(&self.target.file_key);
        match journal::read_journal(&path)? {
            Some(content) => Ok((DailyRecord::parse(&self.target, &content)?, true)),
            None => {
                warn!("No journal found for {} at {}", self.target.display, path.display());
                Ok((DailyRecord::empty(&self.target), false))
            }
        }
    }

    pub fn render(&self, record: &DailyRecord, generated_at: NaiveDateTime) -> anyhow::Result<String> {
        let template = render::load_template(&self.config.template_path())?;
        Ok(render::render(&template, record, generated_at))
    }

    pub fn save_briefing(&self, content: &str) -> anyhow::Result<PathBuf> {
        let path = self.config.briefing_path(self.target.date);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        }
        fs::write(&path, content)
            .with_context(|| format!("failed to write briefing {}", path.display()))?;
        info!("Briefing saved to {}", path.display());
        Ok(path)
    }

    pub fn update_metrics(&self, record: &DailyRecord) -> anyhow::Result<PathBuf> {
        let path = self.config.metrics_path();
        let mut store = MetricsStore::load(&path)?;
        store.upsert(DailySummary::from_record(record));
        store.save(&path)?;
        info!(
            "Metrics updated at {} ({} days of history)",
            path.display(),
            store.history.len()
        );
        Ok(path)
    }

    pub fn run(&self, generated_at: NaiveDateTime) -> anyhow::Result<RunReport> {
        info!("Generating briefing for {} {}", self.target.display, self.target.weekday);

        let (record, journal_found) = self.extract()?;
        let briefing = self.render(&record, generated_at)?;
        let briefing_path = self.save_briefing(&briefing)?;
        let metrics_path = self.update_metrics(&record)?;

        Ok(RunReport {
            date: self.target.display.clone(),
            journal_found,
            briefing_path,
            metrics_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::DayMode;
    use chrono::NaiveDate;
    use std::path::Path;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn write_journal(cfg: &Config, file_key: &str, body: &str) {
        fs::create_dir_all(&cfg.journals_dir).unwrap();
        fs::write(cfg.journal_path(file_key), body).unwrap();
    }

    fn strip_timestamp(s: &str) -> String {
        s.lines()
            .filter(|l| !l.contains("生成时间"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn generator(root: &Path, date: NaiveDate) -> BriefingGenerator {
        BriefingGenerator::new(Config::rooted_at(root), TargetDate::new(date))
    }

    #[test]
    fn runs_without_journal() {
        let dir = tempfile::tempdir().unwrap();
        let report = generator(dir.path(), day(15)).run(at(15, 22)).unwrap();
        assert!(!report.journal_found);

        let briefing = fs::read_to_string(&report.briefing_path).unwrap();
        assert!(report.briefing_path.ends_with("briefings/2026/02/2026-02-15.md"));
        assert!(briefing.contains("- 无记录"));
        assert!(briefing.contains("😐 中性"));
        assert!(!briefing.contains("{{"));

        let store = MetricsStore::load(&report.metrics_path).unwrap();
        assert_eq!(store.history.len(), 1);
        assert_eq!(store.today.unwrap().mood, "中性");
    }

    #[test]
    fn full_journal_flows_into_briefing_and_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::rooted_at(dir.path());
        write_journal(
            &cfg,
            "2026_02_15",
            "## Raw Input\n今天很积极 😊\n睡眠: 6.5小时\n运动: 45分钟\n\n## Structured\n[work] shipped feature X #done\n[insight] sleep matters #note\n[ai] refactor with assistant\n[todo] plan week\n",
        );

        let report = BriefingGenerator::new(cfg, TargetDate::new(day(15)))
            .run(at(15, 22))
            .unwrap();
        assert!(report.journal_found);

        let briefing = fs::read_to_string(&report.briefing_path).unwrap();
        assert!(briefing.contains("⭐⭐⭐ (6.5h)"));
        assert!(briefing.contains("45 分钟"));
        assert!(briefing.contains("😊 积极"));
        assert!(briefing.contains("- [工作] shipped feature X\n- [AI协作] refactor with assistant"));
        assert!(briefing.contains("- [ ] plan week"));

        let today = MetricsStore::load(&report.metrics_path).unwrap().today.unwrap();
        assert_eq!(today.sleep, Some(6.5));
        assert_eq!(today.exercise, Some(45));
        assert!(today.thinking > 0);
    }

    #[test]
    fn template_file_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::rooted_at(dir.path());
        fs::create_dir_all(&cfg.templates_dir).unwrap();
        fs::write(cfg.template_path(), "{{date}} {{weekday}} {{mood_text}}").unwrap();

        let report = BriefingGenerator::new(cfg, TargetDate::new(day(15)))
            .run(at(15, 22))
            .unwrap();
        let briefing = fs::read_to_string(&report.briefing_path).unwrap();
        assert_eq!(briefing, "2026-02-15 周日 中性");
    }

    #[test]
    fn reruns_are_stable_and_never_duplicate_history() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::rooted_at(dir.path());
        write_journal(&cfg, "2026_02_14", "## Structured\n[work] a\n");
        write_journal(&cfg, "2026_02_15", "## Structured\n[work] b\n睡眠: 8小时\n");

        let first = generator(dir.path(), day(15)).run(at(15, 21)).unwrap();
        let first_body = fs::read_to_string(&first.briefing_path).unwrap();

        generator(dir.path(), day(14)).run(at(15, 21)).unwrap();
        let again = generator(dir.path(), day(15)).run(at(15, 23)).unwrap();
        let again_body = fs::read_to_string(&again.briefing_path).unwrap();

        assert_eq!(strip_timestamp(&first_body), strip_timestamp(&again_body));

        let store = MetricsStore::load(&again.metrics_path).unwrap();
        let dates: Vec<_> = store.history.iter().map(|h| h.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-02-15", "2026-02-14"]);
        assert_eq!(store.today.unwrap().date, "2026-02-15");
    }

    #[test]
    fn yesterday_reads_previous_journal() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::rooted_at(dir.path());
        write_journal(&cfg, "2026_02_28", "## Structured\n[insight] end of month\n");

        let target = TargetDate::resolve(DayMode::Yesterday, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        let (record, found) = BriefingGenerator::new(cfg, target).extract().unwrap();
        assert!(found);
        assert_eq!(record.insights, vec!["end of month"]);
    }

    #[test]
    fn malformed_sleep_value_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::rooted_at(dir.path());
        write_journal(&cfg, "2026_02_15", "睡眠: 7..5小时\n");
        let err = generator(dir.path(), day(15)).run(at(15, 22)).unwrap_err();
        assert!(err.downcast_ref::<journal::ExtractError>().is_some());
        assert!(!cfg.metrics_path().exists());
    }
}
