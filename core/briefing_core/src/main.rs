mod config;
mod date;
mod generator;
mod journal;
mod metrics;
mod render;

use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use tracing::info;

use crate::{
    config::{
        Config, DEFAULT_BRIEFINGS_DIR, DEFAULT_DASHBOARD_DIR, DEFAULT_JOURNALS_DIR,
        DEFAULT_TEMPLATES_DIR,
    },
    date::{DayMode, TargetDate},
    generator::BriefingGenerator,
};

#[derive(Parser, Debug)]
#[command(name = "briefing_core", version)]
struct Args {
    /// Which day to generate the briefing for.
    #[arg(long, value_enum, default_value_t = DayMode::Today)]
    day: DayMode,

    /// Directory of daily journals named `YYYY_MM_DD.md`.
    #[arg(long, default_value = DEFAULT_JOURNALS_DIR)]
    journals_dir: PathBuf,

    /// Output root; briefings land in `<dir>/YYYY/MM/YYYY-MM-DD.md`.
    #[arg(long, default_value = DEFAULT_BRIEFINGS_DIR)]
    briefings_dir: PathBuf,

    /// Directory holding `briefing.md`. The built-in template is used when it is missing.
    #[arg(long, default_value = DEFAULT_TEMPLATES_DIR)]
    templates_dir: PathBuf,

    /// Directory holding the dashboard `metrics.json`.
    #[arg(long, default_value = DEFAULT_DASHBOARD_DIR)]
    dashboard_dir: PathBuf,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            journals_dir: self.journals_dir.clone(),
            briefings_dir: self.briefings_dir.clone(),
            templates_dir: self.templates_dir.clone(),
            dashboard_dir: self.dashboard_dir.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "briefing_core=info".into()),
        )
        .init();

    let args = Args::parse();
    let now = Local::now().naive_local();
    let target = TargetDate::resolve(args.day, now.date());

    let report = BriefingGenerator::new(args.config(), target).run(now)?;
    if !report.journal_found {
        info!("Briefing for {} was generated from an empty journal", report.date);
    }
    info!(
        "Done! briefing={} metrics={}",
        report.briefing_path.display(),
        report.metrics_path.display()
    );
    Ok(())
}
