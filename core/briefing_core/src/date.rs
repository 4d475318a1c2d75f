use chrono::{Datelike, Duration, NaiveDate};

const WEEKDAYS: [&str; 7] = ["周一", "周二", "周三", "周四", "周五", "周六", "周日"];

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DayMode {
    #[default]
    Today,
    Yesterday,
}

/// The calendar day a run is generated for, with its string renderings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetDate {
    pub date: NaiveDate,
    /// `YYYY-MM-DD`
    pub display: String,
    /// `YYYY_MM_DD`, used for journal file names.
    pub file_key: String,
    pub weekday: &'static str,
}

impl TargetDate {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            display: date.format("%Y-%m-%d").to_string(),
            file_key: date.format("%Y_%m_%d").to_string(),
            weekday: WEEKDAYS[date.weekday().num_days_from_monday() as usize],
        }
    }

    pub fn resolve(mode: DayMode, today: NaiveDate) -> Self {
        let date = match mode {
            DayMode::Today => today,
            DayMode::Yesterday => today - Duration::days(1),
        };
        Self::new(date)
    }
}
