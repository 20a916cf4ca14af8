// View ordering for tasks

use crate::models::Task;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    None,
    Date,
    Priority,
    Category,
}

impl SortMode {
    /// Sort tasks in place. The sort is stable, so ties keep insertion order.
    pub fn apply(self, tasks: &mut [&Task]) {
        match self {
            SortMode::None => {}
            SortMode::Date => tasks.sort_by_key(|t| due_date_key(t)),
            SortMode::Priority => tasks.sort_by_key(|t| t.priority.rank()),
            SortMode::Category => tasks.sort_by(|a, b| a.category.cmp(&b.category)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::None => "none",
            SortMode::Date => "date",
            SortMode::Priority => "priority",
            SortMode::Category => "category",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(SortMode::None),
            "date" => Ok(SortMode::Date),
            "priority" => Ok(SortMode::Priority),
            "category" => Ok(SortMode::Category),
            other => Err(format!(
                "unknown sort '{}' (expected none, date, priority or category)",
                other
            )),
        }
    }
}

/// Parse a due date as entered by a date picker (YYYY-MM-DD) or as an
/// RFC 3339 timestamp
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

// Missing and unparseable dates map to None, which orders before every Some
fn due_date_key(task: &Task) -> Option<NaiveDate> {
    task.due_date.as_deref().and_then(parse_due_date)
}
