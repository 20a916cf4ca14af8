// View filtering for tasks

use crate::models::{Priority, Task};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which tasks the view shows
///
/// `None` is the startup mode and deliberately shows nothing until the user
/// picks a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    None,
    All,
    Active,
    Completed,
    High,
}

impl FilterMode {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            FilterMode::None => false,
            FilterMode::All => true,
            FilterMode::Active => !task.completed,
            FilterMode::Completed => task.completed,
            FilterMode::High => task.priority == Priority::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::None => "none",
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Completed => "completed",
            FilterMode::High => "high",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(FilterMode::None),
            "all" => Ok(FilterMode::All),
            "active" => Ok(FilterMode::Active),
            "completed" => Ok(FilterMode::Completed),
            "high" | "high-priority" => Ok(FilterMode::High),
            other => Err(format!(
                "unknown filter '{}' (expected none, all, active, completed or high)",
                other
            )),
        }
    }
}
