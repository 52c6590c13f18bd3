use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies entities that expose a stable identifier.
pub trait Identifiable {
    type Id: Copy + Eq;

    fn id(&self) -> Self::Id;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Calendar unit used for bucketing and rolling windows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    /// Length of one unit when a rolling window is measured back from today.
    /// Months and years are approximated as 30 and 365 days.
    pub fn approx_days(&self) -> i64 {
        match self {
            TimeUnit::Day => 1,
            TimeUnit::Week => 7,
            TimeUnit::Month => 30,
            TimeUnit::Year => 365,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "day" | "days" | "daily" => Some(TimeUnit::Day),
            "week" | "weeks" | "weekly" => Some(TimeUnit::Week),
            "month" | "months" | "monthly" => Some(TimeUnit::Month),
            "year" | "years" | "yearly" => Some(TimeUnit::Year),
            _ => None,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeUnit::Day => "Day",
            TimeUnit::Week => "Week",
            TimeUnit::Month => "Month",
            TimeUnit::Year => "Year",
        };
        f.write_str(label)
    }
}

/// Direction in which report rows are listed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "a" | "asc" | "ascending" => Some(SortOrder::Ascending),
            "d" | "desc" | "descending" => Some(SortOrder::Descending),
            _ => None,
        }
    }
}
