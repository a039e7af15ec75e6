//! View projection: sorted/filtered read-only view over the store's tasks.
//!
//! Nothing here owns tasks. `project` borrows the canonical list and returns
//! references in display order, leaving the input untouched.

use crate::task::{Task, TaskStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn ascending(key: SortKey) -> Self {
        Self { key, direction: SortDirection::Ascending }
    }

    pub fn descending(key: SortKey) -> Self {
        Self { key, direction: SortDirection::Descending }
    }
}

/// Per-key sort toggle.
///
/// unset -> ascending -> descending -> ascending -> ...
/// Activating another key leaves the old key unset and starts the new one ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    active: Option<SortConfig>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(config: SortConfig) -> Self {
        Self { active: Some(config) }
    }

    pub fn request_sort(&mut self, key: SortKey) {
        let direction = match self.active {
            Some(c) if c.key == key && c.direction == SortDirection::Ascending => {
                SortDirection::Descending
            }
            _ => SortDirection::Ascending,
        };
        self.active = Some(SortConfig { key, direction });
    }

    pub fn config(&self) -> Option<SortConfig> {
        self.active
    }

    /// Direction for `key`, or None when that key is unset.
    pub fn direction_of(&self, key: SortKey) -> Option<SortDirection> {
        self.active.filter(|c| c.key == key).map(|c| c.direction)
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(s) => task.status == *s,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("All"),
            StatusFilter::Only(s) => f.write_str(s.as_str()),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = crate::task::UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "show all" => Ok(StatusFilter::All),
            _ => s.parse::<TaskStatus>().map(StatusFilter::Only),
        }
    }
}

/// Sort key for a date string. Unparseable or empty dates sort earliest.
pub fn date_rank(date: &str) -> i64 {
    parse_timestamp(date).unwrap_or(i64::MIN)
}

/// Milliseconds since the epoch. Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc().timestamp_millis())
}

fn compare(a: &Task, b: &Task, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => date_rank(&a.date).cmp(&date_rank(&b.date)),
    }
}

pub fn project<'a>(
    tasks: &'a [Task],
    sort: Option<SortConfig>,
    filter: StatusFilter,
) -> Vec<&'a Task> {
    let mut out: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t)).collect();

    if let Some(cfg) = sort {
        // sort_by is stable; reversing the comparator (not the output) keeps ties in store order
        out.sort_by(|a, b| match cfg.direction {
            SortDirection::Ascending => compare(a, b, cfg.key),
            SortDirection::Descending => compare(b, a, cfg.key),
        });
    }

    out
}

/// Ephemeral view parameters for one list view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    pub sort: SortState,
    pub filter: StatusFilter,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        project(tasks, self.sort.config(), self.filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<'a>(tasks: &[&'a Task]) -> Vec<&'a str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    fn sample() -> Vec<Task> {
        vec![
            Task::new("a", "alpha").with_date("2024-01-01"),
            Task::new("b", "beta").with_date("2024-03-01").with_status(TaskStatus::Completed),
            Task::new("c", "gamma").with_date("not a date"),
            Task::new("d", "delta").with_date("2024-02-01").with_status(TaskStatus::InProgress),
        ]
    }

    #[test]
    fn toggle_descending_then_ascending() {
        let tasks = vec![
            Task::new("A", "first").with_date("2024-01-01"),
            Task::new("B", "second").with_date("2024-03-01"),
        ];
        let mut view = ViewState::new();

        view.sort.request_sort(SortKey::Date);
        view.sort.request_sort(SortKey::Date);
        assert_eq!(view.sort.direction_of(SortKey::Date), Some(SortDirection::Descending));
        assert_eq!(ids(&view.project(&tasks)), vec!["B", "A"]);

        view.sort.request_sort(SortKey::Date);
        assert_eq!(ids(&view.project(&tasks)), vec!["A", "B"]);
    }

    #[test]
    fn sort_state_machine_starts_unset() {
        let mut s = SortState::new();
        assert_eq!(s.config(), None);
        s.request_sort(SortKey::Date);
        assert_eq!(s.config(), Some(SortConfig::ascending(SortKey::Date)));
        s.request_sort(SortKey::Date);
        assert_eq!(s.config(), Some(SortConfig::descending(SortKey::Date)));
        s.request_sort(SortKey::Date);
        assert_eq!(s.config(), Some(SortConfig::ascending(SortKey::Date)));
        s.clear();
        assert_eq!(s.direction_of(SortKey::Date), None);
    }

    #[test]
    fn unparseable_dates_sort_earliest() {
        let tasks = sample();
        let asc = project(&tasks, Some(SortConfig::ascending(SortKey::Date)), StatusFilter::All);
        assert_eq!(ids(&asc), vec!["c", "a", "d", "b"]);

        let desc = project(&tasks, Some(SortConfig::descending(SortKey::Date)), StatusFilter::All);
        assert_eq!(ids(&desc), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn ties_keep_store_order_in_both_directions() {
        let tasks = vec![
            Task::new("x", "one").with_date("2024-05-05"),
            Task::new("y", "two").with_date("2024-05-05"),
            Task::new("z", "three").with_date(""),
            Task::new("w", "four").with_date("garbage"),
        ];
        let asc = project(&tasks, Some(SortConfig::ascending(SortKey::Date)), StatusFilter::All);
        assert_eq!(ids(&asc), vec!["z", "w", "x", "y"]);
        let desc = project(&tasks, Some(SortConfig::descending(SortKey::Date)), StatusFilter::All);
        assert_eq!(ids(&desc), vec!["x", "y", "z", "w"]);
    }

    #[test]
    fn sorting_is_idempotent() {
        let tasks = sample();
        let cfg = Some(SortConfig::ascending(SortKey::Date));
        let once: Vec<Task> = project(&tasks, cfg, StatusFilter::All).into_iter().cloned().collect();
        let twice = project(&once, cfg, StatusFilter::All);
        assert_eq!(ids(&twice), once.iter().map(|t| t.id.as_str()).collect::<Vec<_>>());
    }

    #[test]
    fn filter_keeps_only_matching_status() {
        let tasks = sample();
        for status in TaskStatus::ALL {
            let out = project(&tasks, None, StatusFilter::Only(status));
            assert!(out.iter().all(|t| t.status == status));
        }
        assert_eq!(project(&tasks, None, StatusFilter::All).len(), tasks.len());
    }

    #[test]
    fn unsorted_projection_keeps_store_order_and_input() {
        let tasks = sample();
        let snapshot = tasks.clone();
        let out = project(&tasks, None, StatusFilter::All);
        assert_eq!(ids(&out), vec!["a", "b", "c", "d"]);

        let _ = project(&tasks, Some(SortConfig::descending(SortKey::Date)), StatusFilter::All);
        assert_eq!(tasks, snapshot);
    }

    #[test]
    fn parses_supported_date_forms() {
        let day = parse_timestamp("2024-01-01").unwrap();
        assert_eq!(parse_timestamp("2024-01-01T00:00:00Z"), Some(day));
        assert_eq!(parse_timestamp("2024-01-01T00:00:00"), Some(day));
        assert_eq!(parse_timestamp("2024-01-01 00:00:00.000"), Some(day));
        assert!(parse_timestamp("2024-01-01T10:00:00+02:00").unwrap() > day);
        assert_eq!(parse_timestamp("28.05."), None);
        assert_eq!(date_rank(""), i64::MIN);
    }

    #[test]
    fn status_filter_parses_sentinel_and_names() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("Show All".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "completed".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(TaskStatus::Completed)
        );
        assert!("later".parse::<StatusFilter>().is_err());
    }
}
