use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::required;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deadline {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl Deadline {
    /// Parsed `due_date`. Accepts a bare calendar date or an RFC 3339 timestamp
    /// (taken in UTC).
    pub fn due_date(&self) -> Option<NaiveDate> {
        parse_due_date(&self.due_date)
    }

    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.due_date().is_some_and(|due| due < today)
    }

    pub fn days_left(&self, today: NaiveDate) -> Option<i64> {
        self.due_date().map(|due| (due - today).num_days())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeadlineRequest {
    pub title: String,
    pub description: String,
    pub due_date: String,
}

impl NewDeadlineRequest {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        required(&[
            ("title", &self.title),
            ("description", &self.description),
            ("dueDate", &self.due_date),
        ])
    }
}

/// A deadline plus how it relates to today, for listing views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineStatus {
    #[serde(flatten)]
    pub deadline: Deadline,
    pub past: bool,
    pub days_left: Option<i64>,
}

impl DeadlineStatus {
    pub fn new(deadline: Deadline, today: NaiveDate) -> Self {
        Self {
            past: deadline.is_past(today),
            days_left: deadline.days_left(today),
            deadline,
        }
    }
}

pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

/// Stable ascending sort by due date. Entries whose date does not parse go
/// last and keep their relative order.
pub fn sort_by_due_date(deadlines: &mut [Deadline]) {
    deadlines.sort_by(|a, b| match (a.due_date(), b.due_date()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deadline(id: &str, due: &str) -> Deadline {
        Deadline {
            id: id.to_string(),
            title: format!("deadline {}", id),
            description: String::new(),
            due_date: due.to_string(),
            completed: None,
        }
    }

    #[test]
    fn test_parse_due_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 9, 5);
        assert_eq!(parse_due_date("2023-09-05"), expected);
        assert_eq!(parse_due_date("2023-09-05T10:00:00Z"), expected);
        assert_eq!(parse_due_date("2023-09-05T01:00:00+02:00"), NaiveDate::from_ymd_opt(2023, 9, 4));
        assert_eq!(parse_due_date("next tuesday"), None);
    }

    #[test]
    fn test_sort_puts_unparseable_last() {
        let mut list = vec![
            deadline("a", "soon"),
            deadline("b", "2023-10-10"),
            deadline("c", "later"),
            deadline("d", "2023-09-05"),
        ];
        sort_by_due_date(&mut list);

        let ids: Vec<&str> = list.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let mut list = vec![
            deadline("first", "2023-09-05"),
            deadline("early", "2023-09-01"),
            deadline("second", "2023-09-05"),
        ];
        sort_by_due_date(&mut list);

        let ids: Vec<&str> = list.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "first", "second"]);
    }

    #[test]
    fn test_status_relative_to_today() {
        let today = NaiveDate::from_ymd_opt(2023, 9, 10).unwrap();

        let past = DeadlineStatus::new(deadline("p", "2023-09-05"), today);
        assert!(past.past);
        assert_eq!(past.days_left, Some(-5));

        let due_today = DeadlineStatus::new(deadline("t", "2023-09-10"), today);
        assert!(!due_today.past);
        assert_eq!(due_today.days_left, Some(0));

        let unknown = DeadlineStatus::new(deadline("u", "tbd"), today);
        assert!(!unknown.past);
        assert_eq!(unknown.days_left, None);
    }

    #[test]
    fn test_completed_is_omitted_when_absent() {
        let json = serde_json::to_value(deadline("1", "2023-09-05")).unwrap();
        assert_eq!(json["dueDate"], "2023-09-05");
        assert!(json.get("completed").is_none());
    }

    #[test]
    fn test_missing_fields() {
        let req = NewDeadlineRequest {
            title: "Quiz".to_string(),
            description: "  ".to_string(),
            due_date: String::new(),
        };
        assert_eq!(req.missing_fields(), vec!["description", "dueDate"]);
    }
}
