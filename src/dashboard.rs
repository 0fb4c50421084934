use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{Issue, Role, Session};

pub const CALENDAR_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const CLOSED_STATUS: &str = "Closed";

#[derive(Debug, Clone, Default)]
pub struct DashboardSummary {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    pub estimated_hours: f64,
    pub by_status: Vec<(String, usize)>,
    pub by_priority: Vec<(String, usize)>,
    pub by_client: Vec<(String, usize)>,
    pub by_year: Vec<(i32, usize)>,
    pub by_month: [usize; 12],
    pub by_quarter: [usize; 4],
    pub by_weekday: [usize; 7],
}

impl DashboardSummary {
    /// Recomputed from scratch on every call; issues without a usable
    /// reported date still count toward the totals and distributions but
    /// skip the date-keyed groupings.
    pub fn compute(issues: &[Issue], session: &Session) -> Self {
        let mut summary = Self {
            total: issues.len(),
            ..Self::default()
        };

        let mut by_status: HashMap<String, usize> = HashMap::new();
        let mut by_priority: HashMap<String, usize> = HashMap::new();
        let mut by_client: HashMap<String, usize> = HashMap::new();
        let mut by_year: HashMap<i32, usize> = HashMap::new();

        for issue in issues {
            if issue.status == CLOSED_STATUS {
                summary.closed += 1;
            } else {
                summary.open += 1;
            }

            *by_status.entry(issue.status.clone()).or_insert(0) += 1;
            *by_priority.entry(issue.priority.clone()).or_insert(0) += 1;
            let client = if issue.client.is_empty() {
                "Unassigned".to_string()
            } else {
                issue.client.clone()
            };
            *by_client.entry(client).or_insert(0) += 1;

            if let Some(date) = issue.reported_date() {
                *by_year.entry(date.year()).or_insert(0) += 1;
                summary.by_month[date.month0() as usize] += 1;
                summary.by_quarter[date.month0() as usize / 3] += 1;
                summary.by_weekday[date.weekday().num_days_from_sunday() as usize] += 1;
            }
        }

        // Estimated hours only mean something for roles that work the queue.
        if !matches!(session.role, Role::Admin | Role::Client) {
            summary.estimated_hours = issues.iter().map(Issue::estimated_hours).sum();
        }

        summary.by_status = sorted_distribution(by_status);
        summary.by_priority = sorted_distribution(by_priority);
        summary.by_client = sorted_distribution(by_client);

        let mut by_year: Vec<(i32, usize)> = by_year.into_iter().collect();
        by_year.sort_by_key(|(year, _)| *year);
        summary.by_year = by_year;

        summary
    }
}

fn sorted_distribution(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

/// Issue counts for each of the trailing `days` dates, oldest first.
pub fn daily_trend(issues: &[Issue], today: NaiveDate, days: u32) -> Vec<(NaiveDate, usize)> {
    (0..i64::from(days))
        .rev()
        .map(|offset| {
            let day = today - Duration::days(offset);
            let count = issues
                .iter()
                .filter(|issue| issue.reported_date() == Some(day))
                .count();
            (day, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn admin() -> Session {
        Session {
            role: Role::Admin,
            username: "root".to_string(),
            company: None,
        }
    }

    fn engineer() -> Session {
        Session {
            role: Role::User,
            username: "Alice".to_string(),
            company: None,
        }
    }

    fn sample_issue(reported: &str, status: &str, priority: &str, estimated: &str) -> Issue {
        Issue {
            date_reported: Some(reported.to_string()),
            status: status.to_string(),
            priority: priority.to_string(),
            estimated_time: (!estimated.is_empty()).then(|| json!(estimated)),
            ..Issue::default()
        }
    }

    #[test]
    fn splits_open_and_closed() {
        let issues = vec![
            sample_issue("2024-05-10", "Open", "High", ""),
            sample_issue("2024-05-11", "In Progress", "Low", ""),
            sample_issue("2024-05-12", "Closed", "High", ""),
        ];
        let summary = DashboardSummary::compute(&issues, &admin());

        assert_eq!(summary.total, 3);
        assert_eq!(summary.open, 2);
        assert_eq!(summary.closed, 1);
    }

    #[test]
    fn distributions_sort_by_count_then_name() {
        let issues = vec![
            sample_issue("2024-05-10", "Open", "High", ""),
            sample_issue("2024-05-11", "Open", "Low", ""),
            sample_issue("2024-05-12", "Closed", "Low", ""),
            sample_issue("2024-05-13", "Resolved", "Medium", ""),
        ];
        let summary = DashboardSummary::compute(&issues, &admin());

        assert_eq!(summary.by_status[0], ("Open".to_string(), 2));
        assert_eq!(summary.by_status[1], ("Closed".to_string(), 1));
        assert_eq!(summary.by_status[2], ("Resolved".to_string(), 1));
        assert_eq!(summary.by_priority[0], ("Low".to_string(), 2));
    }

    #[test]
    fn date_buckets_follow_the_calendar() {
        let issues = vec![
            // 2024-05-15 is a Wednesday in Q2.
            sample_issue("2024-05-15", "Open", "High", ""),
            sample_issue("2023-11-02", "Open", "High", ""),
            Issue::default(),
        ];
        let summary = DashboardSummary::compute(&issues, &admin());

        assert_eq!(summary.by_year, vec![(2023, 1), (2024, 1)]);
        assert_eq!(summary.by_month[4], 1);
        assert_eq!(summary.by_month[10], 1);
        assert_eq!(summary.by_quarter, [0, 1, 0, 1]);
        assert_eq!(summary.by_weekday[3], 1);
        assert_eq!(summary.by_weekday[4], 1);
        // The undated issue still counts overall.
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_month.iter().sum::<usize>(), 2);
    }

    #[test]
    fn estimated_hours_are_role_gated() {
        let issues = vec![
            sample_issue("2024-05-10", "Open", "High", "3"),
            sample_issue("2024-05-11", "Open", "High", "2.5"),
        ];

        let for_engineer = DashboardSummary::compute(&issues, &engineer());
        assert!((for_engineer.estimated_hours - 5.5).abs() < 0.001);

        let for_admin = DashboardSummary::compute(&issues, &admin());
        assert_eq!(for_admin.estimated_hours, 0.0);
    }

    #[test]
    fn blank_clients_group_as_unassigned() {
        let mut issue = sample_issue("2024-05-10", "Open", "High", "");
        issue.client = String::new();
        let summary = DashboardSummary::compute(&[issue], &admin());
        assert_eq!(summary.by_client, vec![("Unassigned".to_string(), 1)]);
    }

    #[test]
    fn trend_counts_each_trailing_day() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 12).expect("valid date");
        let issues = vec![
            sample_issue("2024-05-12", "Open", "High", ""),
            sample_issue("2024-05-10", "Open", "High", ""),
            sample_issue("2024-05-10", "Closed", "Low", ""),
            sample_issue("2024-04-01", "Open", "High", ""),
        ];

        let trend = daily_trend(&issues, today, 3);
        assert_eq!(
            trend,
            vec![
                (NaiveDate::from_ymd_opt(2024, 5, 10).expect("valid date"), 2),
                (NaiveDate::from_ymd_opt(2024, 5, 11).expect("valid date"), 0),
                (today, 1),
            ]
        );
    }
}
