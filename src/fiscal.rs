use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{EmployeeSummary, Issue};

/// Column labels for the pivot, April first.
pub const FINANCIAL_MONTHS: [&str; 12] = [
    "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec", "Jan", "Feb", "Mar",
];

pub const FINANCIAL_MONTH_NAMES: [&str; 12] = [
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
    "January",
    "February",
    "March",
];

/// Position of a date's month within the financial year: April is 0, March is 11.
pub fn financial_month_index(date: NaiveDate) -> usize {
    let month = date.month0() as usize;
    if month < 3 {
        month + 9
    } else {
        month - 3
    }
}

// A financial year runs from April of its start year to March of the next.
pub fn in_financial_year(date: NaiveDate, start_year: i32) -> bool {
    let month = date.month0();
    (month >= 3 && date.year() == start_year) || (month < 3 && date.year() == start_year + 1)
}

pub fn current_financial_year(today: NaiveDate) -> i32 {
    if today.month0() >= 3 {
        today.year()
    } else {
        today.year() - 1
    }
}

/// Keeps issues reported inside the financial year. Issues with a missing or
/// unparseable `dateReported` are dropped silently; bad dates are a
/// data-quality problem, not an error.
pub fn filter_by_financial_year(issues: &[Issue], start_year: i32) -> Vec<Issue> {
    issues
        .iter()
        .filter(|issue| {
            issue
                .reported_date()
                .is_some_and(|date| in_financial_year(date, start_year))
        })
        .cloned()
        .collect()
}

/// Buckets each issue into its assignees' financial-month cells. Every named
/// assignee gets one count; hours split evenly when both assignee fields are
/// set. Rows come back sorted by total issues descending, employee name
/// breaking ties.
pub fn aggregate(issues: &[Issue]) -> Vec<EmployeeSummary> {
    let mut rows: HashMap<String, EmployeeSummary> = HashMap::new();

    for issue in issues {
        let Some(date) = issue.reported_date() else {
            continue;
        };
        let month = financial_month_index(date);
        let hours = issue.actual_hours();
        let share = if issue.has_both_assignees() {
            hours / 2.0
        } else {
            hours
        };

        for assignee in issue.assignees() {
            let row = rows
                .entry(assignee.to_string())
                .or_insert_with(|| EmployeeSummary::new(assignee.to_string()));
            row.month_counts[month] += 1;
            row.total += 1;
            row.month_hours[month] += share;
            row.total_hours += share;
        }
    }

    let mut rows: Vec<EmployeeSummary> = rows.into_values().collect();
    rows.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.employee.cmp(&b.employee))
    });
    rows
}

/// Issues behind one pivot cell, in the order the filtered list holds them.
pub fn drill_down<'a>(issues: &'a [Issue], employee: &str, month: usize) -> Vec<&'a Issue> {
    issues
        .iter()
        .filter(|issue| {
            issue.is_assigned_to(employee)
                && issue.reported_date().map(financial_month_index) == Some(month)
        })
        .collect()
}

/// Accepts a financial-month name ("Apr", "april", ...) or a bare index 0..11.
pub fn parse_financial_month(raw: &str) -> Option<usize> {
    let needle = raw.trim().to_ascii_lowercase();
    if let Ok(index) = needle.parse::<usize>() {
        return (index < 12).then_some(index);
    }
    if needle.len() < 3 {
        return None;
    }
    FINANCIAL_MONTH_NAMES
        .iter()
        .position(|name| name.to_ascii_lowercase().starts_with(&needle))
}
