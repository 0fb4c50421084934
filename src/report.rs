use std::fmt::Write;

use anyhow::Result;
use chrono::NaiveDate;
use serde_json::Value;

use crate::dashboard::{DashboardSummary, CALENDAR_MONTHS, WEEKDAYS};
use crate::fiscal::{FINANCIAL_MONTHS, FINANCIAL_MONTH_NAMES};
use crate::models::{EmployeeSummary, Issue};

/// Markdown pivot of the user-wise summary: one row per employee, an issue
/// and an hours column per financial month, totals at the end.
pub fn user_wise_report(start_year: i32, rows: &[EmployeeSummary]) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "# User-Wise Issues, Financial Year {start_year}-{}",
        start_year + 1
    );
    let _ = writeln!(output);

    if rows.is_empty() {
        let _ = writeln!(
            output,
            "No issues found for Financial Year {start_year}-{}.",
            start_year + 1
        );
        return output;
    }

    let _ = writeln!(output, "Total unique employees: {}", rows.len());
    let _ = writeln!(output);

    let mut header = String::from("| Employee |");
    let mut rule = String::from("| --- |");
    for month in FINANCIAL_MONTHS {
        let _ = write!(header, " {month} | {month} Hrs |");
        rule.push_str(" ---: | ---: |");
    }
    header.push_str(" Total | Total Hrs |");
    rule.push_str(" ---: | ---: |");
    let _ = writeln!(output, "{header}");
    let _ = writeln!(output, "{rule}");

    for row in rows {
        let mut line = format!("| {} |", row.employee);
        for month in 0..12 {
            let _ = write!(
                line,
                " {} | {:.2} |",
                row.month_counts[month], row.month_hours[month]
            );
        }
        let _ = write!(line, " {} | {:.2} |", row.total, row.total_hours);
        let _ = writeln!(output, "{line}");
    }

    output
}

/// Detail table behind one pivot cell.
pub fn drill_down_report(employee: &str, month: usize, issues: &[&Issue]) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "# Issues for {employee} - {}",
        FINANCIAL_MONTH_NAMES[month]
    );
    let _ = writeln!(output);

    if issues.is_empty() {
        let _ = writeln!(output, "No issues found.");
        return output;
    }

    let _ = writeln!(
        output,
        "| Issue Number | Description | Date Reported | Status | Actual Time |"
    );
    let _ = writeln!(output, "| --- | --- | --- | --- | --- |");
    for issue in issues {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} |",
            issue.issue_number,
            issue.description,
            date_cell(issue.reported_date()),
            issue.status,
            hours_cell(issue.actual_time.as_ref())
        );
    }

    output
}

pub fn dashboard_report(summary: &DashboardSummary, trend: &[(NaiveDate, usize)]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Issue Tracker Dashboard");
    let _ = writeln!(
        output,
        "Total issues: {} ({} open, {} closed)",
        summary.total, summary.open, summary.closed
    );
    if summary.estimated_hours > 0.0 {
        let _ = writeln!(
            output,
            "Estimated hours on assigned work: {:.2}",
            summary.estimated_hours
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Status Mix");
    write_distribution(&mut output, &summary.by_status);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Priority Mix");
    write_distribution(&mut output, &summary.by_priority);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Issues by Client");
    write_distribution(&mut output, &summary.by_client);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Issues by Year");
    if summary.by_year.is_empty() {
        let _ = writeln!(output, "No dated issues recorded.");
    } else {
        for (year, count) in &summary.by_year {
            let _ = writeln!(output, "- {year}: {count}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Issues by Calendar Month");
    for (index, name) in CALENDAR_MONTHS.iter().enumerate() {
        let _ = writeln!(output, "- {name}: {}", summary.by_month[index]);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Issues by Quarter");
    for (index, count) in summary.by_quarter.iter().enumerate() {
        let _ = writeln!(output, "- Q{}: {count}", index + 1);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Issues by Weekday");
    for (index, name) in WEEKDAYS.iter().enumerate() {
        let _ = writeln!(output, "- {name}: {}", summary.by_weekday[index]);
    }

    if !trend.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Daily Trend (last {} days)", trend.len());
        for (day, count) in trend {
            let _ = writeln!(output, "- {day}: {count}");
        }
    }

    output
}

pub fn search_report(issues: &[&Issue]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Issue Search Results");
    let _ = writeln!(output, "{} matching issue(s).", issues.len());
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "| Issue Number | Client | Module | Status | Assigned To | Target Date |"
    );
    let _ = writeln!(output, "| --- | --- | --- | --- | --- | --- |");
    for issue in issues {
        let assigned: Vec<&str> = issue.assignees().collect();
        let assigned = if assigned.is_empty() {
            "-".to_string()
        } else {
            assigned.join(" / ")
        };
        let target = issue
            .target_date
            .as_deref()
            .and_then(crate::models::parse_wire_date);
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} |",
            issue.issue_number,
            issue.client,
            issue.module,
            issue.status,
            assigned,
            date_cell(target)
        );
    }

    output
}

/// Column-wise serialization of the pivot: twelve issue/hours column pairs
/// plus the totals, one record per employee.
pub fn write_summary_csv<W: std::io::Write>(writer: W, rows: &[EmployeeSummary]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["Employee".to_string()];
    for month in FINANCIAL_MONTHS {
        header.push(format!("{month} Issues"));
        header.push(format!("{month} Hours"));
    }
    header.push("Total Issues".to_string());
    header.push("Total Hours".to_string());
    csv_writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.employee.clone()];
        for month in 0..12 {
            record.push(row.month_counts[month].to_string());
            record.push(format!("{:.2}", row.month_hours[month]));
        }
        record.push(row.total.to_string());
        record.push(format!("{:.2}", row.total_hours));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn write_distribution(output: &mut String, entries: &[(String, usize)]) {
    if entries.is_empty() {
        let _ = writeln!(output, "No issues recorded.");
        return;
    }
    for (name, count) in entries {
        let _ = writeln!(output, "- {name}: {count}");
    }
}

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |date| date.to_string())
}

// Shows the registry's raw value; the pivot is where parsing rules apply.
fn hours_cell(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(text)) if !text.trim().is_empty() => format!("{text} hrs"),
        Some(Value::Number(number)) => format!("{number} hrs"),
        _ => "-".to_string(),
    }
}
