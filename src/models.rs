use std::collections::BTreeMap;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One issue record as served by the issue registry. Field names follow the
/// registry's camelCase wire format; fields this tool does not know about are
/// carried through untouched so exports lose nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Issue {
    pub issue_number: String,
    pub description: String,
    pub date_reported: Option<String>,
    pub target_date: Option<String>,
    pub resolution_date: Option<String>,
    pub status: String,
    pub priority: String,
    pub client: String,
    pub module: String,
    pub issue_type: String,
    pub level: String,
    pub resolution_type: String,
    pub size: String,
    pub assign_to: String,
    pub assign_to2: String,
    pub actual_time: Option<Value>,
    pub estimated_time: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Issue {
    /// Date component of `dateReported`; `None` when missing or unparseable.
    pub fn reported_date(&self) -> Option<NaiveDate> {
        parse_wire_date(self.date_reported.as_deref()?)
    }

    pub fn actual_hours(&self) -> f64 {
        lenient_hours(self.actual_time.as_ref())
    }

    pub fn estimated_hours(&self) -> f64 {
        lenient_hours(self.estimated_time.as_ref())
    }

    pub fn assignees(&self) -> impl Iterator<Item = &str> + '_ {
        [self.assign_to.as_str(), self.assign_to2.as_str()]
            .into_iter()
            .filter(|name| !name.is_empty())
    }

    pub fn has_both_assignees(&self) -> bool {
        !self.assign_to.is_empty() && !self.assign_to2.is_empty()
    }

    pub fn is_assigned_to(&self, employee: &str) -> bool {
        self.assign_to == employee || self.assign_to2 == employee
    }
}

/// Registry dates arrive as ISO date-times; only the leading date matters.
pub fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.trim().split('T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

// Hours arrive as a number, a numeric string, or nothing at all. Anything
// that does not parse counts as zero; the issue itself still counts.
fn lenient_hours(raw: Option<&Value>) -> f64 {
    let hours = match raw {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if hours.is_finite() {
        hours.max(0.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserAccount {
    pub name: String,
    pub company: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Role {
    Admin,
    User,
    Client,
    #[value(alias = "client user")]
    ClientUser,
    Visitor,
}

impl Role {
    /// Spelling the registry expects in the `userRole` query parameter.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Client => "client",
            Self::ClientUser => "client user",
            Self::Visitor => "visitor",
        }
    }

    pub fn is_client(self) -> bool {
        matches!(self, Self::Client | Self::ClientUser)
    }
}

/// Identity of the requesting account, passed explicitly to every query.
#[derive(Debug, Clone)]
pub struct Session {
    pub role: Role,
    pub username: String,
    pub company: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeSummary {
    pub employee: String,
    pub month_counts: [u32; 12],
    pub month_hours: [f64; 12],
    pub total: u32,
    pub total_hours: f64,
}

impl EmployeeSummary {
    pub fn new(employee: String) -> Self {
        Self {
            employee,
            month_counts: [0; 12],
            month_hours: [0.0; 12],
            total: 0,
            total_hours: 0.0,
        }
    }
}
