use chrono::NaiveDate;

use crate::models::{parse_wire_date, Issue, Role, Session};

/// Which issues a session may see: admins everything, users their own
/// assignments, client roles their company's issues, visitors none.
pub fn can_view(issue: &Issue, session: &Session) -> bool {
    match session.role {
        Role::Admin => true,
        Role::User => issue.is_assigned_to(&session.username),
        Role::Client | Role::ClientUser => session
            .company
            .as_deref()
            .is_some_and(|company| issue.client == company),
        Role::Visitor => false,
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    pub issue_number: Option<String>,
    pub client: Option<String>,
    pub module: Option<String>,
    pub issue_type: Option<String>,
    pub level: Option<String>,
    pub resolution_type: Option<String>,
    pub assign_to: Option<String>,
    pub status: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl SearchCriteria {
    pub fn is_empty(&self) -> bool {
        self.issue_number.is_none()
            && self.client.is_none()
            && self.module.is_none()
            && self.issue_type.is_none()
            && self.level.is_none()
            && self.resolution_type.is_none()
            && self.assign_to.is_none()
            && self.status.is_none()
            && self.from.is_none()
            && self.to.is_none()
    }

    fn matches(&self, issue: &Issue) -> bool {
        let number_matches = self.issue_number.as_deref().is_none_or(|wanted| {
            issue
                .issue_number
                .to_lowercase()
                .contains(&wanted.to_lowercase())
        });

        let exact = |criterion: &Option<String>, value: &str| {
            criterion.as_deref().is_none_or(|wanted| value == wanted)
        };

        number_matches
            && exact(&self.client, &issue.client)
            && exact(&self.module, &issue.module)
            && exact(&self.issue_type, &issue.issue_type)
            && exact(&self.level, &issue.level)
            && exact(&self.resolution_type, &issue.resolution_type)
            && exact(&self.assign_to, &issue.assign_to)
            && exact(&self.status, &issue.status)
            && self.in_target_range(issue)
    }

    // The date range applies to the target date; an issue without a usable
    // target date fails any bounded range.
    fn in_target_range(&self, issue: &Issue) -> bool {
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        match issue.target_date.as_deref().and_then(parse_wire_date) {
            Some(target) => {
                self.from.is_none_or(|from| target >= from)
                    && self.to.is_none_or(|to| target <= to)
            }
            None => false,
        }
    }
}

/// Pure filter over an already-fetched list; original order is preserved.
pub fn search<'a>(
    issues: &'a [Issue],
    session: &Session,
    criteria: &SearchCriteria,
) -> Vec<&'a Issue> {
    issues
        .iter()
        .filter(|issue| can_view(issue, session) && criteria.matches(issue))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role, username: &str, company: Option<&str>) -> Session {
        Session {
            role,
            username: username.to_string(),
            company: company.map(str::to_string),
        }
    }

    fn sample_issue(number: &str, client: &str, assign_to: &str, assign_to2: &str) -> Issue {
        Issue {
            issue_number: number.to_string(),
            client: client.to_string(),
            assign_to: assign_to.to_string(),
            assign_to2: assign_to2.to_string(),
            ..Issue::default()
        }
    }

    #[test]
    fn visibility_follows_role() {
        let issue = sample_issue("INC-1", "Acme", "Alice", "Bob");

        assert!(can_view(&issue, &session(Role::Admin, "root", None)));
        assert!(can_view(&issue, &session(Role::User, "Alice", None)));
        assert!(can_view(&issue, &session(Role::User, "Bob", None)));
        assert!(!can_view(&issue, &session(Role::User, "Carol", None)));
        assert!(can_view(&issue, &session(Role::Client, "kay", Some("Acme"))));
        assert!(can_view(
            &issue,
            &session(Role::ClientUser, "kay", Some("Acme"))
        ));
        assert!(!can_view(
            &issue,
            &session(Role::Client, "kay", Some("Globex"))
        ));
        assert!(!can_view(&issue, &session(Role::Client, "kay", None)));
        assert!(!can_view(&issue, &session(Role::Visitor, "guest", None)));
    }

    #[test]
    fn issue_number_matches_as_substring() {
        let issues = vec![
            sample_issue("INC-1042", "Acme", "Alice", ""),
            sample_issue("REQ-7", "Acme", "Alice", ""),
        ];
        let admin = session(Role::Admin, "root", None);
        let criteria = SearchCriteria {
            issue_number: Some("inc".to_string()),
            ..SearchCriteria::default()
        };

        let found = search(&issues, &admin, &criteria);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].issue_number, "INC-1042");
    }

    #[test]
    fn field_criteria_match_exactly() {
        let mut issue = sample_issue("INC-1", "Acme", "Alice", "");
        issue.module = "Payroll".to_string();
        issue.status = "Open".to_string();
        let issues = vec![issue];
        let admin = session(Role::Admin, "root", None);

        let criteria = SearchCriteria {
            module: Some("Payroll".to_string()),
            status: Some("Open".to_string()),
            ..SearchCriteria::default()
        };
        assert_eq!(search(&issues, &admin, &criteria).len(), 1);

        let wrong_status = SearchCriteria {
            module: Some("Payroll".to_string()),
            status: Some("Closed".to_string()),
            ..SearchCriteria::default()
        };
        assert!(search(&issues, &admin, &wrong_status).is_empty());

        let partial_module = SearchCriteria {
            module: Some("Pay".to_string()),
            ..SearchCriteria::default()
        };
        assert!(search(&issues, &admin, &partial_module).is_empty());
    }

    #[test]
    fn date_range_applies_to_target_date() {
        let mut in_range = sample_issue("INC-1", "Acme", "Alice", "");
        in_range.target_date = Some("2024-06-15T00:00:00.000Z".to_string());
        let mut out_of_range = sample_issue("INC-2", "Acme", "Alice", "");
        out_of_range.target_date = Some("2024-09-01".to_string());
        let undated = sample_issue("INC-3", "Acme", "Alice", "");
        let issues = vec![in_range, out_of_range, undated];
        let admin = session(Role::Admin, "root", None);

        let criteria = SearchCriteria {
            from: NaiveDate::from_ymd_opt(2024, 6, 1),
            to: NaiveDate::from_ymd_opt(2024, 6, 30),
            ..SearchCriteria::default()
        };
        let found = search(&issues, &admin, &criteria);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].issue_number, "INC-1");
    }

    #[test]
    fn access_and_criteria_combine() {
        let issues = vec![
            sample_issue("INC-1", "Acme", "Alice", ""),
            sample_issue("INC-2", "Globex", "Alice", ""),
            sample_issue("INC-3", "Acme", "Bob", ""),
        ];
        let alice = session(Role::User, "Alice", None);
        let criteria = SearchCriteria {
            client: Some("Acme".to_string()),
            ..SearchCriteria::default()
        };

        let found = search(&issues, &alice, &criteria);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].issue_number, "INC-1");
    }

    #[test]
    fn empty_criteria_report_as_empty() {
        assert!(SearchCriteria::default().is_empty());
        let criteria = SearchCriteria {
            status: Some("Open".to_string()),
            ..SearchCriteria::default()
        };
        assert!(!criteria.is_empty());
    }
}
