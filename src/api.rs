use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::models::{Issue, Session, UserAccount};

/// Thin client for the issue-registry REST API. The registry owns all
/// persistence; this side only ever reads.
pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    /// Fetches the issue list the registry exposes to this session. Client
    /// sessions query by company, everyone else by username; the registry
    /// applies its own server-side filtering on top.
    pub fn fetch_issues(&self, session: &Session) -> Result<Vec<Issue>> {
        let mut params = vec![("userRole", session.role.wire_name())];
        match &session.company {
            Some(company) => params.push(("company", company.as_str())),
            None => params.push(("loggedInUser", session.username.as_str())),
        }
        self.get_json("registerissue", &params)
    }

    pub fn fetch_users(&self) -> Result<Vec<UserAccount>> {
        self.get_json("userlist/users", &[])
    }

    /// Looks up the company behind a client session's account.
    pub fn resolve_company(&self, session: &Session) -> Result<String> {
        let users = self.fetch_users()?;
        users
            .iter()
            .find(|user| user.name == session.username)
            .and_then(|user| user.company.clone())
            .filter(|company| !company.is_empty())
            .context("Company not found for logged-in client.")
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{path}", self.base_url);
        let mut request = self.agent.get(&url);
        for (name, value) in params {
            request = request.query(name, value);
        }

        let response = request
            .call()
            .map_err(|err| anyhow::anyhow!("issue tracker API request failed for {url}: {err}"))?;

        response
            .into_json::<T>()
            .with_context(|| format!("failed to decode JSON response from {url}"))
    }
}
