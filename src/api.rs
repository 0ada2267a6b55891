/// Synchronous client for the platform's **GraphQL engine**.
///
/// One query ([`PROFILE_QUERY`]) pulls everything the dashboard needs: the
/// user row with its skill transactions, the XP/audit transactions in
/// chronological order, and the graded results.
///
/// ### Notes
/// - Requests carry the JWT as a bearer token. An expired token is refused
///   locally before any network round trip.
/// - 5xx responses and network errors are retried with a short backoff.
/// - The engine reports query problems in an `errors` array next to (or
///   instead of) `data`; those surface as [`DashboardError::GraphQl`].
///
/// Typical usage:
/// ```no_run
/// # use xpboard::{Client, auth::Token};
/// let client = Client::with_domain(xpboard::api::DEFAULT_DOMAIN)?;
/// let data = client.fetch_profile(&Token::new("eyJ..."), xpboard::api::DEFAULT_EVENT_ID)?;
/// println!("{} transactions", data.transaction.len());
/// # Ok::<(), anyhow::Error>(())
/// ```
use crate::auth::{Token, is_expired};
use crate::error::DashboardError;
use crate::models::UserProfileData;
use anyhow::{Context, Result, bail};
use chrono::Utc;
use log::{debug, info, warn};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::{Value, json};
use std::time::Duration;

pub const DEFAULT_DOMAIN: &str = "learn.zone01kisumu.ke";

/// Module event the dashboard is scoped to.
pub const DEFAULT_EVENT_ID: i64 = 75;

/// XP and skill rows are limited to `$eventId`; audit (`up`/`down`) rows are not.
pub const PROFILE_QUERY: &str = r#"
query Profile($eventId: Int!) {
  user {
    id
    login
    attrs
    auditRatio
    totalDown
    events(where: { event: { path: { _ilike: "%/div-01" } } }) {
      level
    }
    skills: transactions(
      where: { type: { _like: "skill_%" }, eventId: { _eq: $eventId } }
      order_by: [{ amount: desc }]
    ) {
      type
      amount
      createdAt
    }
  }
  transaction(
    where: {
      _or: [
        { type: { _eq: "xp" }, eventId: { _eq: $eventId } }
        { type: { _in: ["up", "down"] } }
      ]
    }
    order_by: { createdAt: asc }
  ) {
    amount
    type
    createdAt
    objectId
    path
    object {
      name
    }
  }
  result {
    grade
    objectId
    createdAt
  }
}
"#;

/// Variables sent with [`PROFILE_QUERY`].
pub fn profile_variables(event_id: i64) -> Value {
    json!({ "eventId": event_id })
}

#[derive(Debug, Clone)]
pub struct Client {
    pub graphql_url: String,
    http: HttpClient,
}

impl Client {
    /// Client for `https://{domain}/api/graphql-engine/v1/graphql`.
    pub fn with_domain(domain: &str) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            .user_agent(concat!("xpboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self {
            graphql_url: format!(
                "https://{}/api/graphql-engine/v1/graphql",
                domain.trim_end_matches('/')
            ),
            http,
        })
    }

    /// POST a JSON body, retrying transient failures (5xx / network errors).
    fn post_json(&self, token: &Token, body: &Value) -> Result<Value> {
        let mut last_err: Option<anyhow::Error> = None;
        for backoff_ms in [100u64, 300, 700] {
            match self
                .http
                .post(&self.graphql_url)
                .bearer_auth(token.as_str())
                .json(body)
                .send()
            {
                Ok(r) if r.status().is_success() => {
                    return r.json().context("decode json");
                }
                Ok(r) if r.status().is_server_error() => {
                    warn!("HTTP {} from {}, retrying", r.status(), self.graphql_url);
                    last_err = Some(
                        DashboardError::Http {
                            status: r.status().as_u16(),
                        }
                        .into(),
                    );
                }
                Ok(r) => {
                    return Err(DashboardError::Http {
                        status: r.status().as_u16(),
                    }
                    .into());
                }
                Err(e) => last_err = Some(e.into()),
            }
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        match last_err {
            Some(e) => Err(e.context("giving up after retries")),
            None => bail!("network error"),
        }
    }

    /// Run an arbitrary query and return the raw response envelope.
    pub fn execute(&self, token: &Token, query: &str, variables: Value) -> Result<Value> {
        if is_expired(token, Utc::now()) {
            return Err(DashboardError::ExpiredToken.into());
        }
        debug!("POST {}", self.graphql_url);
        let body = request_body(query, variables);
        self.post_json(token, &body)
            .with_context(|| format!("POST {}", self.graphql_url))
    }

    /// Fetch the dashboard dataset for the token's user, XP and skills
    /// scoped to `event_id`.
    pub fn fetch_profile(&self, token: &Token, event_id: i64) -> Result<UserProfileData> {
        let v = self.execute(token, PROFILE_QUERY, profile_variables(event_id))?;
        let data = parse_graphql_response(v)?;
        info!(
            "fetched {} transactions, {} results",
            data.transaction.len(),
            data.result.len()
        );
        Ok(data)
    }
}

/// The `{query, variables}` POST body.
pub fn request_body(query: &str, variables: Value) -> Value {
    json!({ "query": query, "variables": variables })
}

/// Turn a GraphQL response envelope into the profile dataset.
pub fn parse_graphql_response(v: Value) -> Result<UserProfileData> {
    if let Some(errors) = v.get("errors").and_then(Value::as_array)
        && !errors.is_empty()
    {
        let msg = errors
            .iter()
            .map(|e| {
                e.get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string())
            })
            .collect::<Vec<_>>()
            .join("; ");
        return Err(DashboardError::GraphQl(msg).into());
    }

    let data = match v.get("data") {
        Some(d) if !d.is_null() => d.clone(),
        _ => return Err(DashboardError::DataUnavailable("response has no data".into()).into()),
    };
    let parsed: UserProfileData =
        serde_json::from_value(data).context("parse profile data")?;
    if parsed.user.is_empty() {
        return Err(DashboardError::DataUnavailable("response contains no user".into()).into());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(err: &anyhow::Error) -> &DashboardError {
        err.downcast_ref::<DashboardError>().expect("domain error")
    }

    #[test]
    fn request_carries_event_id() {
        let body = request_body(PROFILE_QUERY, profile_variables(75));
        assert_eq!(body["variables"]["eventId"], 75);
        let query = body["query"].as_str().unwrap();
        assert!(query.contains("$eventId: Int!"));
        assert_eq!(query.matches("eventId: { _eq: $eventId }").count(), 2);

        let other = request_body(PROFILE_QUERY, profile_variables(20));
        assert_eq!(other["variables"]["eventId"], 20);
    }

    #[test]
    fn graphql_errors_surface() {
        let v = json!({ "errors": [{ "message": "field 'nope' not found" }] });
        let err = parse_graphql_response(v).unwrap_err();
        assert!(matches!(kind(&err), DashboardError::GraphQl(m) if m.contains("nope")));
    }

    #[test]
    fn missing_data_or_user_is_unavailable() {
        let err = parse_graphql_response(json!({})).unwrap_err();
        assert!(matches!(kind(&err), DashboardError::DataUnavailable(_)));

        let err = parse_graphql_response(json!({ "data": { "user": [] } })).unwrap_err();
        assert!(matches!(kind(&err), DashboardError::DataUnavailable(_)));
    }

    #[test]
    fn minimal_user_parses() {
        let v = json!({ "data": { "user": [{ "id": 1, "login": "amina" }] } });
        let data = parse_graphql_response(v).unwrap();
        assert_eq!(data.user().unwrap().login, "amina");
        assert!(data.transaction.is_empty());
    }

    #[test]
    fn expired_token_is_refused_before_network() {
        // Unroutable domain: reaching the network would fail differently.
        let client = Client::with_domain("invalid.invalid").unwrap();
        let err = client
            .fetch_profile(&Token::new("garbage"), DEFAULT_EVENT_ID)
            .unwrap_err();
        assert!(matches!(kind(&err), DashboardError::ExpiredToken));
    }
}
