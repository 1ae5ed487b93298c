// 🌐 Query Executor - GraphQL over HTTP
//
// Returns the `data` member of the response envelope. Any transport, status
// or envelope error is fatal for the whole dashboard fetch.

use crate::auth::AuthProvider;
use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use log::{debug, error};
use serde_json::{json, Value};
use std::sync::Arc;

// ============================================================================
// QUERIES
// ============================================================================

pub const BASIC_INFO_QUERY: &str = r#"
{
  user {
    id
    login
    firstName
    lastName
    totalUp
    totalDown
    auditRatio
  }
}"#;

pub const PROGRESS_QUERY: &str = r#"
{
  user {
    progresses(order_by: {updatedAt: desc}) {
      path
      createdAt
      updatedAt
      grade
      group {
        captainLogin
        auditors {
          auditorLogin
        }
      }
    }
  }
}"#;

pub const XP_QUERY: &str = r#"
{
  user {
    transactions(
      where: {type: {_eq: "xp"}, eventId: {_is_null: false}}
      order_by: {createdAt: asc}
    ) {
      amount
      createdAt
      path
    }
  }
}"#;

pub const SKILLS_QUERY: &str = r#"
{
  user {
    skills: transactions(
      where: {type: {_like: "%skill_%"}}
      order_by: {id: asc}
    ) {
      amount
      type
      createdAt
    }
  }
}"#;

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &str, variables: Option<Value>) -> Result<Value>;
}

/// Extract `data`, or fail with the first message of a non-empty `errors` array
pub fn unwrap_envelope(envelope: Value) -> Result<Value> {
    if let Some(errors) = envelope.get("errors").and_then(Value::as_array) {
        if let Some(first) = errors.first() {
            let message = first
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown GraphQL error")
                .to_string();
            error!("GraphQL errors: {}", Value::Array(errors.clone()));
            return Err(DashboardError::GraphQl(message));
        }
    }
    Ok(envelope.get("data").cloned().unwrap_or(Value::Null))
}

// ============================================================================
// HTTP CLIENT
// ============================================================================

pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: String,
    auth: Arc<dyn AuthProvider>,
}

impl GraphQlClient {
    pub fn new(endpoint: impl Into<String>, auth: Arc<dyn AuthProvider>) -> Self {
        GraphQlClient { http: reqwest::Client::new(), endpoint: endpoint.into(), auth }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QueryExecutor for GraphQlClient {
    async fn execute(&self, query: &str, variables: Option<Value>) -> Result<Value> {
        let token = self.auth.get_token().ok_or(DashboardError::NotAuthenticated)?;

        let body = json!({
            "query": query,
            "variables": variables.unwrap_or_else(|| json!({})),
        });
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            error!("authentication rejected ({}), logging out", status);
            self.auth.logout();
            return Err(DashboardError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("GraphQL request failed: {}", text);
            return Err(DashboardError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let envelope: Value = response.json().await?;
        let data = unwrap_envelope(envelope)?;
        debug!("GraphQL response received from {}", self.endpoint);
        Ok(data)
    }
}
