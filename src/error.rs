// ⚠️ Error Taxonomy
// Transport and auth failures abort the dashboard; data-shape problems never reach here.

use thiserror::Error;

/// Errors that stop the fetch-and-render pipeline.
///
/// Malformed payloads and missing mount points are NOT represented here:
/// classifiers degrade to empty views and renderers log and skip.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// No session token available
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Token present but unusable (bad shape, expired, no identity)
    #[error("Invalid authentication token: {0}")]
    InvalidToken(String),

    /// Backend rejected the token (401/403); session was cleared
    #[error("Authentication rejected by server ({0}), logged out")]
    Unauthorized(u16),

    /// Any other non-2xx response
    #[error("GraphQL request failed: {status} {message}")]
    Http { status: u16, message: String },

    /// Non-empty `errors` array in the response envelope (first message)
    #[error("{0}")]
    GraphQl(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl DashboardError {
    /// True for failures the user can only fix by logging in again
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            DashboardError::NotAuthenticated
                | DashboardError::InvalidToken(_)
                | DashboardError::Unauthorized(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
