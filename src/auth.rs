// 🔐 Auth Provider - Session token retrieval and validity
//
// The session token is a JWT. Only the payload is inspected (expiry and user
// identity); signature checking is the backend's job.

use crate::error::{DashboardError, Result};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::Utc;
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::sync::RwLock;

pub trait AuthProvider: Send + Sync {
    fn get_token(&self) -> Option<String>;
    fn is_authenticated(&self) -> bool;
    fn logout(&self);
}

// ============================================================================
// JWT CLAIMS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Claims {
    pub sub: Option<Value>,
    #[serde(rename = "userId")]
    pub user_id: Option<Value>,
    /// Seconds since epoch
    pub exp: Option<i64>,
}

impl Claims {
    /// `sub`, falling back to `userId`
    pub fn user_id(&self) -> Option<String> {
        [&self.sub, &self.user_id]
            .into_iter()
            .flatten()
            .find_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }

    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        self.exp.map_or(false, |exp| exp < now_secs)
    }
}

/// Trim and strip anything outside the base64url alphabet from each of the
/// three segments. `None` when the token does not have three segments.
pub fn normalize_token(raw: &str) -> Option<String> {
    let parts: Vec<&str> = raw.trim().split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let cleaned: Vec<String> = parts
        .iter()
        .map(|p| p.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_').collect())
        .collect();
    Some(cleaned.join("."))
}

pub fn decode_claims(token: &str) -> Result<Claims> {
    let normalized = normalize_token(token)
        .ok_or_else(|| DashboardError::InvalidToken("expected three segments".to_string()))?;
    let payload = normalized
        .split('.')
        .nth(1)
        .ok_or_else(|| DashboardError::InvalidToken("missing payload".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| DashboardError::InvalidToken(format!("payload is not base64url: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| DashboardError::InvalidToken(format!("payload is not JSON: {}", e)))
}

/// Decode and check expiry and identity against `now_secs`
pub fn validate_token_at(token: &str, now_secs: i64) -> Result<Claims> {
    let claims = decode_claims(token)?;
    if claims.is_expired_at(now_secs) {
        return Err(DashboardError::InvalidToken("token expired".to_string()));
    }
    if claims.user_id().is_none() {
        return Err(DashboardError::InvalidToken("token missing user identity".to_string()));
    }
    Ok(claims)
}

// ============================================================================
// TOKEN AUTH
// ============================================================================

/// Auth provider over a token supplied by configuration or sign-in
#[derive(Debug, Default)]
pub struct TokenAuth {
    token: RwLock<Option<String>>,
}

impl TokenAuth {
    pub fn new(token: Option<String>) -> Self {
        TokenAuth { token: RwLock::new(token.filter(|t| !t.trim().is_empty())) }
    }

    pub fn set_token(&self, token: String) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token);
        }
    }

    pub fn claims(&self) -> Option<Claims> {
        self.get_token().and_then(|t| decode_claims(&t).ok())
    }

    pub fn user_id(&self) -> Option<String> {
        self.claims().and_then(|c| c.user_id())
    }

    fn raw_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|slot| slot.clone())
    }
}

impl AuthProvider for TokenAuth {
    /// Normalized token, or the stored one if it cannot be normalized
    fn get_token(&self) -> Option<String> {
        let raw = self.raw_token()?;
        Some(normalize_token(&raw).unwrap_or(raw))
    }

    fn is_authenticated(&self) -> bool {
        let Some(token) = self.get_token() else {
            return false;
        };
        match validate_token_at(&token, Utc::now().timestamp()) {
            Ok(_) => true,
            Err(e) => {
                warn!("{}", e);
                self.logout();
                false
            }
        }
    }

    fn logout(&self) {
        if let Ok(mut slot) = self.token.write() {
            if slot.take().is_some() {
                info!("session token cleared");
            }
        }
    }
}

// ============================================================================
// SIGN-IN
// ============================================================================

/// Exchange credentials for a session token (`POST /api/auth/signin` with
/// basic auth). The endpoint answers with the bare JWT, possibly JSON-quoted.
pub async fn sign_in(client: &reqwest::Client, endpoint: &str, identifier: &str, password: &str) -> Result<String> {
    let credentials = STANDARD.encode(format!("{}:{}", identifier, password));
    let response = client
        .post(endpoint)
        .header("Authorization", format!("Basic {}", credentials))
        .header("Content-Type", "application/json")
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let message: String = body.chars().take(100).collect();
        return Err(DashboardError::Http { status: status.as_u16(), message });
    }

    let token = body.trim().trim_matches('"').to_string();
    if normalize_token(&token).is_none() {
        return Err(DashboardError::InvalidToken("sign-in returned a malformed token".to_string()));
    }
    info!("signed in as {}", identifier);
    Ok(token)
}
