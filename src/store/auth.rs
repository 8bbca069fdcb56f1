//! GoTrue password sign-in

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::common::config::Credentials;
use crate::common::{Error, Result};

/// Auth API path, relative to the backend host
pub const AUTH_ENDPOINT: &str = "auth/v1";

/// Sign-in must complete within this time
const SIGN_IN_TIMEOUT: Duration = Duration::from_secs(5);

/// Signed-in user
#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

/// Tokens returned by a successful sign-in
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatedDetails {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub user: User,
}

#[derive(Serialize)]
struct SignInBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// Error body returned by the auth API
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
    #[serde(default)]
    msg: String,
}

impl AuthErrorBody {
    fn message(&self) -> String {
        match (self.error.is_empty(), self.error_description.is_empty()) {
            (false, false) => format!("{}: {}", self.error, self.error_description),
            (false, true) => self.error.clone(),
            _ if !self.msg.is_empty() => self.msg.clone(),
            _ => self.error_description.clone(),
        }
    }
}

/// Sign in with email and password
pub async fn sign_in(
    http: &reqwest::Client,
    host: &str,
    api_key: &str,
    credentials: &Credentials,
) -> Result<AuthenticatedDetails> {
    let url = format!("{}/{}/token", host, AUTH_ENDPOINT);
    tracing::debug!("Signing in as {}", credentials.email);

    let response = http
        .post(&url)
        .query(&[("grant_type", "password")])
        .header("apikey", api_key)
        .timeout(SIGN_IN_TIMEOUT)
        .json(&SignInBody {
            email: &credentials.email,
            password: &credentials.password,
        })
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<AuthErrorBody>(&body)
            .map(|b| b.message())
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("unknown, status code: {}", status.as_u16()));
        return Err(Error::Auth(message));
    }

    Ok(response.json().await?)
}
