//! Supabase (PostgREST + GoTrue) implementation of [`Store`]

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use crate::common::config::BackendSettings;
use crate::common::{Error, Result};
use crate::model::CanonicalResult;

use super::auth::{self, User};
use super::tables::{eq, LaunchColumn, ResultColumn, Table, VersionColumn};
use super::{Insertion, Launch, Store};

/// REST API path, relative to the backend host
pub const REST_ENDPOINT: &str = "rest/v1";

/// Timeout for every backend request
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct IdRow<T> {
    id: T,
}

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
struct RestErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    hint: Option<String>,
}

/// Backend client
pub struct SupabaseClient {
    http: reqwest::Client,
    host: String,
    api_key: String,
    access_token: String,
    user: User,
}

impl SupabaseClient {
    /// Connect to the backend, signing in when credentials are configured
    ///
    /// Without credentials the API key doubles as the bearer token.
    pub async fn connect(settings: &BackendSettings) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        let (access_token, user) = match &settings.credentials {
            Some(credentials) => {
                let details = auth::sign_in(&http, &settings.host, &settings.api_key, credentials).await?;
                tracing::info!("Signed in as {}", credentials.email);
                (details.access_token, details.user)
            }
            None => (settings.api_key.clone(), User::default()),
        };

        Ok(Self {
            http,
            host: settings.host.clone(),
            api_key: settings.api_key.clone(),
            access_token,
            user,
        })
    }

    /// The signed-in user; empty for anonymous access
    pub fn user(&self) -> &User {
        &self.user
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/{}/{}", self.host, REST_ENDPOINT, table.as_str())
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/{}/rpc/{}", self.host, REST_ENDPOINT, function)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.access_token)
    }

    /// Send a request and decode the JSON body
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let text = self.send_text(request).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Send a request and return the raw body of a 2xx response
    async fn send_text(&self, request: RequestBuilder) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(rest_error(status.as_u16(), &text));
        }
        Ok(text)
    }
}

fn rest_error(status: u16, body: &str) -> Error {
    match serde_json::from_str::<RestErrorBody>(body) {
        Ok(RestErrorBody { message, hint }) if !message.is_empty() => match hint {
            Some(hint) => Error::backend(status, &format!("{} ({})", message, hint)),
            None => Error::backend(status, &message),
        },
        _ => Error::backend(status, "unknown"),
    }
}

#[async_trait]
impl Store for SupabaseClient {
    async fn get_version(&self, id: i64) -> Result<i64> {
        let request = self
            .request(Method::GET, &self.table_url(Table::Versions))
            .query(&[("select", VersionColumn::Id.as_str())])
            .query(&[eq(VersionColumn::Id.as_str(), id)]);

        let rows: Vec<IdRow<i64>> = self.send(request).await?;
        match rows.as_slice() {
            [row] => Ok(row.id),
            _ => Err(Error::VersionNotFound(id)),
        }
    }

    async fn create_launch(&self, mut launch: Launch) -> Result<i64> {
        if launch.name.is_empty() {
            launch.name = Uuid::new_v4().to_string();
        }
        if !self.user.id.is_empty() {
            launch.user_id = Some(self.user.id.clone());
        }

        let request = self
            .request(Method::GET, &self.table_url(Table::Launches))
            .query(&[("select", LaunchColumn::Id.as_str())])
            .query(&[eq(LaunchColumn::Name.as_str(), &launch.name)]);
        let existing: Vec<IdRow<i64>> = self.send(request).await?;
        if let Some(row) = existing.first() {
            return Err(Error::LaunchExists(row.id));
        }

        if launch.is_template {
            let request = self
                .request(Method::GET, &self.table_url(Table::Launches))
                .query(&[("select", "*")])
                .query(&[eq(LaunchColumn::IsTemplate.as_str(), true)]);
            let previous: Vec<Launch> = self.send(request).await?;
            if let Some(prev_id) = previous.first().and_then(|l| l.id) {
                tracing::info!("Unmarking previous reference launch {}", prev_id);
                let request = self
                    .request(Method::PATCH, &self.table_url(Table::Launches))
                    .query(&[eq(LaunchColumn::Id.as_str(), prev_id)])
                    .json(&serde_json::json!({ "is_template": false }));
                self.send_text(request).await?;
            }
        }

        let request = self
            .request(Method::POST, &self.table_url(Table::Launches))
            .header("Prefer", "return=representation")
            .json(&launch);
        let created: Vec<IdRow<i64>> = self.send(request).await?;
        created
            .first()
            .map(|row| row.id)
            .ok_or_else(|| Error::NotInserted(format!("launch {}", launch.name)))
    }

    async fn create_result(&self, result: &CanonicalResult) -> Result<Insertion> {
        let request = self
            .request(Method::GET, &self.table_url(Table::Results))
            .query(&[("select", ResultColumn::Id.as_str())])
            .query(&[
                eq(ResultColumn::Name.as_str(), &result.name),
                eq(ResultColumn::Suite.as_str(), &result.suite),
                eq(ResultColumn::ParentSuite.as_str(), &result.parent_suite),
                eq(ResultColumn::Feature.as_str(), &result.feature),
                eq(ResultColumn::LaunchId.as_str(), result.launch_id),
            ]);
        let existing: Vec<IdRow<Uuid>> = self.send(request).await?;
        if let Some(row) = existing.first() {
            tracing::info!("Result '{}' already exists, id={}", result.name, row.id);
            return Ok(Insertion::AlreadyExists(row.id));
        }

        let request = self
            .request(Method::POST, &self.table_url(Table::Results))
            .header("Prefer", "return=representation")
            .json(result);
        let created: Vec<IdRow<Uuid>> = self.send(request).await?;
        match created.as_slice() {
            [row] => Ok(Insertion::Inserted(row.id)),
            _ => Err(Error::NotInserted(result.identifier.to_string())),
        }
    }

    async fn get_template(&self, version_id: i64) -> Result<Vec<CanonicalResult>> {
        let request = self
            .request(Method::POST, &self.rpc_url("template"))
            .json(&serde_json::json!({ "version": version_id }));
        let text = self.send_text(request).await?;
        if text.trim().is_empty() {
            return Err(Error::NoReferenceResults(version_id));
        }

        let templates: Vec<CanonicalResult> = serde_json::from_str(&text)?;
        if templates.is_empty() {
            return Err(Error::NoReferenceResults(version_id));
        }
        Ok(templates)
    }

    async fn get_features(&self) -> Result<Vec<String>> {
        let request = self
            .request(Method::POST, &self.rpc_url("features"))
            .json(&serde_json::json!({}));
        let text = self.send_text(request).await?;
        if text.trim().is_empty() {
            return Err(Error::NoFeatures);
        }

        let features: Vec<String> = serde_json::from_str(&text)?;
        if features.is_empty() {
            return Err(Error::NoFeatures);
        }
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> BackendSettings {
        BackendSettings {
            host: "http://localhost:54321".to_string(),
            api_key: "anon".to_string(),
            credentials: None,
        }
    }

    #[tokio::test]
    async fn test_anonymous_connect_uses_api_key() {
        let client = SupabaseClient::connect(&settings()).await.unwrap();
        assert_eq!(client.access_token, "anon");
        assert!(client.user().id.is_empty());
    }

    #[tokio::test]
    async fn test_urls() {
        let client = SupabaseClient::connect(&settings()).await.unwrap();
        assert_eq!(client.table_url(Table::Results), "http://localhost:54321/rest/v1/results");
        assert_eq!(client.rpc_url("template"), "http://localhost:54321/rest/v1/rpc/template");
    }

    #[test]
    fn test_rest_error_message() {
        let err = rest_error(
            404,
            r#"{"code":"PGRST202","message":"Could not find the function","hint":"Perhaps you meant features"}"#,
        );
        assert_eq!(
            err.to_string(),
            "Backend returned 404: Could not find the function (Perhaps you meant features)"
        );
        assert_eq!(rest_error(502, "<html>").to_string(), "Backend returned 502: unknown");
    }
}
