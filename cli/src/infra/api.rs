//! Infrastructure implementation of the `ProvisioningApi` port over HTTPS.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use rosti_common::{
    Action, ActionKind, AppStatus, Company, ErrorResponse, Plan, RemoteApplication, Runtime,
};
use serde::de::DeserializeOwned;

use crate::application::ports::ProvisioningApi;
use crate::domain::error::ApiError;

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// REST client for the provisioning API.
pub struct RostiApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl RostiApiClient {
    /// Build a client authenticating every request with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the TLS
    /// backend cannot be initialised.
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Token {token}"))
            .context("API token contains invalid characters")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .user_agent(concat!("rostictl/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            base_url: format!("{}/", base_url.trim_end_matches('/')),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%method, %url, "api request");
        self.client.request(method, url)
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .request(Method::GET, path)
            .send()
            .await
            .with_context(|| format!("GET {path}"))?;
        decode(check(response).await?, path).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T> {
        let response = self
            .request(method.clone(), path)
            .json(body)
            .send()
            .await
            .with_context(|| format!("{method} {path}"))?;
        decode(check(response).await?, path).await
    }
}

/// Turn a non-2xx response into an [`ApiError`].
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status.as_u16(), &body).into())
}

async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T> {
    response
        .json()
        .await
        .with_context(|| format!("decoding response of {path}"))
}

/// Build the error for a failed response, surfacing the server's `message`.
#[must_use]
pub fn api_error(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) if !err.message.is_empty() => {
            tracing::debug!(status, errors = %err.errors, "api error details");
            ApiError::Status {
                status,
                message: err.message,
            }
        }
        _ => ApiError::StatusWithoutMessage { status },
    }
}

impl ProvisioningApi for RostiApiClient {
    async fn companies(&self) -> Result<Vec<Company>> {
        self.fetch("companies/").await
    }

    async fn plans(&self, company: u64) -> Result<Vec<Plan>> {
        self.fetch(&format!("{company}/plans/")).await
    }

    async fn runtimes(&self, company: u64) -> Result<Vec<Runtime>> {
        self.fetch(&format!("{company}/runtimes/")).await
    }

    async fn get_app(&self, company: u64, id: u64) -> Result<RemoteApplication> {
        self.fetch(&format!("{company}/apps/{id}/")).await
    }

    async fn create_app(&self, company: u64, app: &RemoteApplication) -> Result<RemoteApplication> {
        self.send(Method::POST, &format!("{company}/apps/"), app).await
    }

    async fn update_app(&self, company: u64, app: &RemoteApplication) -> Result<RemoteApplication> {
        self.send(Method::PUT, &format!("{company}/apps/{}/", app.id), app)
            .await
    }

    async fn delete_app(&self, company: u64, id: u64) -> Result<()> {
        let path = format!("{company}/apps/{id}/");
        let response = self
            .request(Method::DELETE, &path)
            .send()
            .await
            .with_context(|| format!("DELETE {path}"))?;
        check(response).await?;
        Ok(())
    }

    async fn app_action(&self, company: u64, id: u64, action: ActionKind) -> Result<()> {
        let path = format!("{company}/apps-action/{id}/");
        let response = self
            .request(Method::PUT, &path)
            .json(&Action { action })
            .send()
            .await
            .with_context(|| format!("PUT {path}"))?;
        check(response).await?;
        Ok(())
    }

    async fn app_status(&self, company: u64, id: u64) -> Result<AppStatus> {
        self.fetch(&format!("{company}/apps-status/{id}/")).await
    }
}
