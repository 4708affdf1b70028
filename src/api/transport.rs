use crate::api::timing::TimedScope;
use crate::config::credentials::Credentials;
use crate::errors::{Result, TrackerError};
use async_trait::async_trait;
use reqwest::{Certificate, Client, RequestBuilder};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Status and body of one HTTP exchange, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, params: &[(&str, String)]) -> Result<RawResponse>;

    async fn put(&self, url: &str, body: &Value) -> Result<RawResponse>;

    async fn post(&self, url: &str, body: &Value) -> Result<RawResponse>;
}

/// Authenticated reqwest session. One timeout for every call, no retries.
pub struct HttpTransport {
    client: Client,
    username: String,
    password: String,
}

impl HttpTransport {
    pub fn new(credentials: &Credentials, timeout: Duration, ca_cert: Option<&Path>) -> Result<Self> {
        let mut builder = Client::builder().timeout(timeout);

        if let Some(path) = ca_cert {
            let pem = std::fs::read(path).map_err(|e| {
                TrackerError::Configuration(format!(
                    "Failed to read CA certificate {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let cert = Certificate::from_pem(&pem).map_err(|e| {
                TrackerError::Configuration(format!("Invalid CA certificate: {}", e))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder.build().map_err(|e| {
            TrackerError::Configuration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        })
    }

    async fn execute(&self, label: String, request: RequestBuilder) -> Result<RawResponse> {
        let _timer = TimedScope::new(label);

        let response = request
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, params: &[(&str, String)]) -> Result<RawResponse> {
        let request = self.client.get(url).query(params);
        self.execute(format!("GET {}", url), request).await
    }

    async fn put(&self, url: &str, body: &Value) -> Result<RawResponse> {
        let request = self.client.put(url).json(body);
        self.execute(format!("PUT {}", url), request).await
    }

    async fn post(&self, url: &str, body: &Value) -> Result<RawResponse> {
        let request = self.client.post(url).json(body);
        self.execute(format!("POST {}", url), request).await
    }
}
