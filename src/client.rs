use crate::error::{NrcqError, Result};
use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderValue, USER_AGENT};
use reqwest::{Method, Url};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

const USER_AGENT_VALUE: &str = concat!("nrcq/", env!("CARGO_PKG_VERSION"));

/// Everything needed for a single call against the REST service.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub base_url: String,
    pub endpoint: String,
    pub folder: String,
    pub data: Map<String, Value>,
}

impl RequestDescriptor {
    /// The `json` parameter the service expects: the folder followed by
    /// the user's options in the order given.
    pub fn payload(&self) -> String {
        let mut payload = Map::new();
        payload.insert("folder".into(), Value::String(self.folder.clone()));
        for (key, value) in &self.data {
            payload.insert(key.clone(), value.clone());
        }
        Value::Object(payload).to_string()
    }

    fn url(&self) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        );
        Url::parse(&joined)
            .map_err(|e| NrcqError::Transport(format!("invalid URL `{joined}`: {e}")))
    }
}

/// Performs one request and hands back the raw response body.
pub trait Transport {
    fn perform(&self, request: &RequestDescriptor) -> Result<String>;
}

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NrcClient {
    http: Client,
    credentials: Credentials,
}

impl NrcClient {
    pub fn new(
        credentials: Credentials,
        timeout: Duration,
        insecure: bool,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(HeaderValue::from_static(USER_AGENT_VALUE))
            .danger_accept_invalid_certs(insecure)
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;

        Ok(Self { http, credentials })
    }
}

impl Transport for NrcClient {
    fn perform(&self, request: &RequestDescriptor) -> Result<String> {
        let url = request.url()?;
        let payload = request.payload();
        debug!(method = %request.method, %url, %payload, "sending request");

        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        if let Some(username) = &self.credentials.username {
            builder = builder.basic_auth(username, self.credentials.password.as_deref());
        }

        builder = if request.method == Method::GET {
            builder.query(&[("json", payload.as_str())])
        } else {
            builder.form(&[("json", payload.as_str())])
        };

        let response = builder
            .send()
            .map_err(|e| NrcqError::Transport(format!("request to {url} failed: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| NrcqError::Transport(format!("reading response body: {e}")))?;
        debug!(status = status.as_u16(), bytes = body.len(), "response received");

        if !status.is_success() {
            return Err(NrcqError::Transport(server_message(status.as_u16(), &body)));
        }
        Ok(body)
    }
}

// Prefer the service's own `message` over the raw body.
fn server_message(status: u16, body: &str) -> String {
    let message = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        json.get("message")
            .and_then(|m| m.as_str())
            .map(|m| m.to_string())
    });
    match message {
        Some(message) => message,
        None if body.trim().is_empty() => format!("HTTP {status}"),
        None => {
            let body = body.trim();
            if body.chars().count() > 200 {
                let head: String = body.chars().take(200).collect();
                format!("HTTP {status}: {head}...")
            } else {
                format!("HTTP {status}: {body}")
            }
        }
    }
}
