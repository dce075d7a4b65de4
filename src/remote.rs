use crate::{
    config::Remote,
    errors::{AppError, AppResult},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// Resource returned by the remote endpoint. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteResource {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
}

impl RemoteResource {
    /// Substituted whenever the remote call fails.
    pub fn fallback() -> Self {
        Self {
            title: Some("MCP Documentation".into()),
            description: Some("Official Model Context Protocol documentation".into()),
            url: Some("https://modelcontextprotocol.io/docs/".into()),
            resource_type: Some("documentation".into()),
        }
    }
}

// Empty strings count as absent.
fn or_default<'a>(field: &'a Option<String>, default: &'a str) -> &'a str {
    field.as_deref().filter(|s| !s.is_empty()).unwrap_or(default)
}

impl fmt::Display for RemoteResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "📚 {}\n\n{}\n\n🔗 {}\n\nType: {}",
            or_default(&self.title, "MCP Learning Resource"),
            or_default(&self.description, "A resource for learning about MCP"),
            or_default(&self.url, "https://modelcontextprotocol.io/"),
            or_default(&self.resource_type, "documentation"),
        )
    }
}

#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RemoteClient {
    pub fn new(cfg: &Remote) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(cfg.timeout());
        if !cfg.system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build()?;
        Ok(Self { http, endpoint: cfg.endpoint.clone() })
    }

    pub fn endpoint(&self) -> &str { &self.endpoint }

    /// One POST, no retries.
    pub async fn fetch(&self, tool: &str, topic: &str) -> AppResult<RemoteResource> {
        let body = json!({"type": "tool_call", "name": tool, "parameters": {"topic": topic}});
        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Remote("request timed out".into())
                } else if e.is_connect() {
                    AppError::Remote(format!("cannot connect: {e}"))
                } else {
                    AppError::Remote(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Remote(format!(
                "remote API error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::Remote(format!("failed to read body: {e}")))?;
        tracing::debug!(body = %text, "received remote response");
        parse_resource(&text)
    }
}

/// Only a JSON object is a resource; arrays and scalars are rejected.
pub fn parse_resource(text: &str) -> AppResult<RemoteResource> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| AppError::Remote(format!("invalid JSON body: {e}")))?;
    if !value.is_object() {
        return Err(AppError::Remote("response body is not a JSON object".into()));
    }
    RemoteResource::deserialize(value).map_err(|e| AppError::Remote(format!("invalid resource: {e}")))
}
