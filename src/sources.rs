use crate::cnpj::Cnpj;
use crate::errors::AppError;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

/// Placeholder replaced by the 14-digit CNPJ in adapter URL templates.
pub const CNPJ_PLACEHOLDER: &str = "{cnpj}";

/// Upstream response bodies are cut to this many characters in error messages.
const ERROR_BODY_PREVIEW: usize = 200;

/// Bytes guaranteed to hold the preview even if every character is 4 bytes wide.
const ERROR_BODY_PREVIEW_BYTES: usize = ERROR_BODY_PREVIEW * 4 + 4;

/// A public CNPJ lookup endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamAdapter {
    /// Human-readable name, reported as `_api_info.fonte`.
    pub name: String,
    /// URL with a `{cnpj}` placeholder.
    pub url_template: String,
    /// Headers sent with every request.
    pub headers: Vec<(String, String)>,
}

impl UpstreamAdapter {
    /// Creates an adapter sending `Accept: application/json` and the given user agent.
    pub fn new(name: impl Into<String>, url_template: impl Into<String>, user_agent: &str) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), user_agent.to_string()),
            ],
        }
    }

    /// Replaces the URL template, keeping name and headers.
    pub fn with_url_template(mut self, url_template: impl Into<String>) -> Self {
        self.url_template = url_template.into();
        self
    }

    pub fn url_for(&self, cnpj: &Cnpj) -> String {
        self.url_template.replace(CNPJ_PLACEHOLDER, cnpj.as_str())
    }
}

/// The adapter used by the single-source endpoint.
pub fn default_single_source() -> UpstreamAdapter {
    UpstreamAdapter::new(
        "CNPJ.ws (pública)",
        "https://publica.cnpj.ws/cnpj/{cnpj}",
        "Mozilla/5.0 (compatible; CNPJ-Query/1.0)",
    )
}

/// Adapters for the multi-source endpoint, highest priority first.
pub fn default_sources() -> Vec<UpstreamAdapter> {
    vec![
        UpstreamAdapter::new(
            "CNPJ.ws (pública)",
            "https://publica.cnpj.ws/cnpj/{cnpj}",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
        ),
        UpstreamAdapter::new(
            "MinhaReceita",
            "https://minhareceita.org/{cnpj}",
            "curl/7.68.0",
        ),
        UpstreamAdapter::new(
            "OpenCNPJ",
            "https://api.opencnpj.org/cnpj/{cnpj}",
            "Java/11.0.1",
        ),
        UpstreamAdapter::new(
            "ReceitaWS (backup)",
            "https://receitaws.com.br/v1/cnpj/{cnpj}",
            "Python/3.9.0",
        ),
    ]
}

/// HTTP client shared by both resolvers.
///
/// Every request is bounded by the client-wide timeout; a request that exceeds
/// it is reported as [`AppError::UpstreamUnreachable`].
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Issues one GET against `adapter` and classifies the outcome.
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - A 2xx response whose body is a JSON object.
    /// * `Err(AppError::NotFound)` - HTTP 404.
    /// * `Err(AppError::RateLimited)` - HTTP 429.
    /// * `Err(AppError::UpstreamError)` - Any other status, or a body that is not a JSON object.
    /// * `Err(AppError::UpstreamUnreachable)` - Connection failure or timeout.
    pub async fn fetch(&self, adapter: &UpstreamAdapter, cnpj: &Cnpj) -> Result<Value, AppError> {
        let url = adapter.url_for(cnpj);

        let mut request = self.client.get(&url);
        for (name, value) in &adapter.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(adapter, &e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound {
                adapter: adapter.name.clone(),
            });
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimited {
                adapter: adapter.name.clone(),
            });
        }
        if !status.is_success() {
            return Err(AppError::UpstreamError {
                adapter: adapter.name.clone(),
                status: Some(status.as_u16()),
                message: body_preview(response).await,
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                transport_error(adapter, &e)
            } else {
                AppError::UpstreamError {
                    adapter: adapter.name.clone(),
                    status: None,
                    message: format!("Failed to parse response: {}", e),
                }
            }
        })?;

        if !body.is_object() {
            return Err(AppError::UpstreamError {
                adapter: adapter.name.clone(),
                status: None,
                message: "Response body is not a JSON object".to_string(),
            });
        }

        Ok(body)
    }
}

/// Reads at most enough of an error body to fill the preview.
async fn body_preview(mut response: reqwest::Response) -> String {
    let mut bytes = Vec::new();
    while bytes.len() < ERROR_BODY_PREVIEW_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => bytes.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "Error body read aborted");
                break;
            }
        }
    }

    String::from_utf8_lossy(&bytes)
        .chars()
        .take(ERROR_BODY_PREVIEW)
        .collect()
}

fn transport_error(adapter: &UpstreamAdapter, error: &reqwest::Error) -> AppError {
    let message = if error.is_timeout() {
        "request timed out".to_string()
    } else {
        error.to_string()
    };

    AppError::UpstreamUnreachable {
        adapter: adapter.name.clone(),
        message,
    }
}
