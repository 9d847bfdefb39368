use crate::sources::{default_single_source, default_sources, UpstreamAdapter, CNPJ_PLACEHOLDER};
use std::time::Duration;

/// Default per-request upstream timeout, in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Bound applied to every upstream request.
    pub upstream_timeout: Duration,
    /// Adapter queried by the single-source endpoint.
    pub single_source: UpstreamAdapter,
    /// Adapters queried by the multi-source endpoint, in priority order.
    pub sources: Vec<UpstreamAdapter>,
}

/// Env vars that may override each default adapter's URL template, by position.
const SOURCE_URL_VARS: [&str; 4] = [
    "CNPJWS_URL",
    "MINHARECEITA_URL",
    "OPENCNPJ_URL",
    "RECEITAWS_URL",
];

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?;

        let upstream_timeout = std::env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim().parse::<u64>().ok().filter(|secs| *secs > 0).ok_or_else(|| {
                    anyhow::anyhow!("UPSTREAM_TIMEOUT_SECS must be a positive number of seconds")
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS);

        let mut single_source = default_single_source();
        let mut sources = default_sources();

        for (adapter, var) in sources.iter_mut().zip(SOURCE_URL_VARS) {
            if let Some(template) = url_override(var)? {
                *adapter = adapter.clone().with_url_template(template);
            }
        }
        // The single-source endpoint queries CNPJ.ws, so it follows the same override.
        if let Some(template) = url_override(SOURCE_URL_VARS[0])? {
            single_source = single_source.with_url_template(template);
        }

        let config = Self {
            port,
            upstream_timeout: Duration::from_secs(upstream_timeout),
            single_source,
            sources,
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("Upstream timeout: {:?}", config.upstream_timeout);
        for adapter in &config.sources {
            tracing::debug!("CNPJ source: {} -> {}", adapter.name, adapter.url_template);
        }

        Ok(config)
    }
}

fn url_override(var: &str) -> anyhow::Result<Option<String>> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => validate_url_template(var, value.trim()).map(Some),
        _ => Ok(None),
    }
}

/// Checks that an adapter URL template is an absolute http(s) URL with a `{cnpj}` slot.
pub fn validate_url_template(var: &str, template: &str) -> anyhow::Result<String> {
    if !template.starts_with("http://") && !template.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", var);
    }
    if !template.contains(CNPJ_PLACEHOLDER) {
        anyhow::bail!("{} must contain the {} placeholder", var, CNPJ_PLACEHOLDER);
    }

    let sample = template.replace(CNPJ_PLACEHOLDER, "00000000000000");
    url::Url::parse(&sample).map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", var, e))?;

    Ok(template.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_template() {
        assert!(validate_url_template("X", "https://api.example.com/cnpj/{cnpj}").is_ok());
        assert!(validate_url_template("X", "http://127.0.0.1:8080/{cnpj}?full=1").is_ok());
    }

    #[test]
    fn test_validate_url_template_rejects_bad_input() {
        assert!(validate_url_template("X", "ftp://example.com/{cnpj}").is_err());
        assert!(validate_url_template("X", "https://example.com/cnpj").is_err());
        assert!(validate_url_template("X", "https://exa mple.com/{cnpj}").is_err());
    }
}
