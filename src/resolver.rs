//! Lookup orchestration: validate, query upstream(s), normalize.
//!
//! Both resolvers are stateless apart from their immutable adapter
//! configuration, so a single instance is shared across concurrent requests.

use crate::cnpj::Cnpj;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{ApiInfo, CanonicalRecord};
use crate::normalizer::normalize;
use crate::normalizer::rules::is_nested_shape;
use crate::sources::{UpstreamAdapter, UpstreamClient};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Queries exactly one upstream; every failure is terminal.
#[derive(Clone)]
pub struct SingleSourceResolver {
    client: UpstreamClient,
    adapter: UpstreamAdapter,
}

impl SingleSourceResolver {
    pub fn new(client: UpstreamClient, adapter: UpstreamAdapter) -> Self {
        Self { client, adapter }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = UpstreamClient::new(config.upstream_timeout)?;
        Ok(Self::new(client, config.single_source.clone()))
    }

    pub fn adapter(&self) -> &UpstreamAdapter {
        &self.adapter
    }

    /// Validates `raw` and resolves it. Invalid input never reaches the network.
    pub async fn resolve(&self, raw: &str) -> Result<CanonicalRecord, AppError> {
        let cnpj = Cnpj::parse(raw)?;
        self.resolve_cnpj(&cnpj).await
    }

    pub async fn resolve_cnpj(&self, cnpj: &Cnpj) -> Result<CanonicalRecord, AppError> {
        let span = tracing::info_span!(
            "cnpj_lookup",
            lookup_id = %Uuid::new_v4(),
            cnpj = %cnpj,
            resolver = "single"
        );

        async {
            attempt(&self.client, &self.adapter, cnpj)
                .await
                .map(|raw| to_record(&raw, cnpj))
        }
        .instrument(span)
        .await
    }
}

/// Tries an ordered list of upstreams, returning the first success.
///
/// Adapters are queried strictly one after another. A 404, 429, other non-2xx
/// status, unreadable body or transport failure only moves the loop on to the
/// next adapter; the lookup fails once every adapter has been tried.
#[derive(Clone)]
pub struct MultiSourceResolver {
    client: UpstreamClient,
    adapters: Vec<UpstreamAdapter>,
}

impl MultiSourceResolver {
    pub fn new(client: UpstreamClient, adapters: Vec<UpstreamAdapter>) -> Self {
        Self { client, adapters }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = UpstreamClient::new(config.upstream_timeout)?;
        Ok(Self::new(client, config.sources.clone()))
    }

    pub fn adapters(&self) -> &[UpstreamAdapter] {
        &self.adapters
    }

    /// Validates `raw` and resolves it. Invalid input never reaches the network.
    pub async fn resolve(&self, raw: &str) -> Result<CanonicalRecord, AppError> {
        let cnpj = Cnpj::parse(raw)?;
        self.resolve_cnpj(&cnpj).await
    }

    pub async fn resolve_cnpj(&self, cnpj: &Cnpj) -> Result<CanonicalRecord, AppError> {
        let span = tracing::info_span!(
            "cnpj_lookup",
            lookup_id = %Uuid::new_v4(),
            cnpj = %cnpj,
            resolver = "multi"
        );

        self.try_in_order(cnpj).instrument(span).await
    }

    async fn try_in_order(&self, cnpj: &Cnpj) -> Result<CanonicalRecord, AppError> {
        let mut bypassed: Vec<AppError> = Vec::new();

        for adapter in &self.adapters {
            match attempt(&self.client, adapter, cnpj).await {
                Ok(raw) => {
                    if !bypassed.is_empty() {
                        tracing::info!(
                            source = %adapter.name,
                            bypassed = bypassed.len(),
                            "Resolved after bypassing failing sources"
                        );
                    }

                    let mut record = to_record(&raw, cnpj);
                    record.api_info = Some(ApiInfo {
                        fonte: adapter.name.clone(),
                        url: adapter.url_for(cnpj),
                        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                    });
                    return Ok(record);
                }
                Err(cause) => bypassed.push(cause),
            }
        }

        tracing::error!(attempted = self.adapters.len(), "All CNPJ sources failed");

        Err(AppError::AllSourcesExhausted {
            last_cause: bypassed.last().map(ToString::to_string),
            attempted: self.adapters.iter().map(|a| a.name.clone()).collect(),
        })
    }
}

/// One upstream request, reported as exactly one structured event.
async fn attempt(
    client: &UpstreamClient,
    adapter: &UpstreamAdapter,
    cnpj: &Cnpj,
) -> Result<Value, AppError> {
    let started = Instant::now();
    let result = client.fetch(adapter, cnpj).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let url = adapter.url_for(cnpj);

    match &result {
        Ok(raw) => tracing::info!(
            source = %adapter.name,
            outcome = "success",
            elapsed_ms,
            url = %url,
            nested_shape = is_nested_shape(raw),
            "Upstream attempt succeeded"
        ),
        Err(cause) => tracing::warn!(
            source = %adapter.name,
            outcome = cause.kind(),
            elapsed_ms,
            url = %url,
            cause = %cause,
            "Upstream attempt failed"
        ),
    }

    result
}

/// Normalizes and fills the identifier when the upstream omitted it.
fn to_record(raw: &Value, cnpj: &Cnpj) -> CanonicalRecord {
    let mut record = normalize(raw);
    record.cnpj.get_or_insert_with(|| cnpj.as_str().to_string());
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Counts events emitted by this crate.
    #[derive(Clone, Default)]
    struct EventCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for EventCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if event.metadata().target().starts_with("cnpj_lookup_api") {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    async fn events_for_lookup(status: u16) -> usize {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(serde_json::json!({ "razao_social": "ACME" })),
            )
            .mount(&server)
            .await;

        let resolver = SingleSourceResolver::new(
            UpstreamClient::new(Duration::from_secs(5)).unwrap(),
            UpstreamAdapter::new("A", format!("{}/{{cnpj}}", server.uri()), "ua"),
        );
        let cnpj = Cnpj::parse("12345678000190").unwrap();

        let counter = EventCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let _ = resolver.resolve_cnpj(&cnpj).await;
        counter.0.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_one_event_per_successful_attempt() {
        assert_eq!(events_for_lookup(200).await, 1);
    }

    #[tokio::test]
    async fn test_one_event_per_failed_attempt() {
        assert_eq!(events_for_lookup(503).await, 1);
        assert_eq!(events_for_lookup(404).await, 1);
    }

    #[test]
    fn test_normalize_emits_no_events() {
        let counter = EventCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());

        tracing::subscriber::with_default(subscriber, || {
            normalize(&serde_json::json!({ "estabelecimento": { "cnpj": "12345678000190" } }))
        });

        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
    }
}
