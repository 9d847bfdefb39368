/// HTTP-level tests for the lookup router
/// Drives the axum router in-process against mocked upstreams
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use cnpj_lookup_api::api::handlers::{router, AppState};
use cnpj_lookup_api::config::Config;
use cnpj_lookup_api::integrations::sources::UpstreamAdapter;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CNPJ: &str = "11222333000181";

fn app(server: &MockServer) -> Router {
    let source = |name: &str, prefix: &str| {
        UpstreamAdapter::new(
            name,
            format!("{}/{}/{{cnpj}}", server.uri(), prefix),
            "test-agent",
        )
    };

    let config = Config {
        port: 0,
        upstream_timeout: Duration::from_secs(2),
        single_source: source("CNPJ.ws", "ws"),
        sources: vec![source("CNPJ.ws (pública)", "ws"), source("MinhaReceita", "mr")],
    };

    app_with(config)
}

fn app_with(config: Config) -> Router {
    router(Arc::new(AppState::from_config(config).unwrap()))
}

/// An adapter pointing at a local port nothing listens on.
fn dead_adapter(name: &str) -> UpstreamAdapter {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    UpstreamAdapter::new(name, format!("http://127.0.0.1:{}/{{cnpj}}", port), "dead")
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn mount(server: &MockServer, prefix: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/{}", prefix, CNPJ)))
        .respond_with(response)
        .mount(server)
        .await;
}

fn flat_body() -> Value {
    json!({
        "cnpj": CNPJ,
        "razao_social": "PADARIA BOM PAO LTDA",
        "capital_social": "50.000,00",
        "uf": "SP"
    })
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    let (status, body) = get(app(&server), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "cnpj-lookup-api");
}

#[tokio::test]
async fn test_missing_cnpj_is_bad_request() {
    let server = MockServer::start().await;

    for uri in ["/api/cnpj", "/api/cnpj-multi", "/api/cnpj?cnpj=", "/api/cnpj-multi?cnpj=%20"] {
        let (status, body) = get(app(&server), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "CNPJ não fornecido");
    }
}

#[tokio::test]
async fn test_malformed_cnpj_is_bad_request() {
    let server = MockServer::start().await;
    let (status, body) = get(app(&server), "/api/cnpj?cnpj=123").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "CNPJ inválido. Deve conter 14 dígitos.");
}

#[tokio::test]
async fn test_single_success_has_no_provenance() {
    let server = MockServer::start().await;
    mount(&server, "ws", ResponseTemplate::new(200).set_body_json(flat_body())).await;

    let (status, body) = get(app(&server), "/api/cnpj?cnpj=11.222.333/0001-81").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["razao_social"], "PADARIA BOM PAO LTDA");
    assert_eq!(body["capital_social"], 50000.0);
    assert!(body.get("_api_info").is_none());
}

#[tokio::test]
async fn test_single_status_mapping() {
    let cases = [
        (404, StatusCode::NOT_FOUND, "CNPJ não encontrado"),
        (
            429,
            StatusCode::TOO_MANY_REQUESTS,
            "Limite de consultas excedido. Por favor, aguarde alguns minutos antes de tentar novamente.",
        ),
        (503, StatusCode::INTERNAL_SERVER_ERROR, "Erro na consulta: Status 503"),
    ];

    for (upstream, expected, message) in cases {
        let server = MockServer::start().await;
        mount(&server, "ws", ResponseTemplate::new(upstream)).await;

        let (status, body) = get(app(&server), &format!("/api/cnpj?cnpj={}", CNPJ)).await;
        assert_eq!(status, expected);
        assert_eq!(body["error"], message);
    }
}

#[tokio::test]
async fn test_multi_success_has_provenance() {
    let server = MockServer::start().await;
    mount(&server, "ws", ResponseTemplate::new(429)).await;
    mount(&server, "mr", ResponseTemplate::new(200).set_body_json(flat_body())).await;

    let (status, body) = get(app(&server), &format!("/api/cnpj-multi?cnpj={}", CNPJ)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_api_info"]["fonte"], "MinhaReceita");
    assert_eq!(
        body["_api_info"]["url"],
        format!("{}/mr/{}", server.uri(), CNPJ)
    );
    assert!(body["_api_info"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_multi_exhaustion_lists_sources() {
    let server = MockServer::start().await;
    mount(&server, "ws", ResponseTemplate::new(404)).await;
    mount(&server, "mr", ResponseTemplate::new(500)).await;

    let (status, body) = get(app(&server), &format!("/api/cnpj-multi?cnpj={}", CNPJ)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Todas as APIs de CNPJ estão indisponíveis no momento. Tente novamente em alguns minutos."
    );
    assert_eq!(body["alternativas"], "CNPJ.ws (pública), MinhaReceita");
    assert!(body["detalhes"]
        .as_str()
        .unwrap()
        .contains("MinhaReceita"));
}

#[tokio::test]
async fn test_single_unreachable_upstream_is_unavailable() {
    let config = Config {
        port: 0,
        upstream_timeout: Duration::from_secs(2),
        single_source: dead_adapter("CNPJ.ws"),
        sources: vec![],
    };

    let (status, body) = get(app_with(config), &format!("/api/cnpj?cnpj={}", CNPJ)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Serviço temporariamente indisponível. Tente novamente em alguns minutos."
    );
}
