use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Failure reasons for a CNPJ lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Client input is not a 14-digit CNPJ. Never reaches the network.
    InvalidIdentifier(String),
    /// Upstream confirmed the CNPJ does not exist (HTTP 404).
    NotFound {
        /// Adapter that answered.
        adapter: String,
    },
    /// Upstream throttled the request (HTTP 429).
    RateLimited {
        /// Adapter that answered.
        adapter: String,
    },
    /// Upstream answered with an unexpected status or an unreadable body.
    UpstreamError {
        /// Adapter that answered.
        adapter: String,
        /// HTTP status, absent when the body could not be parsed.
        status: Option<u16>,
        /// Short description of what went wrong.
        message: String,
    },
    /// Transport failure or timeout before any response arrived.
    UpstreamUnreachable {
        /// Adapter that was being contacted.
        adapter: String,
        /// Underlying transport error.
        message: String,
    },
    /// Every configured adapter failed.
    AllSourcesExhausted {
        /// Description of the last recorded failure.
        last_cause: Option<String>,
        /// Names of the adapters that were tried, in order.
        attempted: Vec<String>,
    },
}

impl AppError {
    /// Short machine-friendly label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidIdentifier(_) => "invalid_identifier",
            AppError::NotFound { .. } => "not_found",
            AppError::RateLimited { .. } => "rate_limited",
            AppError::UpstreamError { .. } => "upstream_error",
            AppError::UpstreamUnreachable { .. } => "upstream_unreachable",
            AppError::AllSourcesExhausted { .. } => "all_sources_exhausted",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidIdentifier(msg) => write!(f, "{}", msg),
            AppError::NotFound { adapter } => write!(f, "CNPJ não encontrado em {}", adapter),
            AppError::RateLimited { adapter } => write!(f, "Rate limit excedido em {}", adapter),
            AppError::UpstreamError {
                adapter,
                status: Some(status),
                ..
            } => write!(f, "Erro {} em {}", status, adapter),
            AppError::UpstreamError {
                adapter,
                status: None,
                message,
            } => write!(f, "Resposta inválida de {}: {}", adapter, message),
            AppError::UpstreamUnreachable { adapter, message } => {
                write!(f, "Falha ao conectar com {}: {}", adapter, message)
            }
            AppError::AllSourcesExhausted { attempted, .. } => {
                write!(f, "Todas as APIs de CNPJ falharam ({})", attempted.join(", "))
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Maps each failure to its HTTP status and JSON body.
    ///
    /// Upstream details are logged here but only a generic message reaches the client,
    /// except for exhaustion where the attempted sources are part of the payload.
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::InvalidIdentifier(msg) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            AppError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                json!({ "error": "CNPJ não encontrado" }),
            ),
            AppError::RateLimited { adapter } => {
                tracing::warn!("Rate limited by {}", adapter);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    json!({
                        "error": "Limite de consultas excedido. Por favor, aguarde alguns minutos antes de tentar novamente."
                    }),
                )
            }
            AppError::UpstreamError {
                adapter, status, ..
            } => {
                tracing::error!("Upstream error: {}", self);
                let error = match status {
                    Some(code) => format!("Erro na consulta: Status {}", code),
                    None => format!("Erro na consulta: resposta inválida de {}", adapter),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": error }))
            }
            AppError::UpstreamUnreachable { .. } => {
                tracing::error!("Upstream unreachable: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Serviço temporariamente indisponível. Tente novamente em alguns minutos."
                    }),
                )
            }
            AppError::AllSourcesExhausted {
                last_cause,
                attempted,
            } => {
                tracing::error!("All CNPJ sources failed: {}", attempted.join(", "));
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Todas as APIs de CNPJ estão indisponíveis no momento. Tente novamente em alguns minutos.",
                        "detalhes": last_cause,
                        "alternativas": attempted.join(", "),
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
