// [libs/infra/http-client/src/classify.rs]
//! Traduce una respuesta upstream (codigo de estado + cabeceras) a la
//! taxonomia de errores abstracta del dominio.
//!
//! Grounded on the status-code / exception-type mapping in
//! `execution/worker.py`: 200 -> success, 400/403/404 -> abandon,
//! 401 -> fatal-all, 429 -> server-limit-exceeded, 5xx -> transient.

use collector_domain_models::{ApiErrorKind, UpstreamHeaders};
use reqwest::StatusCode;

/// Cabecera por defecto de `Retry-After` si el upstream no la envia con un 429.
const DEFAULT_RETRY_AFTER_SECONDS: u64 = 60;

pub fn extract_headers(headers: &reqwest::header::HeaderMap) -> UpstreamHeaders {
    let header_str = |name: &str| -> Option<String> {
        headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
    };

    UpstreamHeaders {
        app_rate_limit: header_str("x-app-rate-limit"),
        app_rate_limit_count: header_str("x-app-rate-limit-count"),
        method_rate_limit: header_str("x-method-rate-limit"),
        method_rate_limit_count: header_str("x-method-rate-limit-count"),
        date: header_str("date"),
        retry_after_seconds: header_str("retry-after").and_then(|s| s.trim().parse().ok()),
    }
}

/// Clasifica un estado no exitoso en la taxonomia de errores abstracta.
///
/// Para 2xx, el llamador nunca deberia invocar esta funcion: se espera que
/// intente parsear el cuerpo directamente.
///
/// `fatal_shard_on_server_error` decide la rama 5xx (spec S9, pregunta
/// abierta resuelta): si esta activa, un 5xx se clasifica directamente como
/// `FatalShard` en vez de `Transient`; la politica vive aqui, en la
/// clasificacion, no en el worker que la consume.
pub fn classify_status(
    status: StatusCode,
    upstream: &UpstreamHeaders,
    body_snippet: &str,
    fatal_shard_on_server_error: bool,
) -> ApiErrorKind {
    match status {
        StatusCode::UNAUTHORIZED => ApiErrorKind::FatalAll {
            message: "upstream rejected the API key (401)".to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => ApiErrorKind::ServerLimitExceeded {
            retry_after_seconds: upstream.retry_after_seconds.unwrap_or(DEFAULT_RETRY_AFTER_SECONDS),
        },
        StatusCode::BAD_REQUEST | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => ApiErrorKind::Abandon {
            status: status.as_u16(),
            message: body_snippet.to_string(),
        },
        s if s.is_server_error() && fatal_shard_on_server_error => ApiErrorKind::FatalShard {
            status: s.as_u16(),
            message: format!("upstream server error {}: {}", s.as_u16(), body_snippet),
        },
        s if s.is_server_error() => ApiErrorKind::Transient {
            message: format!("upstream server error {}: {}", s.as_u16(), body_snippet),
            upstream_server_error: true,
        },
        s => ApiErrorKind::Abandon {
            status: s.as_u16(),
            message: format!("unexpected status: {}", body_snippet),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_401_as_fatal_all() {
        let headers = UpstreamHeaders::default();
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, &headers, "", false),
            ApiErrorKind::FatalAll { .. }
        ));
    }

    #[test]
    fn classifies_429_with_retry_after_header() {
        let headers = UpstreamHeaders {
            retry_after_seconds: Some(12),
            ..Default::default()
        };
        match classify_status(StatusCode::TOO_MANY_REQUESTS, &headers, "", false) {
            ApiErrorKind::ServerLimitExceeded { retry_after_seconds } => assert_eq!(retry_after_seconds, 12),
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn classifies_429_without_retry_after_using_default() {
        let headers = UpstreamHeaders::default();
        match classify_status(StatusCode::TOO_MANY_REQUESTS, &headers, "", false) {
            ApiErrorKind::ServerLimitExceeded { retry_after_seconds } => {
                assert_eq!(retry_after_seconds, DEFAULT_RETRY_AFTER_SECONDS)
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn classifies_404_as_abandon() {
        let headers = UpstreamHeaders::default();
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, &headers, "not found", false),
            ApiErrorKind::Abandon { status: 404, .. }
        ));
    }

    #[test]
    fn classifies_503_as_transient_upstream_server_error_by_default() {
        let headers = UpstreamHeaders::default();
        match classify_status(StatusCode::SERVICE_UNAVAILABLE, &headers, "", false) {
            ApiErrorKind::Transient { upstream_server_error, .. } => assert!(upstream_server_error),
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn classifies_503_as_fatal_shard_when_strict_policy_is_set() {
        let headers = UpstreamHeaders::default();
        match classify_status(StatusCode::SERVICE_UNAVAILABLE, &headers, "", true) {
            ApiErrorKind::FatalShard { status, .. } => assert_eq!(status, 503),
            other => panic!("unexpected classification: {other:?}"),
        }
    }
}
