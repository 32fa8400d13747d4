// [libs/domain/models/src/error.rs]
//! Taxonomia de errores del pipeline (spec S7): el unico vocabulario que el
//! worker necesita para decidir entre reintentar, abandonar o apagar.

use thiserror::Error;

/// Clasificacion abstracta de un fallo de ejecucion de job.
///
/// Deliberadamente no conserva el error subyacente detallado como variante
/// nominal: solo lo que el worker necesita para transicionar la maquina de
/// estados (spec S4.G). El mensaje humano viaja en cada variante para fines
/// de logging.
#[derive(Debug, Error)]
pub enum ApiErrorKind {
    /// El protocolo de admision local agoto sus intentos (drift de reloj
    /// frente al limitador, o el servidor disiente de nuestra contabilidad).
    #[error("local rate limit exceeded, retry after {retry_after_seconds}s")]
    LocalLimitExceeded { retry_after_seconds: f64 },

    /// El upstream devolvio 429.
    #[error("server rate limit exceeded (429), retry after {retry_after_seconds}s")]
    ServerLimitExceeded { retry_after_seconds: u64 },

    /// Fallo de transporte/timeout, o 5xx upstream. `upstream_server_error`
    /// distingue las dos causas porque el worker las reintenta con una
    /// espera distinta (S4.G: `TransientSleep` vs `ServerErrorSleep`).
    #[error("transient failure: {message}")]
    Transient { message: String, upstream_server_error: bool },

    /// 400/403/404, o fallo de parseo de body: este job nunca tendra exito,
    /// abandonarlo.
    #[error("request abandoned (status {status}): {message}")]
    Abandon { status: u16, message: String },

    /// 401: la credencial es invalida. Afecta a todo el proceso.
    #[error("credential rejected (401): {message}")]
    FatalAll { message: String },

    /// 5xx upstream clasificado bajo la politica estricta opcional
    /// (`fatal_shard_on_server_error`): en vez de reintentar indefinidamente,
    /// afecta solo al shard actual. La decision se toma en la clasificacion
    /// (`classify_status`), no en el worker.
    #[error("shard-fatal server error (status {status}): {message}")]
    FatalShard { status: u16, message: String },
}

impl ApiErrorKind {
    /// `true` si esta variante es reintentable dentro del bucle interno del
    /// worker sin abandonar ni apagar nada.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiErrorKind::LocalLimitExceeded { .. }
                | ApiErrorKind::ServerLimitExceeded { .. }
                | ApiErrorKind::Transient { .. }
        )
    }
}
