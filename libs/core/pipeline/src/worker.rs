// [libs/core/pipeline/src/worker.rs]
/*!
 * =================================================================
 * APARATO: WORKER OUTER LOOP & RETRY STATE MACHINE
 * CLASIFICACIÓN: CONCURRENCY CORE (ESTRATO L2)
 * RESPONSABILIDAD: EJECUCION DE JOBS CONTRA EL CLIENTE HTTP TARIFICADO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. OBEDECE, NO DECIDE: la politica 5xx-fatal-por-shard vive en la
 *    clasificacion del cliente HTTP; este worker solo reacciona a la
 *    variante de `ApiErrorKind` que recibe.
 * 2. UNA BANDERA COMPARTIDA POR SHARD: `ShutdownFlags` llega ya
 *    construida desde el llamador — este worker nunca crea la suya.
 * =================================================================
 */
//!
//! Grounded on `execution/worker.py` for la maquina de estados exacta (cada
//! transicion de la tabla de S4.G es una traduccion directa de una rama
//! `try/except` de ese archivo) y en `apps/miner-worker/src/engine.rs` para
//! la forma del bucle asincrono Rust (`while !stop.load(...)`,
//! `tokio::time::sleep` como backoff entre intentos).

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use collector_domain_jobs::{Job, JobOutcome};
use collector_domain_models::{ApiErrorKind, UpstreamHeaders};
use collector_infra_db::LeaseStore;
use collector_infra_http_client::RiotHttpClient;

use crate::queue::JobQueue;
use crate::shutdown::ShutdownFlags;

/// Parametros de temporizacion del worker, todos configurables desde el
/// entorno del proceso (S9.1).
#[derive(Debug, Clone, Copy)]
pub struct WorkerTimeouts {
    /// Cuanto esperar por un job antes de asumir que ya no llega mas trabajo.
    pub queue_timeout: Duration,
    /// Espera fija tras un error de transporte generico (`TransientSleep`).
    pub http_error_timeout: Duration,
    /// Espera fija tras un 5xx upstream (`ServerErrorSleep`).
    pub server_error_sleep: Duration,
    /// Espera por defecto tras un 429 sin cabecera `Retry-After` (ya
    /// aplicada dentro de `classify::classify_status`; expuesta aqui solo
    /// para que el worker pueda registrarla en los logs de telemetria).
    pub default_server_backoff: Duration,
}

impl Default for WorkerTimeouts {
    fn default() -> Self {
        Self {
            queue_timeout: Duration::from_secs(5),
            http_error_timeout: Duration::from_secs(10),
            server_error_sleep: Duration::from_secs(60),
            default_server_backoff: Duration::from_secs(60),
        }
    }
}

/// Un worker vinculado a la cola de un shard, un cliente HTTP compartido, un
/// almacen de arrendamientos, y las dos banderas de apagado de S3.
///
/// La politica de 5xx (pregunta abierta S9, registrada en DESIGN.md) vive en
/// `classify_status`/`RiotHttpClient`, no aqui: este worker simplemente
/// obedece lo que la clasificacion decide (`Transient` reintentable o
/// `FatalShard` terminal).
pub struct Worker {
    route_name: &'static str,
    queue: Arc<JobQueue>,
    client: Arc<RiotHttpClient>,
    store: LeaseStore,
    shutdown: ShutdownFlags,
    timeouts: WorkerTimeouts,
}

impl Worker {
    pub fn new(
        route_name: &'static str,
        queue: Arc<JobQueue>,
        client: Arc<RiotHttpClient>,
        store: LeaseStore,
        shutdown: ShutdownFlags,
        timeouts: WorkerTimeouts,
    ) -> Self {
        Self {
            route_name,
            queue,
            client,
            store,
            shutdown,
            timeouts,
        }
    }

    /// Bucle externo (S4.G "Outer step"): termina cuando alguna bandera de
    /// apagado se activa o cuando la cola no entrega trabajo dentro de
    /// `queue_timeout`.
    pub async fn run(self) {
        loop {
            if self.shutdown.is_stopped() {
                info!(route = self.route_name, "shutdown flag set; worker exiting");
                return;
            }

            let job = match self.queue.pop_timeout(self.timeouts.queue_timeout).await {
                Some(job) => job,
                None => {
                    info!(route = self.route_name, "queue drained; worker exiting");
                    return;
                }
            };

            let Some((outcome, headers)) = self.issue_with_retries(&job).await else {
                continue;
            };

            self.log_rate_limit_telemetry(job.kind.method_name(), &headers).await;

            if let Err(err) = job.on_success(&self.store, &outcome).await {
                error!(route = self.route_name, kind = ?job.kind, error = %err, "failed to persist job result");
                continue;
            }

            match job.next(&outcome) {
                Some(next_job) => self.queue.push(next_job).await,
                None => {
                    if let Err(err) = job.on_completion(&self.store).await {
                        error!(route = self.route_name, kind = ?job.kind, error = %err, "failed to mark job lineage complete");
                    }
                }
            }
        }
    }

    /// Maquina de estados de ejecucion interna (S4.G): reintenta los
    /// estados recuperables (`LocalBackoff`, `ServerBackoff`,
    /// `TransientSleep`, `ServerErrorSleep`) durmiendo y reemitiendo
    /// `job.execute`; devuelve `None` para los estados terminales no
    /// exitosos (`FatalAll`, `Abandon`) tras aplicar su efecto secundario.
    async fn issue_with_retries(&self, job: &Job) -> Option<(JobOutcome, UpstreamHeaders)> {
        loop {
            if self.shutdown.is_stopped() {
                return None;
            }

            match job.execute(&self.client).await {
                Ok(result) => return Some(result),

                Err(ApiErrorKind::LocalLimitExceeded { retry_after_seconds }) => {
                    debug!(route = self.route_name, retry_after_seconds, "local rate limit exceeded; backing off");
                    tokio::time::sleep(Duration::from_secs_f64(retry_after_seconds.max(0.0))).await;
                }

                Err(ApiErrorKind::ServerLimitExceeded { retry_after_seconds }) => {
                    warn!(route = self.route_name, retry_after_seconds, "server rate limit exceeded (429); backing off");
                    let stats = self.client.window_stats(self.route_name, job.kind.method_name()).await;
                    warn!(
                        route = self.route_name,
                        route_long_remaining = stats.route_long.remaining,
                        route_short_remaining = stats.route_short.remaining,
                        endpoint_remaining = stats.endpoint.remaining,
                        "client-side limiter state at time of 429"
                    );
                    tokio::time::sleep(Duration::from_secs(retry_after_seconds)).await;
                }

                Err(ApiErrorKind::Transient { message, upstream_server_error: false }) => {
                    warn!(route = self.route_name, error = %message, "transient transport error; sleeping");
                    tokio::time::sleep(self.timeouts.http_error_timeout).await;
                }

                Err(ApiErrorKind::Transient { message, upstream_server_error: true }) => {
                    warn!(route = self.route_name, error = %message, "upstream server error; sleeping");
                    tokio::time::sleep(self.timeouts.server_error_sleep).await;
                }

                Err(ApiErrorKind::FatalAll { message }) => {
                    error!(route = self.route_name, error = %message, "credential rejected; stopping the whole process");
                    self.shutdown.set_stop_all();
                    return None;
                }

                Err(err @ ApiErrorKind::Abandon { .. }) => {
                    job.on_error(&err);
                    return None;
                }

                Err(err @ ApiErrorKind::FatalShard { .. }) => {
                    error!(route = self.route_name, error = %err, "shard-fatal server error; stopping this shard");
                    self.shutdown.set_stop_shard();
                    return None;
                }
            }
        }
    }

    /// Registra, tras cada exito, tanto lo que el upstream reporto en sus
    /// cabeceras (`log_header_limits`) como lo que el limitador local cree
    /// que queda (`log_client_limits`), igual que `execution/worker.py`
    /// hace en cada iteracion exitosa.
    async fn log_rate_limit_telemetry(&self, method_name: &str, headers: &UpstreamHeaders) {
        if headers.app_rate_limit.is_some() || headers.method_rate_limit.is_some() {
            debug!(
                route = self.route_name,
                app_limit = ?headers.app_limit_pairs(),
                app_count = ?headers.app_count_pairs(),
                method_limit = ?headers.method_limit_pairs(),
                method_count = ?headers.method_count_pairs(),
                "server-reported rate limit headers"
            );
        }

        let stats = self.client.window_stats(self.route_name, method_name).await;
        debug!(
            route = self.route_name,
            route_long_remaining = stats.route_long.remaining,
            route_short_remaining = stats.route_short.remaining,
            endpoint_remaining = stats.endpoint.remaining,
            "client-side limiter state"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collector_domain_jobs::JobKind;
    use collector_domain_models::{Platform, Route};

    fn ladder_job() -> Job {
        Job::new(
            Route::from(Platform::Na1),
            JobKind::EnumerateLadder {
                queue: "RANKED_SOLO_5x5".to_string(),
                tier: "DIAMOND".to_string(),
                division: "I".to_string(),
                page: 1,
            },
        )
    }

    #[test]
    fn abandon_does_not_set_any_shutdown_flag() {
        let flags = ShutdownFlags::new_shard(ShutdownFlags::new_process_wide());
        let err = ApiErrorKind::Abandon { status: 404, message: "not found".to_string() };
        ladder_job().on_error(&err);
        assert!(!flags.is_stopped(), "Abandon must not touch shutdown state");
    }

    #[test]
    fn fatal_all_sets_stop_all_and_is_visible_to_other_shards() {
        let stop_all = ShutdownFlags::new_process_wide();
        let shard_a = ShutdownFlags::new_shard(stop_all.clone());
        let shard_b = ShutdownFlags::new_shard(stop_all);

        shard_a.set_stop_all();
        assert!(shard_b.is_stopped(), "stop_all must propagate across shards");
    }

    #[test]
    fn fatal_shard_on_server_error_only_stops_its_own_shard() {
        let stop_all = ShutdownFlags::new_process_wide();
        let shard_a = ShutdownFlags::new_shard(stop_all.clone());
        let shard_b = ShutdownFlags::new_shard(stop_all);

        shard_a.set_stop_shard();
        assert!(shard_a.is_stopped());
        assert!(!shard_b.is_stopped());
    }

    #[test]
    fn default_timeouts_match_spec_defaults() {
        let timeouts = WorkerTimeouts::default();
        assert_eq!(timeouts.queue_timeout, Duration::from_secs(5));
        assert_eq!(timeouts.http_error_timeout, Duration::from_secs(10));
        assert_eq!(timeouts.server_error_sleep, Duration::from_secs(60));
    }
}
