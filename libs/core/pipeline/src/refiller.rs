// [libs/core/pipeline/src/refiller.rs]
//! Tarea en segundo plano que mantiene una `JobQueue` por encima de
//! `threshold`, reclamando lotes nuevos de una `JobFactory` cuando cae por
//! debajo. Independiente del protocolo de admision: solo toca el almacen de
//! arrendamientos, que no esta sujeto a limite de tasa.
//!
//! Grounded on `execution/query_job.py::refill_queue` for the exact loop
//! shape (poll while above threshold, produce, stop on empty result).

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use collector_domain_jobs::JobFactory;

use crate::queue::JobQueue;

/// Lanza el refiller en una tarea de tokio separada y devuelve su asa.
///
/// Termina quietamente cuando `factory.produce()` devuelve una lista vacia
/// (senal terminal de S4.E: no queda mas trabajo que reclamar) o cuando
/// falla de forma irrecuperable contra el almacen.
pub fn spawn_refiller(
    queue: Arc<JobQueue>,
    mut factory: JobFactory,
    threshold: usize,
    poll_interval: Duration,
    route_name: &'static str,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            while queue.len().await >= threshold {
                sleep(poll_interval).await;
            }

            match factory.produce().await {
                Ok(jobs) if jobs.is_empty() => {
                    info!(route = route_name, "no more jobs to fetch; refiller stopping");
                    break;
                }
                Ok(jobs) => {
                    let added = jobs.len();
                    queue.push_many(jobs).await;
                    debug!(route = route_name, added, qsize = queue.len().await, "refiller topped up queue");
                }
                Err(err) => {
                    warn!(route = route_name, error = %err, "refiller failed to claim leases; stopping");
                    break;
                }
            }
        }
    })
}
