// [libs/core/pipeline/src/queue.rs]
//! Cola acotada de `Job`, compartida entre un refiller (productor) y varios
//! workers (consumidores) del mismo shard.
//!
//! El equivalente directo es `asyncio.Queue` en la implementacion original
//! (`execution/query_job.py::refill_queue`), que admite multiples
//! consumidores `await`-ando `get()`. El corpus no trae un canal mpmc, asi
//! que se reconstruye con el mismo `tokio::sync::Mutex` compartido ya usado
//! en `collector-core-ratelimiter`, mas un `Notify` para evitar que los
//! consumidores hagan polling activo mientras la cola esta vacia.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use collector_domain_jobs::Job;

pub struct JobQueue {
    inner: Mutex<VecDeque<Job>>,
    notify: Notify,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl JobQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Encola un unico job y despierta a un consumidor en espera, si lo hay.
    pub async fn push(&self, job: Job) {
        self.inner.lock().await.push_back(job);
        self.notify.notify_one();
    }

    /// Encola un lote de jobs producidos por un refiller.
    pub async fn push_many(&self, jobs: Vec<Job>) {
        if jobs.is_empty() {
            return;
        }
        {
            let mut guard = self.inner.lock().await;
            guard.extend(jobs);
        }
        self.notify.notify_one();
    }

    /// Espera hasta `timeout` por el siguiente job. Devuelve `None` si el
    /// plazo expira con la cola todavia vacia: el llamador (el worker) lo
    /// interpreta como "no queda mas trabajo" y termina su bucle externo.
    pub async fn pop_timeout(&self, timeout: Duration) -> Option<Job> {
        let deadline = Instant::now() + timeout;
        loop {
            {
                let mut guard = self.inner.lock().await;
                if let Some(job) = guard.pop_front() {
                    return Some(job);
                }
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            if tokio::time::timeout(remaining, self.notify.notified()).await.is_err() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collector_domain_jobs::JobKind;
    use collector_domain_models::{Platform, Route};

    fn sample_job() -> Job {
        Job::new(
            Route::from(Platform::Na1),
            JobKind::FetchMatch { match_id: "NA1_1".to_string() },
        )
    }

    #[tokio::test]
    async fn pop_returns_immediately_when_a_job_is_already_queued() {
        let queue = JobQueue::new();
        queue.push(sample_job()).await;
        let popped = queue.pop_timeout(Duration::from_millis(50)).await;
        assert!(popped.is_some());
    }

    #[tokio::test]
    async fn pop_times_out_on_an_empty_queue() {
        let queue = JobQueue::new();
        let popped = queue.pop_timeout(Duration::from_millis(20)).await;
        assert!(popped.is_none());
    }

    #[tokio::test]
    async fn pop_wakes_up_as_soon_as_a_concurrent_push_arrives() {
        let queue = std::sync::Arc::new(JobQueue::new());
        let producer = queue.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            producer.push(sample_job()).await;
        });

        let popped = queue.pop_timeout(Duration::from_secs(2)).await;
        assert!(popped.is_some());
    }

    #[tokio::test]
    async fn push_many_enqueues_every_job() {
        let queue = JobQueue::new();
        queue.push_many(vec![sample_job(), sample_job(), sample_job()]).await;
        assert_eq!(queue.len().await, 3);
    }
}
