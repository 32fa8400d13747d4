// [apps/collector/src/main.rs]
//! Orquestador (S4.H): para cada ruta configurada, cablea una cola acotada,
//! una fabrica de jobs, un refiller y un conjunto de workers; no invoca el
//! cliente HTTP directamente, solo supervisa.
//!
//! Grounded on `examples/original_source/collector/query_match.py::main` for
//! the per-route wiring loop (generalizado aqui a las tres etapas a la vez en
//! lugar de un binario por etapa) y en `apps/miner-worker/src/main.rs` para
//! la forma del manejo de Ctrl-C y el orden de ignicion Rust.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use collector::Config;
use collector_core_pipeline::{spawn_refiller, JobQueue, ShutdownFlags, Worker};
use collector_domain_jobs::{JobFactory, LadderJobFactory, MatchIdsJobFactory, MatchJobFactory};
use collector_domain_models::{Platform, Region};
use collector_infra_db::{DbClient, LeaseStore};
use collector_infra_http_client::RiotHttpClient;

/// Intervalo de sondeo del refiller mientras la cola esta por encima del
/// umbral. Grounded on `query_match.py::main`'s `refill_queue(..., 1)` call.
const REFILL_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::parse();

    collector_core_telemetry::init_tracing("collector");

    let platforms = config.resolve_platforms()?;
    let regions = config.resolve_regions()?;

    info!(
        workers_per_region = config.workers_per_region,
        workers_per_platform = config.workers_per_platform,
        platforms = ?platforms,
        regions = ?regions,
        "resolved configuration"
    );

    if config.dry_run {
        info!("dry_run set; exiting without connecting to the database or upstream");
        return Ok(());
    }

    let db = DbClient::connect(&config.database_url, config.database_auth_token.clone()).await?;
    let store = LeaseStore::new(db);

    let client = Arc::new(RiotHttpClient::new(config.riot_api_key.clone(), config.fatal_shard_on_server_error));

    let stop_all = ShutdownFlags::new_process_wide();
    {
        let stop_all = stop_all.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("ctrl-c received; requesting shutdown of every shard");
                stop_all.store(true, Ordering::SeqCst);
            }
        });
    }

    let mut handles = Vec::new();

    // Stage 1: una cola/refiller/conjunto de workers por plataforma.
    for platform in &platforms {
        let route_name = platform.name();
        let queue = Arc::new(JobQueue::new());
        let factory = JobFactory::Ladder(LadderJobFactory::new(
            *platform,
            collector::config::LADDER_QUEUES,
            collector::config::LADDER_TIERS,
            collector::config::LADDER_DIVISIONS,
        ));

        handles.push(spawn_refiller(
            queue.clone(),
            factory,
            config.refill_queue_threshold,
            REFILL_POLL_INTERVAL,
            route_name,
        ));

        let shutdown = ShutdownFlags::new_shard(stop_all.clone());
        for _ in 0..config.workers_per_platform {
            let worker = Worker::new(
                route_name,
                queue.clone(),
                client.clone(),
                store.clone(),
                shutdown.clone(),
                config.worker_timeouts(),
            );
            handles.push(tokio::spawn(worker.run()));
        }
    }

    // Stage 2: una cola/refiller/conjunto de workers por region, agregando
    // las plataformas configuradas que pertenecen a esa region.
    for region in &regions {
        let region_platforms: Vec<Platform> = platforms.iter().copied().filter(|p| p.region() == *region).collect();
        if region_platforms.is_empty() {
            continue;
        }

        let route_name = region.name();
        let queue = Arc::new(JobQueue::new());
        let factory = JobFactory::MatchIds(MatchIdsJobFactory::new(
            store.clone(),
            *region,
            region_platforms,
            config.job_factory_batch_size,
            config.lease_duration(),
            collector::config::MATCH_IDS_PAGE_SIZE,
        ));

        handles.push(spawn_refiller(
            queue.clone(),
            factory,
            config.refill_queue_threshold,
            REFILL_POLL_INTERVAL,
            route_name,
        ));

        let shutdown = ShutdownFlags::new_shard(stop_all.clone());
        for _ in 0..config.workers_per_region {
            let worker = Worker::new(
                route_name,
                queue.clone(),
                client.clone(),
                store.clone(),
                shutdown.clone(),
                config.worker_timeouts(),
            );
            handles.push(tokio::spawn(worker.run()));
        }
    }

    // Stage 3: una cola/refiller/conjunto de workers por region.
    for region in &regions {
        let route_name = region.name();
        let queue = Arc::new(JobQueue::new());
        let factory = JobFactory::Match(MatchJobFactory::new(
            store.clone(),
            *region,
            config.job_factory_batch_size,
            config.lease_duration(),
        ));

        handles.push(spawn_refiller(
            queue.clone(),
            factory,
            config.refill_queue_threshold,
            REFILL_POLL_INTERVAL,
            route_name,
        ));

        let shutdown = ShutdownFlags::new_shard(stop_all.clone());
        for _ in 0..config.workers_per_region {
            let worker = Worker::new(
                route_name,
                queue.clone(),
                client.clone(),
                store.clone(),
                shutdown.clone(),
                config.worker_timeouts(),
            );
            handles.push(tokio::spawn(worker.run()));
        }
    }

    info!(tasks = handles.len(), "every shard wired; awaiting completion or shutdown");

    for handle in handles {
        if let Err(err) = handle.await {
            tracing::error!(error = %err, "a pipeline task panicked");
        }
    }

    info!("all shards drained; shutting down");
    Ok(())
}
