// [libs/core/pipeline/src/shutdown.rs]
//! Senales de apagado monotono a dos niveles: `stop_all` (compartida por
//! todo el proceso) y `stop_shard` (local a un shard/ruta). Ninguna de las
//! dos se limpia una vez activada.
//!
//! Grounded on `apps/miner-worker/src/engine.rs`'s `Arc<AtomicBool>`
//! operational signal: el mismo primitivo, usado aqui en dos capas en vez de
//! una sola, para modelar el alcance "un shard" vs "todo el proceso" de S3.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Par de banderas de apagado para un shard concreto. `stop_all` es
/// compartido entre todos los shards del proceso; `stop_shard` es exclusivo
/// de este shard y de los workers que lo comparten.
#[derive(Clone)]
pub struct ShutdownFlags {
    stop_all: Arc<AtomicBool>,
    stop_shard: Arc<AtomicBool>,
}

impl ShutdownFlags {
    /// Crea el par compartido `stop_all` una unica vez en el arranque del
    /// orquestador, antes de derivar un `ShutdownFlags` por shard.
    pub fn new_process_wide() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    /// Deriva las banderas de un shard a partir del `stop_all` compartido del
    /// proceso. Todos los workers de este shard deben clonar la misma
    /// instancia para compartir `stop_shard`.
    pub fn new_shard(stop_all: Arc<AtomicBool>) -> Self {
        Self {
            stop_all,
            stop_shard: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_all.load(Ordering::Relaxed) || self.stop_shard.load(Ordering::Relaxed)
    }

    pub fn set_stop_all(&self) {
        self.stop_all.store(true, Ordering::Relaxed);
    }

    pub fn set_stop_shard(&self) {
        self.stop_shard.store(true, Ordering::Relaxed);
    }
}
