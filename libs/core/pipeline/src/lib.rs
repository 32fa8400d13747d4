// [libs/core/pipeline/src/lib.rs]
//! El subsistema concurrente que consume jobs: una cola acotada por shard,
//! un refiller que la mantiene alimentada desde una `JobFactory`, y un
//! conjunto de workers que la consumen contra el cliente HTTP tarificado,
//! coordinados por dos niveles de bandera de apagado.

mod queue;
mod refiller;
mod shutdown;
mod worker;

pub use queue::JobQueue;
pub use refiller::spawn_refiller;
pub use shutdown::ShutdownFlags;
pub use worker::{Worker, WorkerTimeouts};
