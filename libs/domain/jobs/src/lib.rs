// [libs/domain/jobs/src/lib.rs]
//! La unidad de trabajo (`Job`/`JobKind`) y las fabricas que la producen
//! reclamando arrendamientos del almacen persistente.

mod factory;
mod job;

pub use factory::{JobFactory, LadderJobFactory, MatchIdsJobFactory, MatchJobFactory};
pub use job::{Job, JobKind, JobOutcome};
