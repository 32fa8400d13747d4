// [apps/collector/src/lib.rs]
//! Biblioteca fina que expone la configuracion del orquestador a sus dos
//! binarios (`collector`, `migrate`) y a la suite de integracion.

pub mod config;

pub use config::Config;
