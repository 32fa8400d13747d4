// [libs/core/ratelimiter/src/lib.rs]
//! Limitador de tasa de ventana fija y protocolo de admision por jitter.
//!
//! `collector-infra-http-client` registra, por cada endpoint, tres ventanas
//! (ruta larga, ruta corta, endpoint) y llama `try_admit` sobre las tres
//! antes de cada peticion upstream.

mod admission;
mod limiter;

pub use admission::{try_admit, AdmissionWindow};
pub use limiter::FixedWindowLimiter;
