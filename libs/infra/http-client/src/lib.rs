// [libs/infra/http-client/src/lib.rs]
//! Cliente HTTP rate-limited para el Riot API: un metodo tipado por
//! endpoint, cada uno precedido por el protocolo de admision y seguido de
//! clasificacion de errores hacia la taxonomia compartida del dominio.

mod classify;
mod client;

pub use classify::{classify_status, extract_headers};
pub use client::RiotHttpClient;
