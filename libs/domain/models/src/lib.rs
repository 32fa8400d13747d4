// [libs/domain/models/src/lib.rs]
//! Contratos de dominio compartidos por todo el pipeline: rutas geograficas,
//! ventanas de limite de tasa, cabeceras upstream, taxonomia de errores y
//! las formas de payload que el upstream devuelve.
//!
//! Este crate no depende de `reqwest`, `tokio` ni `libsql`: es el vocabulario
//! comun que el resto de crates importan para no duplicar definiciones.

mod error;
mod headers;
mod payloads;
mod ratelimit;
mod route;

pub use error::ApiErrorKind;
pub use headers::{parse_limit_pairs, UpstreamHeaders};
pub use payloads::{
    LeagueEntryDto, MatchDto, MatchIdsResponse, MatchInfoDto, MatchMetadataDto, MatchParticipantDto,
    MatchParticipantRow, MatchRow,
};
pub use ratelimit::{
    RateLimitWindow, WindowStats, DEFAULT_ROUTE_LONG, DEFAULT_ROUTE_SHORT, LEAGUE_ENTRIES_ENDPOINT,
    MATCH_BY_ID_ENDPOINT, MATCH_IDS_ENDPOINT,
};
pub use route::{Platform, Region, Route};
