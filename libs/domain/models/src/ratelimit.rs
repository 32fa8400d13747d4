// [libs/domain/models/src/ratelimit.rs]
//! Tipos compartidos para la descripcion de ventanas de limite de tasa.
//!
//! El dominio no conoce la implementacion del limitador (ver
//! `collector-core-ratelimiter`); solo describe el contrato: cuantas
//! admisiones caben en cuanto tiempo, bajo que espacio de nombres.

use serde::{Deserialize, Serialize};

/// Descripcion inmutable de una ventana fija de limite de tasa.
///
/// `amount` admisiones como maximo en cualquier ventana de `period_seconds`
/// identificada por `(namespace, keys...)`. Los valores tipicos se fijan
/// ligeramente por debajo de la cuota anunciada por el servidor para dejar
/// margen de maniobra frente al drift de reloj.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateLimitWindow {
    pub amount: u32,
    pub period_seconds: u64,
    pub namespace: &'static str,
}

impl RateLimitWindow {
    pub const fn new(amount: u32, period_seconds: u64, namespace: &'static str) -> Self {
        Self {
            amount,
            period_seconds,
            namespace,
        }
    }
}

/// Estado instantaneo de una ventana, tal como lo devuelve `get_window_stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStats {
    pub remaining: u32,
    pub reset_time_unix: u64,
}

/// Ventanas por defecto, fijadas ligeramente por debajo de las cuotas
/// estandar anunciadas por el desarrollador de Riot Games para una app key
/// de produccion, tal como codificaba la fuente original.
pub const DEFAULT_ROUTE_LONG: RateLimitWindow = RateLimitWindow::new(95, 123, "riot_api");
pub const DEFAULT_ROUTE_SHORT: RateLimitWindow = RateLimitWindow::new(10, 1, "riot_api");

/// Ventana de endpoint para `get_league_entries` (league-v4).
pub const LEAGUE_ENTRIES_ENDPOINT: RateLimitWindow = RateLimitWindow::new(45, 10, "riot_api");
/// Ventana de endpoint para `get_match_ids_by_puuid` (match-v5).
pub const MATCH_IDS_ENDPOINT: RateLimitWindow = RateLimitWindow::new(50, 10, "riot_api");
/// Ventana de endpoint para `get_match_by_id` (match-v5).
pub const MATCH_BY_ID_ENDPOINT: RateLimitWindow = RateLimitWindow::new(45, 13, "riot_api");
