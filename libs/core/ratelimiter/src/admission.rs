// [libs/core/ratelimiter/src/admission.rs]
//! Protocolo de admision de un solo intento: prueba todas las ventanas de la
//! lista, y solo si todas tienen cupo las consume. Si alguna no lo tiene,
//! devuelve cuanto hay que esperar antes de reintentar en vez de dormir por
//! su cuenta — quien orquesta el reintento (el worker) es quien decide
//! cuando volver a intentarlo, igual que hace con un 429 del servidor.
//!
//! Traducido del decorador `add_rate_limit` de la implementacion original,
//! pero con el bucle de espera movido al llamador para que toda la logica de
//! reintento/backoff de un job viva en un unico lugar.

use rand::Rng;
use tracing::debug;

use collector_domain_models::RateLimitWindow;

use crate::limiter::FixedWindowLimiter;

/// Margen de seguridad base, en segundos, anadido a la espera sugerida.
const SAFETY_MARGIN_BASE_SECS: f64 = 0.3;
/// Rango de jitter aleatorio anadido sobre la base, en segundos.
const SAFETY_MARGIN_JITTER_SECS: (f64, f64) = (0.1, 0.3);

/// Una ventana de limite de tasa junto con las claves que la identifican.
pub struct AdmissionWindow<'a> {
    pub window: RateLimitWindow,
    pub keys: &'a [&'a str],
}

/// Intenta admitir una peticion contra todas las ventanas dadas.
///
/// Si todas tienen cupo, se consumen todas (el orden no importa: cada una
/// esta guardada por su propia entrada en el mapa del limitador) y se
/// devuelve `Ok`. Si alguna no tiene cupo, ninguna se consume y se devuelve
/// el numero de segundos sugerido antes de reintentar, calculado a partir de
/// la ventana mas restrictiva.
///
/// Nota de diseno: entre el `test` de todas las ventanas y el `hit` de todas
/// ellas hay una ventana de carrera frente a otros llamadores concurrentes;
/// esto es aceptable porque el servidor upstream es la segunda linea de
/// defensa (un 429 se trata como un reintento normal, no como un fallo).
pub async fn try_admit(limiter: &FixedWindowLimiter, windows: &[AdmissionWindow<'_>], debug_identifier: &str) -> Result<(), f64> {
    let now = now_unix();
    let mut worst_wait: Option<f64> = None;

    for aw in windows {
        let stats = limiter.get_window_stats(&aw.window, aw.keys).await;
        if stats.remaining == 0 {
            let wait = suggested_wait(stats.reset_time_unix, now);
            worst_wait = Some(worst_wait.map_or(wait, |w: f64| w.max(wait)));
        }
    }

    if let Some(wait) = worst_wait {
        debug!(target: "ratelimiter", identifier = debug_identifier, wait, "admission denied");
        return Err(wait);
    }

    for aw in windows {
        limiter.hit(&aw.window, aw.keys).await;
    }
    debug!(target: "ratelimiter", identifier = debug_identifier, "admission granted");
    Ok(())
}

fn now_unix() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs()
}

fn suggested_wait(reset_time_unix: u64, now_unix: u64) -> f64 {
    let mut rng = rand::thread_rng();
    let margin = SAFETY_MARGIN_BASE_SECS + rng.gen_range(SAFETY_MARGIN_JITTER_SECS.0..SAFETY_MARGIN_JITTER_SECS.1);
    let remaining = reset_time_unix.saturating_sub(now_unix) as f64;
    (remaining + margin).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggested_wait_includes_margin_past_reset() {
        let w = suggested_wait(100, 100);
        assert!(w >= SAFETY_MARGIN_BASE_SECS);
        assert!(w <= SAFETY_MARGIN_BASE_SECS + SAFETY_MARGIN_JITTER_SECS.1 + 0.01);
    }

    #[tokio::test]
    async fn admits_when_all_windows_have_room() {
        let limiter = FixedWindowLimiter::new();
        const W1: RateLimitWindow = RateLimitWindow::new(5, 60, "t");
        const W2: RateLimitWindow = RateLimitWindow::new(5, 60, "t");
        let windows = [
            AdmissionWindow { window: W1, keys: &["r"] },
            AdmissionWindow { window: W2, keys: &["r", "m"] },
        ];
        assert!(try_admit(&limiter, &windows, "x").await.is_ok());
    }

    #[tokio::test]
    async fn denies_without_consuming_any_window_when_one_is_exhausted() {
        let limiter = FixedWindowLimiter::new();
        const ROOMY: RateLimitWindow = RateLimitWindow::new(5, 60, "t");
        const TIGHT: RateLimitWindow = RateLimitWindow::new(1, 60, "t");
        limiter.hit(&TIGHT, &["r", "m"]).await;

        let windows = [
            AdmissionWindow { window: ROOMY, keys: &["r"] },
            AdmissionWindow { window: TIGHT, keys: &["r", "m"] },
        ];
        assert!(try_admit(&limiter, &windows, "x").await.is_err());

        let roomy_stats = limiter.get_window_stats(&ROOMY, &["r"]).await;
        assert_eq!(roomy_stats.remaining, 5);
    }
}
