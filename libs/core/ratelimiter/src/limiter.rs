// [libs/core/ratelimiter/src/limiter.rs]
//! Limitador de tasa de ventana fija, en proceso.
//!
//! Cada `(namespace, keys..., period_seconds)` tiene su propio contador que
//! se reinicia la primera vez que se consulta despues de expirar su ventana.
//! No es una ventana deslizante: es deliberadamente tan simple como la
//! implementacion de referencia que sustituye, para que su comportamiento
//! sea facil de razonar bajo concurrencia.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use collector_domain_models::{RateLimitWindow, WindowStats};
use tokio::sync::Mutex;

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs()
}

#[derive(Debug, Clone, Copy, Default)]
struct Counter {
    count: u32,
    window_start_unix: u64,
}

impl Counter {
    fn stats(self, window: &RateLimitWindow, now: u64) -> WindowStats {
        if now >= self.window_start_unix + window.period_seconds {
            return WindowStats {
                remaining: window.amount,
                reset_time_unix: now + window.period_seconds,
            };
        }
        WindowStats {
            remaining: window.amount.saturating_sub(self.count),
            reset_time_unix: self.window_start_unix + window.period_seconds,
        }
    }
}

fn window_key(window: &RateLimitWindow, keys: &[&str]) -> String {
    format!("{}:{}:{}", window.namespace, keys.join(":"), window.period_seconds)
}

/// Registro de contadores de ventana fija, protegido por un unico mutex.
///
/// Un mutex compartido entre todas las claves es suficiente para el volumen
/// de admisiones de este pipeline; no vale la pena el particionamiento por
/// clave a este tamano.
#[derive(Debug, Default)]
pub struct FixedWindowLimiter {
    state: Mutex<HashMap<String, Counter>>,
}

impl FixedWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observa el estado actual de la ventana sin consumir un cupo.
    pub async fn get_window_stats(&self, window: &RateLimitWindow, keys: &[&str]) -> WindowStats {
        let key = window_key(window, keys);
        let now = now_unix();
        let guard = self.state.lock().await;
        let counter = guard.get(&key).copied().unwrap_or_default();
        counter.stats(window, now)
    }

    /// Intenta consumir un cupo de la ventana. Devuelve `true` si se concedio.
    ///
    /// Si la ventana actual ha expirado se reinicia atomicamente antes de
    /// evaluar el cupo, de modo que el reinicio y el consumo ocurren bajo el
    /// mismo candado.
    pub async fn hit(&self, window: &RateLimitWindow, keys: &[&str]) -> bool {
        let key = window_key(window, keys);
        let now = now_unix();
        let mut guard = self.state.lock().await;
        let counter = guard.entry(key).or_default();

        if now >= counter.window_start_unix + window.period_seconds {
            counter.window_start_unix = now;
            counter.count = 0;
        }

        if counter.count < window.amount {
            counter.count += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: RateLimitWindow = RateLimitWindow::new(2, 60, "test");

    #[tokio::test]
    async fn first_hits_are_granted_up_to_amount() {
        let limiter = FixedWindowLimiter::new();
        assert!(limiter.hit(&W, &["k"]).await);
        assert!(limiter.hit(&W, &["k"]).await);
        assert!(!limiter.hit(&W, &["k"]).await);
    }

    #[tokio::test]
    async fn distinct_keys_have_independent_counters() {
        let limiter = FixedWindowLimiter::new();
        assert!(limiter.hit(&W, &["a"]).await);
        assert!(limiter.hit(&W, &["a"]).await);
        assert!(limiter.hit(&W, &["b"]).await);
    }

    #[tokio::test]
    async fn get_window_stats_does_not_consume_a_slot() {
        let limiter = FixedWindowLimiter::new();
        let before = limiter.get_window_stats(&W, &["k"]).await;
        assert_eq!(before.remaining, 2);
        limiter.hit(&W, &["k"]).await;
        let after = limiter.get_window_stats(&W, &["k"]).await;
        assert_eq!(after.remaining, 1);
    }
}
