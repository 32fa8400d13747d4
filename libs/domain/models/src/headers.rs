// [libs/domain/models/src/headers.rs]
//! Parseo de las cabeceras de presupuesto de tasa que el upstream adjunta a
//! cada respuesta (`X-App-Rate-Limit*`, `X-Method-Rate-Limit*`, `Date`).
//!
//! Mantenido libre de dependencias de `reqwest` para que el dominio pueda
//! probarse de forma aislada; el cliente HTTP traduce su `HeaderMap` a este
//! tipo antes de pasarlo rio abajo.

use chrono::{DateTime, Utc};

/// Una vista de solo lectura, ya extraida, de las cabeceras relevantes de
/// una respuesta upstream.
#[derive(Debug, Clone, Default)]
pub struct UpstreamHeaders {
    pub app_rate_limit: Option<String>,
    pub app_rate_limit_count: Option<String>,
    pub method_rate_limit: Option<String>,
    pub method_rate_limit_count: Option<String>,
    pub date: Option<String>,
    pub retry_after_seconds: Option<u64>,
}

impl UpstreamHeaders {
    /// Parsea la cabecera `Date` (RFC 1123, GMT) a un instante UTC.
    pub fn server_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.date.as_deref()?;
        DateTime::parse_from_rfc2822(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn app_limit_pairs(&self) -> Vec<(u32, u32)> {
        parse_limit_pairs(self.app_rate_limit.as_deref().unwrap_or_default())
    }

    pub fn app_count_pairs(&self) -> Vec<(u32, u32)> {
        parse_limit_pairs(self.app_rate_limit_count.as_deref().unwrap_or_default())
    }

    pub fn method_limit_pairs(&self) -> Vec<(u32, u32)> {
        parse_limit_pairs(self.method_rate_limit.as_deref().unwrap_or_default())
    }

    pub fn method_count_pairs(&self) -> Vec<(u32, u32)> {
        parse_limit_pairs(self.method_rate_limit_count.as_deref().unwrap_or_default())
    }
}

/// Parsea una lista separada por comas de pares `count:window_seconds`,
/// p.ej. `"20:1,100:120"` -> `[(20, 1), (100, 120)]`. Entradas malformadas
/// se descartan silenciosamente; esto es telemetria de mejor esfuerzo, no
/// una entrada de control.
pub fn parse_limit_pairs(raw: &str) -> Vec<(u32, u32)> {
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .filter_map(|part| {
            let (count, window) = part.trim().split_once(':')?;
            Some((count.trim().parse().ok()?, window.trim().parse().ok()?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_pairs() {
        assert_eq!(parse_limit_pairs("20:1,100:120"), vec![(20, 1), (100, 120)]);
    }

    #[test]
    fn empty_string_yields_no_pairs() {
        assert_eq!(parse_limit_pairs(""), Vec::<(u32, u32)>::new());
    }

    #[test]
    fn malformed_entries_are_dropped() {
        assert_eq!(parse_limit_pairs("20:1,garbage,100:120"), vec![(20, 1), (100, 120)]);
    }

    #[test]
    fn server_time_parses_rfc1123() {
        let headers = UpstreamHeaders {
            date: Some("Tue, 29 Jul 2025 10:00:00 GMT".to_string()),
            ..Default::default()
        };
        let parsed = headers.server_time().expect("should parse");
        assert_eq!(parsed.to_rfc3339(), "2025-07-29T10:00:00+00:00");
    }
}
