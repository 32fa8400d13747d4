// [libs/infra/http-client/src/client.rs]
/*!
 * =================================================================
 * APARATO: RIOT HTTP CLIENT
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: ADMISION TARIFICADA Y CLASIFICACION DE RESPUESTAS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. UN CLIENTE COMPARTIDO: un unico `reqwest::Client` interno, tres
 *    metodos tipados, cada uno admitido contra sus tres ventanas antes
 *    de salir a la red.
 * 2. LA POLITICA VIVE AQUI: `fatal_shard_on_server_error` se decide en
 *    `classify_status`, no en el worker que consume el resultado.
 * =================================================================
 */
//!
//! Grounded on `query_match.py`/`query_users.py` for which three endpoints
//! this pipeline actually calls, and on the teacher's `worker-client`
//! `reqwest::Client` wrapper for the Rust client shape (single shared client,
//! header-based auth, `#[instrument]` per call).

use collector_domain_models::{
    ApiErrorKind, LeagueEntryDto, MatchDto, MatchIdsResponse, Route, UpstreamHeaders, WindowStats,
    LEAGUE_ENTRIES_ENDPOINT, MATCH_BY_ID_ENDPOINT, MATCH_IDS_ENDPOINT,
};
use collector_core_ratelimiter::{try_admit, AdmissionWindow, FixedWindowLimiter};
use reqwest::Client;
use tracing::instrument;

use crate::classify::{classify_status, extract_headers};

const RIOT_TOKEN_HEADER: &str = "X-Riot-Token";

/// Estado interno del limitador para las tres ventanas de un metodo, sin
/// consumir cupo. Espejo de `logs/limits.py::log_client_limits` de la fuente
/// original: lo que el limitador *cree* que queda, en vez de lo que el
/// servidor acaba de reportar en las cabeceras de la ultima respuesta.
#[derive(Debug, Clone, Copy)]
pub struct ClientWindowStats {
    pub route_long: WindowStats,
    pub route_short: WindowStats,
    pub endpoint: WindowStats,
}

/// Cliente de red compartido. `route_long`/`route_short` son las ventanas
/// de alcance de ruta registradas una unica vez; cada metodo registra ademas
/// su propia ventana de endpoint antes de admitir la peticion.
pub struct RiotHttpClient {
    http: Client,
    api_key: String,
    limiter: FixedWindowLimiter,
    fatal_shard_on_server_error: bool,
}

impl RiotHttpClient {
    pub fn new(api_key: String, fatal_shard_on_server_error: bool) -> Self {
        Self {
            http: Client::new(),
            api_key,
            limiter: FixedWindowLimiter::new(),
            fatal_shard_on_server_error,
        }
    }

    /// Consulta, sin consumir cupo, el estado de las tres ventanas que
    /// `admit_or_local_limit` registra para `route_name`/`method_name`.
    pub async fn window_stats(&self, route_name: &str, method_name: &str) -> ClientWindowStats {
        ClientWindowStats {
            route_long: self
                .limiter
                .get_window_stats(&collector_domain_models::DEFAULT_ROUTE_LONG, &[route_name, "route_long"])
                .await,
            route_short: self
                .limiter
                .get_window_stats(&collector_domain_models::DEFAULT_ROUTE_SHORT, &[route_name, "route_short"])
                .await,
            endpoint: self.limiter.get_window_stats(&self.endpoint_window(method_name), &[route_name, method_name]).await,
        }
    }

    async fn admit_or_local_limit(&self, route_name: &str, method_name: &str) -> Result<(), ApiErrorKind> {
        let windows = [
            AdmissionWindow {
                window: collector_domain_models::DEFAULT_ROUTE_LONG,
                keys: &[route_name, "route_long"],
            },
            AdmissionWindow {
                window: collector_domain_models::DEFAULT_ROUTE_SHORT,
                keys: &[route_name, "route_short"],
            },
            AdmissionWindow {
                window: self.endpoint_window(method_name),
                keys: &[route_name, method_name],
            },
        ];
        try_admit(&self.limiter, &windows, &format!("{route_name}:{method_name}"))
            .await
            .map_err(|retry_after_seconds| ApiErrorKind::LocalLimitExceeded { retry_after_seconds })
    }

    fn endpoint_window(&self, method_name: &str) -> collector_domain_models::RateLimitWindow {
        match method_name {
            "get_league_entries" => LEAGUE_ENTRIES_ENDPOINT,
            "get_match_ids_by_puuid" => MATCH_IDS_ENDPOINT,
            "get_match_by_id" => MATCH_BY_ID_ENDPOINT,
            other => unreachable!("unregistered endpoint window: {other}"),
        }
    }

    /// `/lol/league/v4/entries/{queue}/{tier}/{division}` — stage 1, ladder enumeration.
    #[instrument(skip(self))]
    pub async fn get_league_entries(
        &self,
        platform: Route,
        queue: &str,
        tier: &str,
        division: &str,
        page: u32,
    ) -> Result<(Vec<LeagueEntryDto>, UpstreamHeaders), ApiErrorKind> {
        self.admit_or_local_limit(platform.name(), "get_league_entries").await?;

        let url = format!(
            "https://{}/lol/league/v4/entries/{}/{}/{}?page={}",
            platform.host(),
            queue,
            tier,
            division,
            page
        );
        self.send(&url).await
    }

    /// `/lol/match/v5/matches/by-puuid/{puuid}/ids` — stage 2, match id listing.
    #[instrument(skip(self))]
    pub async fn get_match_ids_by_puuid(
        &self,
        region: Route,
        puuid: &str,
        start: u32,
        count: u32,
    ) -> Result<(MatchIdsResponse, UpstreamHeaders), ApiErrorKind> {
        self.admit_or_local_limit(region.name(), "get_match_ids_by_puuid").await?;

        let url = format!(
            "https://{}/lol/match/v5/matches/by-puuid/{}/ids?start={}&count={}",
            region.host(),
            puuid,
            start,
            count
        );
        self.send(&url).await
    }

    /// `/lol/match/v5/matches/{matchId}` — stage 3, full match fetch.
    #[instrument(skip(self))]
    pub async fn get_match_by_id(&self, region: Route, match_id: &str) -> Result<(MatchDto, UpstreamHeaders), ApiErrorKind> {
        self.admit_or_local_limit(region.name(), "get_match_by_id").await?;

        let url = format!("https://{}/lol/match/v5/matches/{}", region.host(), match_id);
        self.send(&url).await
    }

    async fn send<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<(T, UpstreamHeaders), ApiErrorKind> {
        let response = self
            .http
            .get(url)
            .header(RIOT_TOKEN_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| ApiErrorKind::Transient {
                message: format!("transport error: {e}"),
                upstream_server_error: false,
            })?;

        let status = response.status();
        let upstream_headers = extract_headers(response.headers());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &upstream_headers, &body, self.fatal_shard_on_server_error));
        }

        let body = response.text().await.map_err(|e| ApiErrorKind::Transient {
            message: format!("failed to read response body: {e}"),
            upstream_server_error: false,
        })?;
        let parsed = serde_json::from_str::<T>(&body).map_err(|e| ApiErrorKind::Abandon {
            status: status.as_u16(),
            message: format!("failed to parse response body: {e}"),
        })?;

        Ok((parsed, upstream_headers))
    }
}
