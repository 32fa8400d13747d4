// [libs/domain/jobs/src/job.rs]
//! `Job`/`JobKind`: la unidad de trabajo inmutable que el worker ejecuta.
//!
//! Traducido del `QueryJob` dataclass de la implementacion original, que
//! llevaba `increment`/`on_success`/`on_error`/`on_completion` como closures
//! almacenadas. Aqui el conjunto de endpoints es cerrado (tres: enumeracion
//! de ladder, listado de ids de partida, recuperacion de partida), asi que
//! se modela como un enum etiquetado y el comportamiento vive en `match`
//! sobre la variante en vez de en closures capturadas.

use chrono::{Duration, Utc};
use tracing::warn;

use collector_domain_models::{ApiErrorKind, MatchDto, Route};
use collector_infra_db::{DbError, LeaseStore};
use collector_infra_http_client::RiotHttpClient;

/// Conjunto cerrado de operaciones que este pipeline ejecuta. Anadir una
/// cuarta etapa significa anadir una variante aqui, no una nueva closure.
#[derive(Debug, Clone)]
pub enum JobKind {
    /// Etapa 1: enumera una pagina de la ladder de una division/tier/cola.
    EnumerateLadder { queue: String, tier: String, division: String, page: u32 },
    /// Etapa 2: lista los identificadores de partida recientes de un jugador.
    ListMatchIds { puuid: String, start: u32, count: u32 },
    /// Etapa 3: recupera el registro completo de una partida.
    FetchMatch { match_id: String },
}

impl JobKind {
    /// Nombre del metodo de `RiotHttpClient` que esta variante invoca, tal
    /// como lo espera `RiotHttpClient::endpoint_window`/`window_stats`.
    pub fn method_name(&self) -> &'static str {
        match self {
            JobKind::EnumerateLadder { .. } => "get_league_entries",
            JobKind::ListMatchIds { .. } => "get_match_ids_by_puuid",
            JobKind::FetchMatch { .. } => "get_match_by_id",
        }
    }
}

/// El resultado tipado de ejecutar un `Job`, emparejado con la variante de
/// `JobKind` que lo produjo.
#[derive(Debug)]
pub enum JobOutcome {
    LadderPage(Vec<collector_domain_models::LeagueEntryDto>),
    MatchIdsPage(collector_domain_models::MatchIdsResponse),
    MatchFetched(MatchDto),
}

#[derive(Debug, Clone)]
pub struct Job {
    pub route: Route,
    pub kind: JobKind,
}

impl Job {
    pub fn new(route: Route, kind: JobKind) -> Self {
        Self { route, kind }
    }

    /// Invoca el metodo del cliente HTTP correspondiente a esta variante.
    pub async fn execute(&self, client: &RiotHttpClient) -> Result<(JobOutcome, collector_domain_models::UpstreamHeaders), ApiErrorKind> {
        match &self.kind {
            JobKind::EnumerateLadder { queue, tier, division, page } => {
                let (entries, headers) = client.get_league_entries(self.route, queue, tier, division, *page).await?;
                Ok((JobOutcome::LadderPage(entries), headers))
            }
            JobKind::ListMatchIds { puuid, start, count } => {
                let (ids, headers) = client.get_match_ids_by_puuid(self.route, puuid, *start, *count).await?;
                Ok((JobOutcome::MatchIdsPage(ids), headers))
            }
            JobKind::FetchMatch { match_id } => {
                let (dto, headers) = client.get_match_by_id(self.route, match_id).await?;
                Ok((JobOutcome::MatchFetched(dto), headers))
            }
        }
    }

    /// Regla de paginacion: construye el siguiente job por copia estructural
    /// con el cursor avanzado, o `None` si la paginacion esta agotada.
    pub fn next(&self, outcome: &JobOutcome) -> Option<Job> {
        match (&self.kind, outcome) {
            (JobKind::EnumerateLadder { queue, tier, division, page }, JobOutcome::LadderPage(entries)) => {
                if entries.is_empty() {
                    None
                } else {
                    Some(Job::new(
                        self.route,
                        JobKind::EnumerateLadder {
                            queue: queue.clone(),
                            tier: tier.clone(),
                            division: division.clone(),
                            page: page + 1,
                        },
                    ))
                }
            }
            (JobKind::ListMatchIds { puuid, start, count }, JobOutcome::MatchIdsPage(ids)) => {
                if ids.len() == *count as usize {
                    Some(Job::new(
                        self.route,
                        JobKind::ListMatchIds {
                            puuid: puuid.clone(),
                            start: start + count,
                            count: *count,
                        },
                    ))
                } else {
                    None
                }
            }
            // Etapa 3 es de una sola pagina: no hay siguiente job.
            (JobKind::FetchMatch { .. }, JobOutcome::MatchFetched(_)) => None,
            _ => None,
        }
    }

    /// Persiste el resultado. Invocado exactamente una vez por respuesta
    /// exitosa, antes de que el worker decida el siguiente paso.
    pub async fn on_success(&self, store: &LeaseStore, outcome: &JobOutcome) -> Result<(), DbError> {
        match (&self.kind, outcome) {
            (JobKind::EnumerateLadder { .. }, JobOutcome::LadderPage(entries)) => {
                let puuids: Vec<String> = entries.iter().map(|e| e.puuid.clone()).collect();
                if !puuids.is_empty() {
                    store.insert_users(self.route.name(), &puuids).await?;
                }
                Ok(())
            }
            (JobKind::ListMatchIds { .. }, JobOutcome::MatchIdsPage(ids)) => {
                if !ids.is_empty() {
                    store.insert_match_ids(self.route.name(), ids).await?;
                }
                Ok(())
            }
            (JobKind::FetchMatch { match_id }, JobOutcome::MatchFetched(dto)) => {
                let (row, participants) = dto.clone().into_rows(self.route.name());
                store.insert_match(&row, &participants).await?;
                store.mark_match_id_queried(match_id).await?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Invocado cuando `next` devuelve `None`: la cadena de paginas para este
    /// linaje de job ha terminado.
    pub async fn on_completion(&self, store: &LeaseStore) -> Result<(), DbError> {
        if let JobKind::ListMatchIds { puuid, .. } = &self.kind {
            store.mark_user_match_ids_queried(puuid).await?;
        }
        Ok(())
    }

    /// Invocado para errores no transitorios que provocan el abandono del job.
    pub fn on_error(&self, err: &ApiErrorKind) {
        warn!(route = %self.route, kind = ?self.kind, error = %err, "job abandoned");
    }
}

/// Ventana deslizante por defecto para `ListMatchIds`: hasta cuantos dias
/// atras se considera "reciente" un `users` reclamado de nuevo.
pub const DEFAULT_LAST_QUERIED_LOOKBACK_DAYS: i64 = 100;

pub fn lookback_cutoff() -> chrono::DateTime<Utc> {
    Utc::now() - Duration::days(DEFAULT_LAST_QUERIED_LOOKBACK_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use collector_domain_models::{LeagueEntryDto, Platform};

    fn ladder_job() -> Job {
        Job::new(
            Route::from(Platform::Na1),
            JobKind::EnumerateLadder {
                queue: "RANKED_SOLO_5x5".to_string(),
                tier: "DIAMOND".to_string(),
                division: "I".to_string(),
                page: 3,
            },
        )
    }

    #[test]
    fn ladder_pagination_continues_while_entries_are_nonempty() {
        let job = ladder_job();
        let outcome = JobOutcome::LadderPage(vec![LeagueEntryDto {
            puuid: "abc".to_string(),
            league_points: 80,
            wins: 10,
            losses: 5,
        }]);
        let next = job.next(&outcome).expect("should page forward");
        match next.kind {
            JobKind::EnumerateLadder { page, .. } => assert_eq!(page, 4),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn ladder_pagination_stops_on_empty_page() {
        let job = ladder_job();
        let outcome = JobOutcome::LadderPage(vec![]);
        assert!(job.next(&outcome).is_none());
    }

    #[test]
    fn match_ids_page_stops_when_shorter_than_count() {
        let job = Job::new(
            Route::from(collector_domain_models::Region::Americas),
            JobKind::ListMatchIds { puuid: "abc".to_string(), start: 0, count: 20 },
        );
        assert!(job.next(&JobOutcome::MatchIdsPage(vec!["NA1_1".to_string()])).is_none());
    }

    #[test]
    fn match_ids_page_advances_start_when_full() {
        let job = Job::new(
            Route::from(collector_domain_models::Region::Americas),
            JobKind::ListMatchIds { puuid: "abc".to_string(), start: 0, count: 2 },
        );
        let outcome = JobOutcome::MatchIdsPage(vec!["NA1_1".to_string(), "NA1_2".to_string()]);
        let next = job.next(&outcome).expect("full page should advance");
        match next.kind {
            JobKind::ListMatchIds { start, count, .. } => {
                assert_eq!(start, 2);
                assert_eq!(count, 2);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn fetch_match_never_pages() {
        let job = Job::new(
            Route::from(collector_domain_models::Region::Americas),
            JobKind::FetchMatch { match_id: "NA1_1".to_string() },
        );
        assert!(job.next(&JobOutcome::MatchFetched(collector_domain_models::MatchDto {
            metadata: collector_domain_models::MatchMetadataDto { match_id: "NA1_1".to_string() },
            info: collector_domain_models::MatchInfoDto {
                game_duration: 1800,
                game_mode: "CLASSIC".to_string(),
                game_version: "14.1.1".to_string(),
                queue_id: 420,
                game_start_timestamp: 1_700_000_000_000,
                participants: vec![],
            },
        }))
        .is_none());
    }
}
