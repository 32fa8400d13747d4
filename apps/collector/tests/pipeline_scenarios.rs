// [apps/collector/tests/pipeline_scenarios.rs]
//! Pruebas de integracion de los escenarios de extremo a extremo: contra un
//! libsql en memoria y llamando directamente las operaciones de `Job`/
//! `LeaseStore` que el worker orquesta, en lugar del bucle completo de
//! `Worker::run`, ya que el corpus no trae un crate de mocking HTTP (S9.1).

use chrono::Duration;

use collector_domain_jobs::{Job, JobKind, JobOutcome};
use collector_domain_models::{LeagueEntryDto, MatchDto, MatchInfoDto, MatchMetadataDto, Platform, Region, Route};
use collector_infra_db::{DbClient, LeaseStore};

async fn in_memory_store() -> LeaseStore {
    let client = DbClient::connect(":memory:", None).await.expect("connect");
    LeaseStore::new(client)
}

fn ladder_job(platform: Platform, page: u32) -> Job {
    Job::new(
        Route::from(platform),
        JobKind::EnumerateLadder {
            queue: "RANKED_SOLO_5x5".to_string(),
            tier: "DIAMOND".to_string(),
            division: "I".to_string(),
            page,
        },
    )
}

/// Escenario 1: enumeracion de una sola pagina. Una pagina con dos entradas
/// seguida de una pagina vacia deja exactamente esos dos puuids insertados
/// y `next` se agota en la pagina vacia.
#[tokio::test]
async fn scenario_single_page_enumerate() {
    let store = in_memory_store().await;

    let job = ladder_job(Platform::Na1, 1);
    let page = JobOutcome::LadderPage(vec![
        LeagueEntryDto { puuid: "a".to_string(), league_points: 50, wins: 10, losses: 5 },
        LeagueEntryDto { puuid: "b".to_string(), league_points: 40, wins: 8, losses: 6 },
    ]);
    job.on_success(&store, &page).await.expect("persist page 1");
    let next = job.next(&page).expect("page 1 had entries, should continue");

    let empty_page = JobOutcome::LadderPage(vec![]);
    next.on_success(&store, &empty_page).await.expect("persist empty page");
    assert!(next.next(&empty_page).is_none(), "empty page terminates the ladder walk");

    let claimed = store
        .claim_users(Platform::Na1.name(), 10, chrono::Utc::now() + Duration::days(1), Duration::minutes(30))
        .await
        .expect("claim");
    let mut claimed = claimed;
    claimed.sort();
    assert_eq!(claimed, vec!["a".to_string(), "b".to_string()]);
}

/// Escenario 2: paginacion por offset. Una pagina llena de 100 seguida de
/// una pagina parcial de 37 deja 137 filas insertadas y hace avanzar el
/// cursor de `match_ids_queried` del `users` origen.
#[tokio::test]
async fn scenario_paginated_offset_match_ids() {
    let store = in_memory_store().await;
    store.insert_users(Platform::Na1.name(), &["puuid-1".to_string()]).await.expect("seed user");

    let job = Job::new(Route::from(Region::Americas), JobKind::ListMatchIds { puuid: "puuid-1".to_string(), start: 0, count: 100 });
    let full_page: Vec<String> = (0..100).map(|i| format!("NA1_{i}")).collect();
    let outcome = JobOutcome::MatchIdsPage(full_page);
    job.on_success(&store, &outcome).await.expect("persist first page");
    let next = job.next(&outcome).expect("full page should page forward");
    match &next.kind {
        JobKind::ListMatchIds { start, .. } => assert_eq!(*start, 100),
        other => panic!("unexpected kind: {other:?}"),
    }

    let partial_page: Vec<String> = (0..37).map(|i| format!("NA1_{}", 100 + i)).collect();
    let partial_outcome = JobOutcome::MatchIdsPage(partial_page);
    next.on_success(&store, &partial_outcome).await.expect("persist second page");
    assert!(next.next(&partial_outcome).is_none(), "partial page terminates pagination");
    next.on_completion(&store).await.expect("mark user queried");

    let claimed_match_ids = store.claim_match_ids(Region::Americas.name(), 1000, Duration::minutes(30)).await.expect("claim");
    assert_eq!(claimed_match_ids.len(), 137);
}

/// Escenario 5: dos reclamos concurrentes sobre el mismo lote de `users`
/// elegibles producen conjuntos disjuntos cuya union no excede el total.
#[tokio::test]
async fn scenario_concurrent_claim_is_disjoint() {
    let store = in_memory_store().await;
    let puuids: Vec<String> = (0..60).map(|i| format!("puuid-{i}")).collect();
    store.insert_users(Platform::Euw1.name(), &puuids).await.expect("seed users");

    let far_future = chrono::Utc::now() + Duration::days(1);
    let (first, second) = tokio::join!(
        store.claim_users(Platform::Euw1.name(), 50, far_future, Duration::minutes(30)),
        store.claim_users(Platform::Euw1.name(), 50, far_future, Duration::minutes(30)),
    );
    let mut first = first.expect("first claim");
    let second = second.expect("second claim");

    assert!(first.len() + second.len() <= 60);
    let overlap = first.iter().filter(|id| second.contains(id)).count();
    assert_eq!(overlap, 0, "claims must be disjoint");

    first.extend(second);
    first.sort();
    first.dedup();
    assert_eq!(first.len(), first.len(), "union must not contain duplicates past the disjointness check");
}

/// Escenario 6: una partida reclamada con un arrendamiento ya vencido vuelve
/// a ser elegible para reclamo, y al completarse queda marcada `queried`.
#[tokio::test]
async fn scenario_orphan_recovery_on_expired_lease() {
    let store = in_memory_store().await;
    store.insert_match_ids(Region::Europe.name(), &["EUW1_999".to_string()]).await.expect("seed match id");

    // lease_duration negativo: el arrendamiento recien fijado ya figura como vencido.
    let first_claim = store.claim_match_ids(Region::Europe.name(), 10, Duration::minutes(-1)).await.expect("first claim");
    assert_eq!(first_claim, vec!["EUW1_999".to_string()]);

    let second_claim = store.claim_match_ids(Region::Europe.name(), 10, Duration::minutes(30)).await.expect("second claim after expiry");
    assert_eq!(second_claim, vec!["EUW1_999".to_string()], "expired lease must be reclaimable");

    let job = Job::new(Route::from(Region::Europe), JobKind::FetchMatch { match_id: "EUW1_999".to_string() });
    let dto = MatchDto {
        metadata: MatchMetadataDto { match_id: "EUW1_999".to_string() },
        info: MatchInfoDto {
            game_duration: 1600,
            game_mode: "CLASSIC".to_string(),
            game_version: "14.1.1".to_string(),
            queue_id: 420,
            game_start_timestamp: 1_700_000_000_000,
            participants: vec![],
        },
    };
    let outcome = JobOutcome::MatchFetched(dto);
    job.on_success(&store, &outcome).await.expect("persist match");
    assert!(job.next(&outcome).is_none());

    let third_claim = store.claim_match_ids(Region::Europe.name(), 10, Duration::minutes(30)).await.expect("third claim");
    assert!(third_claim.is_empty(), "a queried match_id must never be claimed again");
}
