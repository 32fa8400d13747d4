// [libs/infra/db/src/store.rs]
/*!
 * =================================================================
 * APARATO: LEASE STORE OPERATIONS
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: RECLAMO ATOMICO, MARCADO DE CONSULTADO, INSERCION
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. UNA SOLA SENTENCIA: cada reclamo es un `UPDATE ... FROM (SELECT
 *    ... ORDER BY lease_until LIMIT ...) ... RETURNING`, nunca un
 *    SELECT seguido de un UPDATE separado — dos workers no pueden
 *    reclamar la misma fila.
 * 2. MAPEO DIRECTO: las filas de libsql se mapean a los tipos de
 *    dominio en el sitio; no hay una capa de DTO intermedia sin uso.
 * =================================================================
 */
//!
//! Grounded on `examples/original_source/collector/db/matches.py::claim_matches`
//! and `db/users.py::claim_users` for the exact CTE shape (claim a batch
//! ordered by lease expiry, pin a fresh lease, return the claimed ids in one
//! round trip) and on `libs/infra/db-turso/src/repositories/job/mod.rs` for
//! the Rust `Connection`/`params!`/row-mapping idiom.

use chrono::{DateTime, Duration, Utc};
use libsql::params;
use tracing::instrument;

use collector_domain_models::{MatchParticipantRow, MatchRow};

use crate::client::DbClient;
use crate::errors::DbError;

const EPOCH_FLOOR: &str = "0001-01-01T00:00:00Z";

#[derive(Clone)]
pub struct LeaseStore {
    client: DbClient,
}

impl LeaseStore {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    /// Reclama hasta `batch_size` `match_id`s pendientes de una region, fijando
    /// un nuevo `lease_until` en el mismo paso. Orden por `lease_until` para
    /// evitar la inanicion de filas con arrendamientos ya expirados antiguos.
    #[instrument(skip(self))]
    pub async fn claim_match_ids(
        &self,
        region_name: &str,
        batch_size: u32,
        lease_duration: Duration,
    ) -> Result<Vec<String>, DbError> {
        let conn = self.client.connection()?;
        let now = Utc::now();
        let lease_until = now + lease_duration;

        let mut rows = conn
            .query(
                r#"
                WITH claimed AS (
                    SELECT match_id
                    FROM match_ids
                    WHERE region_name = ?1
                      AND queried = 0
                      AND lease_until < ?2
                    ORDER BY lease_until, match_id
                    LIMIT ?3
                )
                UPDATE match_ids
                SET lease_until = ?4
                FROM claimed
                WHERE match_ids.match_id = claimed.match_id
                RETURNING match_ids.match_id
                "#,
                params![region_name, now.to_rfc3339(), batch_size, lease_until.to_rfc3339()],
            )
            .await?;

        let mut claimed = Vec::new();
        while let Some(row) = rows.next().await? {
            claimed.push(row.get::<String>(0)?);
        }
        Ok(claimed)
    }

    /// Reclama hasta `batch_size` `puuid`s cuyo listado de partidas no se ha
    /// consultado desde `last_queried_before` y cuyo arrendamiento ha expirado.
    #[instrument(skip(self))]
    pub async fn claim_users(
        &self,
        platform_name: &str,
        batch_size: u32,
        last_queried_before: DateTime<Utc>,
        lease_duration: Duration,
    ) -> Result<Vec<String>, DbError> {
        let conn = self.client.connection()?;
        let now = Utc::now();
        let lease_until = now + lease_duration;

        let mut rows = conn
            .query(
                r#"
                WITH claimed AS (
                    SELECT puuid
                    FROM users
                    WHERE platform_name = ?1
                      AND match_ids_queried < ?2
                      AND lease_until < ?3
                    ORDER BY lease_until, puuid
                    LIMIT ?4
                )
                UPDATE users
                SET lease_until = ?5
                FROM claimed
                WHERE users.puuid = claimed.puuid
                RETURNING users.puuid
                "#,
                params![
                    platform_name,
                    last_queried_before.to_rfc3339(),
                    now.to_rfc3339(),
                    batch_size,
                    lease_until.to_rfc3339()
                ],
            )
            .await?;

        let mut claimed = Vec::new();
        while let Some(row) = rows.next().await? {
            claimed.push(row.get::<String>(0)?);
        }
        Ok(claimed)
    }

    #[instrument(skip(self))]
    pub async fn mark_match_id_queried(&self, match_id: &str) -> Result<(), DbError> {
        let conn = self.client.connection()?;
        conn.execute("UPDATE match_ids SET queried = 1 WHERE match_id = ?1", params![match_id])
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn mark_user_match_ids_queried(&self, puuid: &str) -> Result<(), DbError> {
        let conn = self.client.connection()?;
        conn.execute(
            "UPDATE users SET match_ids_queried = ?1 WHERE puuid = ?2",
            params![Utc::now().to_rfc3339(), puuid],
        )
        .await?;
        Ok(())
    }

    /// Inserta nuevas filas `users` descubiertas por la enumeracion de ladder
    /// de la etapa 1. Conflictos (puuid ya conocido) se ignoran.
    #[instrument(skip(self, puuids))]
    pub async fn insert_users(&self, platform_name: &str, puuids: &[String]) -> Result<(), DbError> {
        let conn = self.client.connection()?;
        for puuid in puuids {
            conn.execute(
                "INSERT INTO users (puuid, platform_name, match_ids_queried, lease_until) VALUES (?1, ?2, ?3, ?3) ON CONFLICT(puuid) DO NOTHING",
                params![puuid.as_str(), platform_name, EPOCH_FLOOR],
            )
            .await?;
        }
        Ok(())
    }

    /// Inserta nuevos `match_id`s descubiertos por la etapa 2. Conflictos se
    /// ignoran.
    #[instrument(skip(self, match_ids))]
    pub async fn insert_match_ids(&self, region_name: &str, match_ids: &[String]) -> Result<(), DbError> {
        let conn = self.client.connection()?;
        for match_id in match_ids {
            conn.execute(
                "INSERT INTO match_ids (match_id, region_name) VALUES (?1, ?2) ON CONFLICT(match_id) DO NOTHING",
                params![match_id.as_str(), region_name],
            )
            .await?;
        }
        Ok(())
    }

    /// Persiste la proyeccion normalizada de una partida completa. Idempotente:
    /// la fila de `matches` y las de `match_participants` se insertan con
    /// `ON CONFLICT DO NOTHING` por clave primaria.
    #[instrument(skip(self, row, participants))]
    pub async fn insert_match(&self, row: &MatchRow, participants: &[MatchParticipantRow]) -> Result<(), DbError> {
        let conn = self.client.connection()?;
        let tx = conn.transaction().await?;

        tx.execute(
            r#"
            INSERT INTO matches (match_id, region_name, game_duration, game_mode, game_version, queue_id, game_start_timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(match_id) DO NOTHING
            "#,
            params![
                row.match_id.as_str(),
                row.region_name.as_str(),
                row.game_duration,
                row.game_mode.as_str(),
                row.game_version.as_str(),
                row.queue_id,
                row.game_start_timestamp
            ],
        )
        .await?;

        for p in participants {
            tx.execute(
                r#"
                INSERT INTO match_participants (match_id, puuid, team_id, champion_name, win, kills, deaths, assists)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(match_id, puuid) DO NOTHING
                "#,
                params![
                    p.match_id.as_str(),
                    p.puuid.as_str(),
                    p.team_id,
                    p.champion_name.as_str(),
                    p.win,
                    p.kills,
                    p.deaths,
                    p.assists
                ],
            )
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> LeaseStore {
        let client = DbClient::connect(":memory:", None).await.unwrap();
        LeaseStore::new(client)
    }

    #[tokio::test]
    async fn claim_match_ids_returns_only_unqueried_unexpired_rows() {
        let store = memory_store().await;
        store
            .insert_match_ids("americas", &["NA1_1".to_string(), "NA1_2".to_string()])
            .await
            .unwrap();

        let claimed = store.claim_match_ids("americas", 10, Duration::minutes(30)).await.unwrap();
        assert_eq!(claimed.len(), 2);

        let second = store.claim_match_ids("americas", 10, Duration::minutes(30)).await.unwrap();
        assert!(second.is_empty(), "freshly leased rows should not be reclaimed");
    }

    #[tokio::test]
    async fn mark_match_id_queried_excludes_it_from_future_claims() {
        let store = memory_store().await;
        store.insert_match_ids("americas", &["NA1_1".to_string()]).await.unwrap();
        store.claim_match_ids("americas", 10, Duration::minutes(0)).await.unwrap();
        store.mark_match_id_queried("NA1_1").await.unwrap();

        let claimed = store.claim_match_ids("americas", 10, Duration::minutes(30)).await.unwrap();
        assert!(claimed.is_empty());
    }

    #[tokio::test]
    async fn insert_match_is_idempotent() {
        let store = memory_store().await;
        let row = MatchRow {
            match_id: "NA1_1".to_string(),
            region_name: "americas".to_string(),
            game_duration: 1800,
            game_mode: "CLASSIC".to_string(),
            game_version: "14.1.1".to_string(),
            queue_id: 420,
            game_start_timestamp: 1_700_000_000_000,
        };
        let participants = vec![MatchParticipantRow {
            match_id: "NA1_1".to_string(),
            puuid: "abc".to_string(),
            team_id: 100,
            champion_name: "Ahri".to_string(),
            win: true,
            kills: 5,
            deaths: 2,
            assists: 10,
        }];

        store.insert_match(&row, &participants).await.unwrap();
        store.insert_match(&row, &participants).await.unwrap();
    }
}
