// [libs/infra/db/src/schema.rs]
//! Bootstrap del esquema: las dos tablas de arrendamiento que el nucleo
//! exige (spec S6) mas la proyeccion normalizada minima (`matches`,
//! `match_participants`) que demuestra el contrato de extremo a extremo.

use libsql::Connection;

use crate::errors::DbError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS match_ids (
    match_id    TEXT PRIMARY KEY,
    region_name TEXT NOT NULL,
    queried     INTEGER NOT NULL DEFAULT 0,
    lease_until TEXT NOT NULL DEFAULT '0001-01-01T00:00:00Z'
);

CREATE TABLE IF NOT EXISTS users (
    puuid              TEXT PRIMARY KEY,
    platform_name      TEXT NOT NULL,
    match_ids_queried  TEXT NOT NULL DEFAULT '0001-01-01T00:00:00Z',
    lease_until        TEXT NOT NULL DEFAULT '0001-01-01T00:00:00Z'
);

CREATE TABLE IF NOT EXISTS matches (
    match_id             TEXT PRIMARY KEY,
    region_name          TEXT NOT NULL,
    game_duration        INTEGER NOT NULL,
    game_mode            TEXT NOT NULL,
    game_version         TEXT NOT NULL,
    queue_id             INTEGER NOT NULL,
    game_start_timestamp INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS match_participants (
    match_id      TEXT NOT NULL REFERENCES matches(match_id),
    puuid         TEXT NOT NULL,
    team_id       INTEGER NOT NULL,
    champion_name TEXT NOT NULL,
    win           INTEGER NOT NULL,
    kills         INTEGER NOT NULL,
    deaths        INTEGER NOT NULL,
    assists       INTEGER NOT NULL,
    PRIMARY KEY (match_id, puuid)
);

CREATE INDEX IF NOT EXISTS idx_match_ids_claim ON match_ids (region_name, queried, lease_until);
CREATE INDEX IF NOT EXISTS idx_users_claim ON users (platform_name, match_ids_queried, lease_until);
"#;

/// Aplica el esquema completo. Idempotente: cada sentencia usa `IF NOT EXISTS`.
pub async fn apply_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA)
        .await
        .map_err(|e| DbError::SchemaError(e.to_string()))
}
