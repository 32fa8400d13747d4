// [libs/infra/db/src/client.rs]
//! Conexion al cluster libsql (local, en memoria, o remoto via Turso) y
//! bootstrap del esquema.
//!
//! Grounded on `libs/infra/db-turso/src/client.rs`: detecta URLs remotas
//! (`libsql://`, `https://`) frente a locales, y en modo memoria mantiene
//! una conexion ancla viva para que SQLite no purgue las tablas entre
//! conexiones del mismo proceso.

use std::sync::Arc;

use libsql::{Builder, Connection, Database};
use tracing::info;

use crate::errors::DbError;
use crate::schema::apply_schema;

#[derive(Clone)]
pub struct DbClient {
    database: Arc<Database>,
    _memory_anchor: Option<Arc<Connection>>,
}

impl DbClient {
    pub async fn connect(database_url: &str, auth_token: Option<String>) -> Result<Self, DbError> {
        if database_url.is_empty() {
            return Err(DbError::ConnectionError("DATABASE_URL is empty".to_string()));
        }

        let is_remote = database_url.starts_with("libsql://") || database_url.starts_with("https://");
        let is_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        info!(database_url, is_remote, is_memory, "connecting to database");

        let database = if is_remote {
            let token = auth_token.ok_or_else(|| {
                DbError::ConnectionError("DATABASE_AUTH_TOKEN required for a remote database".to_string())
            })?;
            Builder::new_remote(database_url.to_string(), token)
                .build()
                .await
                .map_err(|e| DbError::ConnectionError(e.to_string()))?
        } else {
            Builder::new_local(database_url)
                .build()
                .await
                .map_err(|e| DbError::ConnectionError(e.to_string()))?
        };

        let database = Arc::new(database);
        let mut anchor = None;

        if is_memory {
            let anchor_conn = database.connect().map_err(|e| DbError::ConnectionError(e.to_string()))?;
            apply_schema(&anchor_conn).await?;
            anchor = Some(Arc::new(anchor_conn));
        } else {
            let bootstrap_conn = database.connect().map_err(|e| DbError::ConnectionError(e.to_string()))?;
            apply_schema(&bootstrap_conn).await?;
        }

        Ok(Self {
            database,
            _memory_anchor: anchor,
        })
    }

    pub fn connection(&self) -> Result<Connection, DbError> {
        self.database.connect().map_err(|e| DbError::ConnectionError(e.to_string()))
    }
}
