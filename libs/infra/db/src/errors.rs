// [libs/infra/db/src/errors.rs]
//! Taxonomia de errores del almacen de arrendamientos.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database connection failed: {0}")]
    ConnectionError(String),

    #[error("query failed: {0}")]
    QueryError(#[from] libsql::Error),

    #[error("row mapping failed: {0}")]
    MappingError(String),

    #[error("schema bootstrap failed: {0}")]
    SchemaError(String),
}
