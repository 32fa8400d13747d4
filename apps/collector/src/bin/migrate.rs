// [apps/collector/src/bin/migrate.rs]
//! Binario de mantenimiento: aplica el esquema del almacen de arrendamientos
//! y sale. `DbClient::connect` ya aplica el esquema en cada arranque del
//! proceso principal, asi que este binario existe solo para darle al
//! operador un punto de entrada explicito e idempotente ("corre las
//! migraciones ahora mismo y confirma").
//!
//! Grounded on `apps/orchestrator/src/bin/migrator.rs` for the dotenv +
//! tracing + connect-and-report shape.

use clap::Parser;
use tracing::{error, info};

use collector::Config;
use collector_infra_db::DbClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::parse();

    collector_core_telemetry::init_tracing("collector-migrate");

    info!(database_url = %config.database_url, "applying schema");

    match DbClient::connect(&config.database_url, config.database_auth_token.clone()).await {
        Ok(_) => {
            info!("schema applied successfully");
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "schema application failed");
            std::process::exit(1);
        }
    }
}
