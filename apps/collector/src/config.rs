// [apps/collector/src/config.rs]
//! Directivas de arranque del orquestador: leidas del entorno del proceso
//! (con soporte de `.env` via `dotenvy` en `main`), con overrides opcionales
//! por linea de comandos.
//!
//! Grounded on `apps/miner-worker/src/main.rs`'s `SovereignWorkerDirectives`
//! for the `clap::Parser` + `#[arg(long, env = "...")]` shape, y en S6 para
//! el nombre y valor por defecto de cada variable.

use clap::Parser;

use collector_domain_models::{Platform, Region};

#[derive(Parser, Debug)]
#[command(name = "collector", about = "Recolector de historial de partidas del Riot API")]
pub struct Config {
    /// Credencial enviada en la cabecera `X-Riot-Token`.
    #[arg(long, env = "RIOT_API_KEY")]
    pub riot_api_key: String,

    /// Cadena de conexion del almacen persistente (archivo local, `:memory:`,
    /// o endpoint remoto `libsql://`/`https://`).
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Token de portador para una conexion remota; requerido solo cuando
    /// `database_url` apunta a un endpoint remoto.
    #[arg(long, env = "DATABASE_AUTH_TOKEN")]
    pub database_auth_token: Option<String>,

    /// Informativo unicamente: `libsql::Builder` no expone un pool propio,
    /// cada `DbClient::connection()` abre una conexion nueva sobre el mismo
    /// `Database` compartido.
    #[arg(long, env = "DB_POOL_MAX_SIZE", default_value_t = 10)]
    pub db_pool_max_size: u32,

    #[arg(long, env = "WORKERS_PER_REGION", default_value_t = 1)]
    pub workers_per_region: usize,

    #[arg(long, env = "WORKERS_PER_PLATFORM", default_value_t = 1)]
    pub workers_per_platform: usize,

    #[arg(long, env = "REFILL_QUEUE_THRESHOLD", default_value_t = 50)]
    pub refill_queue_threshold: usize,

    #[arg(long, env = "JOB_FACTORY_BATCH_SIZE", default_value_t = 20)]
    pub job_factory_batch_size: u32,

    #[arg(long, env = "QUEUE_TIMEOUT_SECONDS", default_value_t = 5)]
    pub queue_timeout_seconds: u64,

    #[arg(long, env = "HTTP_ERROR_TIMEOUT_SECONDS", default_value_t = 10)]
    pub http_error_timeout_seconds: u64,

    #[arg(long, env = "LEASE_DURATION_MINUTES", default_value_t = 30)]
    pub lease_duration_minutes: i64,

    /// Promueve `ServerErrorSleep` (5xx repetido) a `stop_shard` en lugar de
    /// reintentar indefinidamente. Decision de diseno documentada en DESIGN.md.
    #[arg(long, env = "FATAL_SHARD_ON_SERVER_ERROR", default_value_t = false)]
    pub fatal_shard_on_server_error: bool,

    /// Plataformas a recolectar, separadas por comas (p. ej. `na1,euw1`).
    /// Vacio por defecto: se usan todas las de `Platform::ALL`.
    #[arg(long, value_delimiter = ',')]
    pub platforms: Vec<String>,

    /// Regiones a recolectar, separadas por comas (p. ej. `americas,europe`).
    /// Vacio por defecto: se usan todas las de `Region::ALL`.
    #[arg(long, value_delimiter = ',')]
    pub regions: Vec<String>,

    /// Si esta activo, registra la configuracion resuelta y sale sin
    /// conectar a la base de datos ni al upstream.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl Config {
    /// Resuelve `--platforms` a la lista concreta de `Platform`s a recolectar,
    /// rechazando cualquier nombre que no reconozca `Platform::parse`.
    pub fn resolve_platforms(&self) -> anyhow::Result<Vec<Platform>> {
        if self.platforms.is_empty() {
            return Ok(Platform::ALL.to_vec());
        }
        self.platforms
            .iter()
            .map(|name| {
                Platform::parse(name.trim()).ok_or_else(|| anyhow::anyhow!("unknown platform: '{name}'"))
            })
            .collect()
    }

    /// Resuelve `--regions` a la lista concreta de `Region`s a recolectar.
    pub fn resolve_regions(&self) -> anyhow::Result<Vec<Region>> {
        if self.regions.is_empty() {
            return Ok(Region::ALL.to_vec());
        }
        self.regions
            .iter()
            .map(|name| Region::parse(name.trim()).ok_or_else(|| anyhow::anyhow!("unknown region: '{name}'")))
            .collect()
    }

    pub fn lease_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.lease_duration_minutes)
    }

    pub fn queue_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.queue_timeout_seconds)
    }

    pub fn worker_timeouts(&self) -> collector_core_pipeline::WorkerTimeouts {
        collector_core_pipeline::WorkerTimeouts {
            queue_timeout: self.queue_timeout(),
            http_error_timeout: std::time::Duration::from_secs(self.http_error_timeout_seconds),
            ..Default::default()
        }
    }
}

/// Combinaciones de cola/tier/division enumeradas por la ladder de cada
/// plataforma (stage 1). `MASTER`/`GRANDMASTER`/`CHALLENGER` usan un
/// endpoint separado no cubierto por este pipeline y quedan fuera.
pub const LADDER_QUEUES: &[&str] = &["RANKED_SOLO_5x5", "RANKED_FLEX_SR"];
pub const LADDER_TIERS: &[&str] = &["IRON", "BRONZE", "SILVER", "GOLD", "PLATINUM", "EMERALD", "DIAMOND"];
pub const LADDER_DIVISIONS: &[&str] = &["I", "II", "III", "IV"];

/// Tamano de pagina de `ListMatchIds` (stage 2); el upstream acepta hasta 100.
pub const MATCH_IDS_PAGE_SIZE: u32 = 100;

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            riot_api_key: "RGAPI-test".to_string(),
            database_url: ":memory:".to_string(),
            database_auth_token: None,
            db_pool_max_size: 10,
            workers_per_region: 1,
            workers_per_platform: 1,
            refill_queue_threshold: 50,
            job_factory_batch_size: 20,
            queue_timeout_seconds: 5,
            http_error_timeout_seconds: 10,
            lease_duration_minutes: 30,
            fatal_shard_on_server_error: false,
            platforms: vec![],
            regions: vec![],
            dry_run: false,
        }
    }

    #[test]
    fn empty_platforms_resolves_to_all() {
        let config = base_config();
        assert_eq!(config.resolve_platforms().unwrap().len(), Platform::ALL.len());
    }

    #[test]
    fn explicit_platforms_are_parsed() {
        let mut config = base_config();
        config.platforms = vec!["na1".to_string(), "euw1".to_string()];
        let resolved = config.resolve_platforms().unwrap();
        assert_eq!(resolved, vec![Platform::Na1, Platform::Euw1]);
    }

    #[test]
    fn unknown_platform_is_rejected() {
        let mut config = base_config();
        config.platforms = vec!["atlantis".to_string()];
        assert!(config.resolve_platforms().is_err());
    }

    #[test]
    fn empty_regions_resolves_to_all() {
        let config = base_config();
        assert_eq!(config.resolve_regions().unwrap().len(), Region::ALL.len());
    }

    #[test]
    fn explicit_regions_are_parsed() {
        let mut config = base_config();
        config.regions = vec!["asia".to_string()];
        assert_eq!(config.resolve_regions().unwrap(), vec![Region::Asia]);
    }
}
