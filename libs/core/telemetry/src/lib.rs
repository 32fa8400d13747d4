// [libs/core/telemetry/src/lib.rs]
//! Estructura de observabilidad compartida por todos los binarios del workspace.
//!
//! Expone un unico punto de ignicion, `init_tracing`, que configura un
//! subscriber dual: formato compacto y legible en desarrollo, JSON aplanado
//! en release, mas un panic hook que enruta cualquier colapso de hilo a traves
//! del mismo pipeline de logs en lugar de dejarlo caer a stderr sin estructura.

use std::panic;
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Inicializa el subscriber global de trazado para `service_name`.
///
/// El filtro por defecto silencia el ruido de infraestructura (`hyper`,
/// `reqwest`, `libsql`) y deja el resto de los objetivos al nivel `debug` en
/// builds de desarrollo y `info` en release, salvo que `RUST_LOG` lo
/// sobreescriba explicitamente.
///
/// # Panics
/// Entra en panico si otro subscriber global ya fue instalado en este proceso.
pub fn init_tracing(service_name: &str) {
    let environmental_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{service_name}={level},reqwest=warn,hyper=warn,libsql=error",
            level = if cfg!(debug_assertions) { "debug" } else { "info" }
        )
        .into()
    });

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(environmental_filter)
            .with(fmt::layer().compact().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(environmental_filter)
            .with(fmt::layer().json().flatten_event(true))
            .init();
    }

    install_panic_hook(service_name);

    tracing::info!("telemetry initialized for service '{service_name}'");
}

/// Instala un panic hook que registra la ubicacion y el payload del panico
/// como un evento `tracing::error!` antes de dejar que el proceso continue
/// su desenrollado normal.
fn install_panic_hook(service_name: &str) {
    let service_id = service_name.to_string();

    panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("<non-string panic payload>");

        error!(
            target: "panic_monitor",
            service = %service_id,
            location = %location,
            "thread panicked: {payload}"
        );
    }));
}
