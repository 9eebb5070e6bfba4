use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use park_vehicle_ledger::clients::VehicleRegistryClient;
use park_vehicle_ledger::config::AppConfig;
use park_vehicle_ledger::database;
use park_vehicle_ledger::repositories::Stores;
use park_vehicle_ledger::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = Arc::new(AppConfig::from_env().context("configuración inválida")?);

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🏭 Park Vehicle Ledger - API de cumplimiento de vehículos");
    info!("================================================");
    info!("🌍 Entorno: {}", config.environment);

    // Inicializar almacenamiento
    let stores = match &config.database {
        Some(db_config) => match database::connect(db_config).await {
            Ok(pool) => {
                info!("✅ PostgreSQL conectado");
                Stores::postgres(pool)
            }
            Err(e) => {
                error!("❌ Error conectando a la base de datos: {:#}", e);
                return Err(e);
            }
        },
        None if config.is_production() => {
            error!("❌ DATABASE_URL es obligatoria en producción");
            anyhow::bail!("DATABASE_URL no definida en producción");
        }
        None => {
            warn!("⚠️ DATABASE_URL no definida: usando almacenamiento en memoria (los datos no persisten)");
            Stores::in_memory()
        }
    };

    if config.registry.base_url.is_empty() {
        warn!("⚠️ THIRD_PARTY_BASE_URL no definida: /mini-program/get-car-data responderá 503");
    }
    let registry = VehicleRegistryClient::with_reqwest(config.registry.clone())
        .context("no se pudo crear el cliente HTTP del registro de vehículos")?;

    let app_state = AppState::new(Arc::clone(&config), stores, registry);
    let app = build_router(app_state);

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("dirección inválida {}", config.server_url()))?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🚚 Vehículos (/api/v1/external-vehicles | internal-vehicles | non-road):");
    info!("   POST / | GET / | GET/PUT/DELETE /:id");
    info!("   POST /:id/dispatch | POST /dispatch/batch | POST /:id/audit (externos)");
    info!("🏭 Parques (/api/v1/parks):");
    info!("   POST / | GET / | GET/PUT/DELETE /:id | POST /login");
    info!("   POST /:id/renew | GET /:id/download | GET /:id/validity | POST /:id/credentials/reset");
    info!("   GET  /api/v1/renewals - Historial de renovaciones");
    info!("🔳 Códigos QR (/api/v1/qrcodes/:tipo?park_id=):");
    info!("   GET /external-vehicle | /internal-vehicle | /non-road");
    info!("   POST /:tipo/update");
    info!("📱 Mini-programa (/api/v1/mini-program):");
    info!("   POST /scan | POST /vehicle | POST /get-car-data");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el manejador de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el manejador de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
