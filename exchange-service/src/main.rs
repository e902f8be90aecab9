use exchange_service::{
    config, db, error, logging, migrations, routes,
    services::encryption::EncryptionService,
    state::AppState,
    store::PgStore,
    websocket::{presence::{spawn_presence_watchdog, PresenceRegistry}, ConnectionRegistry},
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    logging::init_tracing();
    let cfg = Arc::new(config::Config::from_env()?);

    // Initialize DB pool
    let pool = db::init_pool(&cfg.database_url)
        .await
        .map_err(|e| error::AppError::StartServer(format!("db: {e}")))?;

    // Run embedded migrations (idempotent). The schema must be in sync
    // before the first request.
    migrations::run_all(&pool)
        .await
        .map_err(|e| error::AppError::StartServer(format!("database migrations failed: {e}")))?;

    // Initialize JWT validation (support reading the public key from a file)
    let public_key = match std::env::var("JWT_PUBLIC_KEY_PEM") {
        Ok(pem) => pem,
        Err(_) => {
            let path = std::env::var("JWT_PUBLIC_KEY_FILE")
                .map_err(|_| error::AppError::StartServer("JWT_PUBLIC_KEY_PEM missing".into()))?;
            std::fs::read_to_string(path)
                .map_err(|e| error::AppError::StartServer(format!("read jwt pubkey file: {e}")))?
        }
    };
    crypto_core::jwt::initialize_jwt_validation_only(&public_key)
        .map_err(|e| error::AppError::StartServer(format!("init jwt: {e}")))?;

    let registry = ConnectionRegistry::new();
    let presence = PresenceRegistry::new();
    let encryption = Arc::new(EncryptionService::new(cfg.encryption_master_key));

    let state = AppState {
        store: Arc::new(PgStore::new(pool)),
        registry,
        presence: presence.clone(),
        config: cfg.clone(),
        encryption,
    };

    // Leak watchdog for the in-memory presence table
    let _watchdog = spawn_presence_watchdog(presence, cfg.presence_warn_threshold);

    let app = exchange_service::middleware::with_defaults(routes::build_router())
        .with_state(state);

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "starting exchange-service");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| error::AppError::StartServer(e.to_string()))?;
    axum::serve(listener, app.into_make_service())
        .await
        .map_err(|e| error::AppError::StartServer(e.to_string()))?;

    Ok(())
}
