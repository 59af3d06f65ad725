use starnight::orchestration::GachaService;
use starnight::{api, catalog::Catalog, config::Config, db::init_db, SqliteAccountStore};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    // Load and validate the banner catalog before serving anything.
    let catalog = match Catalog::load(config.catalog_path.as_deref()) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("Catalog error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize database and dependencies
    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let store = Arc::new(SqliteAccountStore::new(
        pool,
        catalog.starting_balances().clone(),
    ));
    let service = Arc::new(GachaService::new(store, catalog));

    // Create router
    let app = api::create_router(api::AppState { service });

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
