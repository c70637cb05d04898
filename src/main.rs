use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studytrack::api::router;
use studytrack::config::{AppConfig, StoreKind};
use studytrack::db::SqliteStore;
use studytrack::error::AppError;
use studytrack::state::AppState;
use studytrack::store::{MemoryStore, RecordStore, RemoteStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "studytrack=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let store: Arc<dyn RecordStore> = match config.store {
        StoreKind::Memory => {
            info!("using in-memory record store");
            Arc::new(MemoryStore::new())
        }
        StoreKind::Sqlite => {
            info!("using sqlite record store at {}", config.database_url);
            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .connect(&config.database_url)
                .await?;
            let store = SqliteStore::new(pool);
            store.migrate().await?;
            Arc::new(store)
        }
        StoreKind::Remote => {
            let remote = config
                .remote
                .clone()
                .ok_or_else(|| AppError::Config("remote store selected without settings".to_string()))?;
            info!("using remote record store at {}", remote.base_url);
            Arc::new(RemoteStore::new(remote)?)
        }
    };

    let app = router(AppState::new(store));

    info!("listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
