use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Sqlite,
    Remote,
}

impl FromStr for StoreKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "sqlite" => Ok(StoreKind::Sqlite),
            "remote" => Ok(StoreKind::Remote),
            other => Err(AppError::Config(format!("unknown STUDYTRACK_STORE: {}", other))),
        }
    }
}

/// Connection settings for the hosted record service.
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub base_url: String,
    pub project_id: String,
    pub public_key: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreKind,
    pub database_url: String,
    pub remote: Option<RemoteConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let bind_addr = env::var("STUDYTRACK_BIND")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("invalid STUDYTRACK_BIND: {}", e)))?;

        let store = env::var("STUDYTRACK_STORE")
            .unwrap_or_else(|_| "sqlite".to_string())
            .parse::<StoreKind>()?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://studytrack.db?mode=rwc".to_string());

        let remote = if store == StoreKind::Remote {
            Some(RemoteConfig::new_from_env()?)
        } else {
            None
        };

        Ok(Self {
            bind_addr,
            store,
            database_url,
            remote,
        })
    }
}

impl RemoteConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let base_url = env::var("RECORDS_BASE_URL")
            .map_err(|_| AppError::Config("RECORDS_BASE_URL is not set".to_string()))?;
        let project_id = env::var("RECORDS_PROJECT_ID")
            .map_err(|_| AppError::Config("RECORDS_PROJECT_ID is not set".to_string()))?;
        let public_key = env::var("RECORDS_PUBLIC_KEY")
            .map_err(|_| AppError::Config("RECORDS_PUBLIC_KEY is not set".to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id,
            public_key,
        })
    }
}
