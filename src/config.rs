use std::{env, path::PathBuf};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub storage_dir: PathBuf,
    pub public_base_url: String,
    pub whatsapp_number: String,
    pub shop_name: String,
    pub session_ttl_days: i64,
    pub event_bus_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let storage_dir = env::var("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./storage"));
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("http://{host}:{port}"));
        let whatsapp_number =
            env::var("WHATSAPP_NUMBER").unwrap_or_else(|_| "233553301044".to_string());
        let shop_name = env::var("SHOP_NAME").unwrap_or_else(|_| "Blossom Souvenir".to_string());
        let session_ttl_days = env::var("SESSION_TTL_DAYS")
            .ok()
            .and_then(|d| d.parse::<i64>().ok())
            .filter(|d| *d > 0)
            .unwrap_or(30);
        let event_bus_capacity = env::var("EVENT_BUS_CAPACITY")
            .ok()
            .and_then(|c| c.parse::<usize>().ok())
            .filter(|c| *c > 0)
            .unwrap_or(1024);
        Ok(Self {
            port,
            database_url,
            host,
            storage_dir,
            public_base_url,
            whatsapp_number,
            shop_name,
            session_ttl_days,
            event_bus_capacity,
        })
    }

    /// Configuration for tests and tooling that never reads the environment.
    pub fn for_database(database_url: impl Into<String>, storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            storage_dir: storage_dir.into(),
            public_base_url: "http://127.0.0.1:3000".to_string(),
            whatsapp_number: "233553301044".to_string(),
            shop_name: "Blossom Souvenir".to_string(),
            session_ttl_days: 30,
            event_bus_capacity: 1024,
        }
    }
}
