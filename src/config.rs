use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub media: MediaConfig,
    pub seed_demo_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://...` selects PostgreSQL, anything else is handed to SQLite
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory uploaded files are written to
    pub dir: String,
    /// Public path the directory is served under; prefixed to stored media names
    pub url_prefix: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:microblog.db?mode=rwc".to_string()),
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_or("SERVER_PORT", 8000),
            },
            media: MediaConfig {
                dir: env::var("MEDIA_DIR").unwrap_or_else(|_| "data/media_files".to_string()),
                url_prefix: env::var("MEDIA_URL_PREFIX")
                    .unwrap_or_else(|_| "/media_files".to_string()),
                max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            },
            seed_demo_data: parse_or("SEED_DEMO_DATA", false),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn is_postgres(&self) -> bool {
        let url = &self.database.url;
        url.starts_with("postgres://") || url.starts_with("postgresql://")
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value {:?} for {}, using default", raw, key);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_url(url: &str) -> Config {
        Config {
            database: DatabaseConfig {
                url: url.to_string(),
                max_connections: 5,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            media: MediaConfig {
                dir: "media".to_string(),
                url_prefix: "/media_files".to_string(),
                max_upload_bytes: 1024,
            },
            seed_demo_data: false,
        }
    }

    #[test]
    fn test_backend_selection() {
        assert!(config_with_url("postgres://admin:admin@db:5432/microblog").is_postgres());
        assert!(config_with_url("postgresql://localhost/microblog").is_postgres());
        assert!(!config_with_url("sqlite::memory:").is_postgres());
    }

    #[test]
    fn test_server_address() {
        assert_eq!(config_with_url("sqlite::memory:").server_address(), "127.0.0.1:8080");
    }
}
