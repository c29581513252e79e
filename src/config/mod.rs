use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub password: PasswordConfig,
    pub storage: StorageConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Directory holding a pre-built front end bundle, served for unmatched routes
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub ttl_hours: i64,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    Local,
    S3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub local_dir: PathBuf,
    pub s3: Option<S3Config>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    #[serde(skip_serializing)]
    pub access_key: Option<String>,
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("FINTRACK_BIND") {
            self.server.bind = v;
        }
        if let Some(port) = env::var("FINTRACK_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("STATIC_DIR") {
            self.server.static_dir = non_empty(v).map(PathBuf::from);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = non_empty(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_AUTO_MIGRATE") {
            self.database.auto_migrate = v.parse().unwrap_or(self.database.auto_migrate);
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_TTL_HOURS") {
            self.session.ttl_hours = session_ttl_hours(&v, self.session.ttl_hours);
        }
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            if let Some(name) = non_empty(v) {
                self.session.cookie_name = name;
            }
        }
        if let Ok(v) = env::var("SESSION_COOKIE_SECURE") {
            self.session.cookie_secure = v.parse().unwrap_or(self.session.cookie_secure);
        }

        // Password hashing overrides
        if let Ok(v) = env::var("PASSWORD_HASH_MEMORY_KIB") {
            self.password.hash_memory_kib = v.parse().unwrap_or(self.password.hash_memory_kib);
        }
        if let Ok(v) = env::var("PASSWORD_HASH_ITERATIONS") {
            self.password.hash_iterations = v.parse().unwrap_or(self.password.hash_iterations);
        }

        // Storage overrides
        if let Ok(v) = env::var("STORAGE_BACKEND") {
            self.storage.backend = match v.to_ascii_lowercase().as_str() {
                "s3" => StorageBackend::S3,
                "local" => StorageBackend::Local,
                _ => self.storage.backend,
            };
        }
        if let Ok(v) = env::var("STORAGE_LOCAL_DIR") {
            self.storage.local_dir = PathBuf::from(v);
        }
        if let Ok(bucket) = env::var("S3_BUCKET") {
            self.storage.s3 = Some(S3Config {
                bucket,
                region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                endpoint: env::var("S3_ENDPOINT").ok().and_then(non_empty),
                access_key: env::var("S3_ACCESS_KEY").ok().and_then(non_empty),
                secret_key: env::var("S3_SECRET_KEY").ok().and_then(non_empty),
            });
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_UPLOAD_BYTES") {
            self.api.max_upload_bytes = v.parse().unwrap_or(self.api.max_upload_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 3000,
                static_dir: None,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                auto_migrate: true,
            },
            session: SessionConfig {
                ttl_hours: 24 * 7, // 1 week
                cookie_name: "fintrack_session".to_string(),
                cookie_secure: false,
            },
            password: PasswordConfig {
                min_length: 6,
                hash_memory_kib: 19 * 1024,
                hash_iterations: 2,
            },
            storage: StorageConfig {
                backend: StorageBackend::Local,
                local_dir: PathBuf::from("uploads"),
                s3: None,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_upload_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 8080,
                static_dir: None,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                auto_migrate: true,
            },
            session: SessionConfig {
                ttl_hours: 24 * 7,
                cookie_name: "fintrack_session".to_string(),
                cookie_secure: true,
            },
            password: PasswordConfig {
                min_length: 6,
                hash_memory_kib: 19 * 1024,
                hash_iterations: 2,
            },
            storage: StorageConfig {
                backend: StorageBackend::S3,
                local_dir: PathBuf::from("uploads"),
                s3: None,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_upload_bytes: 10 * 1024 * 1024,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 8080,
                static_dir: None,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                auto_migrate: false,
            },
            session: SessionConfig {
                ttl_hours: 24 * 7,
                cookie_name: "fintrack_session".to_string(),
                cookie_secure: true,
            },
            password: PasswordConfig {
                min_length: 6,
                hash_memory_kib: 19 * 1024,
                hash_iterations: 2,
            },
            storage: StorageConfig {
                backend: StorageBackend::S3,
                local_dir: PathBuf::from("uploads"),
                s3: None,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_upload_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

/// Longest session lifetime accepted from the environment (one year)
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

// Non-positive or unparsable values keep `current`; large ones are capped
fn session_ttl_hours(raw: &str, current: i64) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(hours) if hours > 0 => hours.min(MAX_SESSION_TTL_HOURS),
        _ => current,
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.session.ttl_hours, 168);
        assert!(!config.session.cookie_secure);
        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert!(config.database.auto_migrate);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.session.cookie_secure);
        assert_eq!(config.session.ttl_hours, 168);
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert!(!config.database.auto_migrate);
        assert_eq!(config.password.min_length, 6);
    }

    #[test]
    fn test_session_ttl_is_bounded() {
        assert_eq!(session_ttl_hours("12", 168), 12);
        assert_eq!(session_ttl_hours(" 48 ", 168), 48);
        assert_eq!(session_ttl_hours("0", 168), 168);
        assert_eq!(session_ttl_hours("-5", 168), 168);
        assert_eq!(session_ttl_hours("soon", 168), 168);
        assert_eq!(session_ttl_hours("9223372036854775807", 168), MAX_SESSION_TTL_HOURS);
        assert_eq!(session_ttl_hours("99999999999999999999", 168), 168);
    }

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty("  ".to_string()), None);
        assert_eq!(non_empty(" x ".to_string()), Some("x".to_string()));
    }
}
