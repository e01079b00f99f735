use crate::auth::JwtConfig;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | DATABASE_URL | sqlite:wms.db | SQLite database URL |
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | Log level when RUST_LOG is unset |
/// | LOG_DIR | (none) | Daily rolling log file directory |
/// | DB_MAX_CONNECTIONS | 5 | Pool size |
/// | DB_BUSY_TIMEOUT_MS | 5000 | SQLite busy timeout |
/// | JWT_SECRET | (dev secret) | HS256 secret, at least 32 chars outside development |
/// | JWT_ISSUER | wms | Expected token issuer |
/// | JWT_AUDIENCE | wms-clients | Expected token audience |
///
/// # Example
///
/// ```ignore
/// DATABASE_URL=sqlite:/data/wms.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub db_max_connections: u32,
    pub db_busy_timeout_ms: u64,
    pub jwt: JwtConfig,
}

/// Configuration errors (startup only)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set outside development")]
    MissingJwtSecret,

    #[error("JWT_SECRET must be at least {0} characters long")]
    WeakJwtSecret(usize),
}

const MIN_SECRET_LEN: usize = 32;
const DEV_JWT_SECRET: &str = "wms-development-secret-do-not-use-in-production";

impl Config {
    /// Load configuration from the environment
    ///
    /// Unset variables fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let secret = std::env::var("JWT_SECRET").ok();
        let secret = resolve_jwt_secret(secret, environment == "development")?;

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:wms.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            db_busy_timeout_ms: std::env::var("DB_BUSY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            jwt: JwtConfig {
                secret,
                issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "wms".into()),
                audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "wms-clients".into()),
            },
        })
    }

    /// Whether tokens are checked against the built-in development secret
    pub fn uses_development_secret(&self) -> bool {
        self.jwt.secret == DEV_JWT_SECRET
    }
}

fn resolve_jwt_secret(secret: Option<String>, development: bool) -> Result<String, ConfigError> {
    match secret {
        Some(s) if s.len() >= MIN_SECRET_LEN => Ok(s),
        Some(_) if !development => Err(ConfigError::WeakJwtSecret(MIN_SECRET_LEN)),
        None if !development => Err(ConfigError::MissingJwtSecret),
        _ => Ok(DEV_JWT_SECRET.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_required_outside_development() {
        assert!(matches!(
            resolve_jwt_secret(None, false),
            Err(ConfigError::MissingJwtSecret)
        ));
        assert!(matches!(
            resolve_jwt_secret(Some("short".into()), false),
            Err(ConfigError::WeakJwtSecret(32))
        ));
    }

    #[test]
    fn test_development_falls_back() {
        assert_eq!(resolve_jwt_secret(None, true).unwrap(), DEV_JWT_SECRET);
        let strong = "x".repeat(40);
        assert_eq!(resolve_jwt_secret(Some(strong.clone()), false).unwrap(), strong);
    }
}
