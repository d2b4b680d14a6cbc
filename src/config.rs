use anyhow::{Context, Result};

pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Process-wide configuration, loaded once at startup and handed to Rocket
/// as managed state. The signing secret is required and never compiled in.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {:?}", path),
            Err(e) => tracing::debug!("Could not load .env file: {}", e),
        }

        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL environment variable not set")?;

        let jwt_secret =
            std::env::var("JWT_SECRET").context("JWT_SECRET environment variable not set")?;

        let token_ttl_minutes = match std::env::var("TOKEN_TTL_MINUTES") {
            Ok(raw) => raw
                .parse::<i64>()
                .context("TOKEN_TTL_MINUTES must be an integer number of minutes")?,
            Err(_) => DEFAULT_TOKEN_TTL_MINUTES,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            token_ttl_minutes,
        })
    }
}
