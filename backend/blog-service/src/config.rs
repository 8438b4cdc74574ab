/// Configuration management for blog-service
///
/// Values come from built-in defaults overlaid by environment variables of
/// the form `BLOG__SECTION__KEY` (for example `BLOG__APP__PORT=9000`). A
/// `.env` file is read first when present.
use serde::Deserialize;

const DEFAULT_SESSION_SECRET: &str = "development-secret-change-in-production";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub store: StoreKind,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub media: MediaConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

/// Which [`crate::db::Store`] implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub run_migrations: bool,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct SessionConfig {
    /// HS256 secret used to sign session tokens
    pub secret: String,
    pub cookie_name: String,
    pub expiry_hours: i64,
    pub secure_cookie: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"[REDACTED]")
            .field("cookie_name", &self.cookie_name)
            .field("expiry_hours", &self.expiry_hours)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Directory uploaded images are written beneath
    pub root: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// `Cache-Control: max-age` sent with the home feed
    pub index_max_age_secs: u32,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 8000)?
            .set_default("app.workers", 4)?
            .set_default("store", "postgres")?
            .set_default("database.url", "postgres://localhost/blog")?
            .set_default("database.max_connections", 10)?
            .set_default("database.connect_timeout_secs", 5)?
            .set_default("database.run_migrations", true)?
            .set_default("session.secret", DEFAULT_SESSION_SECRET)?
            .set_default("session.cookie_name", "sessionid")?
            .set_default("session.expiry_hours", 24 * 14)?
            .set_default("session.secure_cookie", false)?
            .set_default("media.root", "media")?
            .set_default("media.max_upload_bytes", 5 * 1024 * 1024)?
            .set_default("cache.index_max_age_secs", 20)?
            .add_source(
                config::Environment::with_prefix("BLOG")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case("production")
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.is_production() && self.session.secret == DEFAULT_SESSION_SECRET {
            anyhow::bail!("BLOG__SESSION__SECRET must be set to a non-default value in production");
        }
        if self.session.expiry_hours <= 0 {
            anyhow::bail!("session.expiry_hours must be positive");
        }
        Ok(())
    }

    /// Configuration for tests and local runs without external services.
    pub fn for_memory_store(media_root: impl Into<String>) -> Self {
        Self {
            app: AppConfig {
                env: "test".to_string(),
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: 1,
            },
            store: StoreKind::Memory,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 1,
                connect_timeout_secs: 1,
                run_migrations: false,
            },
            session: SessionConfig {
                secret: DEFAULT_SESSION_SECRET.to_string(),
                cookie_name: "sessionid".to_string(),
                expiry_hours: 24,
                secure_cookie: false,
            },
            media: MediaConfig {
                root: media_root.into(),
                max_upload_bytes: 5 * 1024 * 1024,
            },
            cache: CacheConfig {
                index_max_age_secs: 20,
            },
        }
    }
}
