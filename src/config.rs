use anyhow::{Context, Result, bail};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fs;

/// Minimum accepted length of the HMAC signing secret, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// PostgreSQL connection URL. Falls back to in-memory repositories when absent.
    #[serde(default)]
    pub postgres_url: Option<String>,
    /// Secrets never come from the YAML file, only from the environment.
    #[serde(skip)]
    pub secrets: Secrets,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub statement_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 20,
            acquire_timeout_secs: 5,
            statement_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub access_ttl_hours: i64,
    pub refresh_ttl_days: i64,
    /// Argon2id memory cost in KiB
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_ttl_hours: 24,
            refresh_ttl_days: 7,
            argon2_memory_kib: 64 * 1024,
            argon2_iterations: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root folder for uploaded review images
    pub folder: String,
    pub request_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            folder: "menu-reviews/reviews".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub jwt_secret: Option<SecretString>,
    pub cloudinary: Option<CloudinaryCredentials>,
}

#[derive(Debug, Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: SecretString,
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config yaml: {}", config_path))?;
        Ok(config)
    }

    /// Apply process environment overrides (`.env` is loaded by the caller).
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Empty values count as unset.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("DATABASE_URL") {
            self.postgres_url = Some(url);
        }
        if let Some(port) = get("PORT") {
            self.gateway.port = port
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", port))?;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(secret) = get("JWT_SECRET") {
            self.secrets.jwt_secret = Some(SecretString::from(secret));
        }

        match (
            get("CLOUDINARY_CLOUD_NAME"),
            get("CLOUDINARY_API_KEY"),
            get("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => {
                self.secrets.cloudinary = Some(CloudinaryCredentials {
                    cloud_name,
                    api_key,
                    api_secret: SecretString::from(api_secret),
                });
            }
            (None, None, None) => {}
            _ => bail!(
                "Cloudinary is partially configured: CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be set together"
            ),
        }

        Ok(())
    }

    /// Signing secret, rejected when missing or shorter than [`MIN_JWT_SECRET_LEN`].
    pub fn jwt_secret(&self) -> Result<&SecretString> {
        let secret = self
            .secrets
            .jwt_secret
            .as_ref()
            .context("JWT_SECRET is not set")?;
        if secret.expose_secret().len() < MIN_JWT_SECRET_LEN {
            bail!(
                "JWT_SECRET must be at least {} bytes long",
                MIN_JWT_SECRET_LEN
            );
        }
        Ok(secret)
    }
}
