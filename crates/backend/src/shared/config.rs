use anyhow::Context;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub notifications: NotificationsConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "target/db/storefront.db".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".into(),
            access_token_hours: 24,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotificationsConfig {
    pub enabled: bool,
    pub queue_capacity: usize,
    pub from: String,
    /// Receives a copy of every new order when set
    pub admin_email: Option<String>,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            queue_capacity: 256,
            from: "Storefront <no-reply@storefront.local>".into(),
            admin_email: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SeedConfig {
    pub demo_data: bool,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000

[database]
path = "target/db/storefront.db"

[auth]
jwt_secret = "change-me-in-production"
access_token_hours = 24

[notifications]
enabled = true
queue_capacity = 256
from = "Storefront <no-reply@storefront.local>"

[seed]
demo_data = false
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// `STOREFRONT_*` environment variables are applied on top.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = read_config_file()?;
    apply_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

fn read_config_file() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)
                    .with_context(|| format!("Failed to read {}", config_path.display()))?;
                let config: Config = toml::from_str(&contents)
                    .with_context(|| format!("Failed to parse {}", config_path.display()))?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

fn apply_overrides<F>(config: &mut Config, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("STOREFRONT_PORT") {
        config.server.port = port
            .parse()
            .with_context(|| format!("STOREFRONT_PORT is not a port number: {}", port))?;
    }
    if let Some(path) = lookup("STOREFRONT_DATABASE_PATH") {
        config.database.path = path;
    }
    if let Some(secret) = lookup("STOREFRONT_JWT_SECRET") {
        config.auth.jwt_secret = secret;
    }
    Ok(())
}

/// Process-wide configuration, loaded on first use
pub fn current() -> anyhow::Result<&'static Config> {
    CONFIG.get_or_try_init(load_config)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_loads() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/storefront.db");
        assert_eq!(config.server.port, 3000);
        assert!(config.notifications.enabled);
        assert!(config.notifications.admin_email.is_none());
        assert!(!config.seed.demo_data);
    }

    #[test]
    fn test_partial_file_keeps_section_defaults() {
        let config: Config = toml::from_str(
            r#"
            [notifications]
            admin_email = "ops@example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.notifications.admin_email.as_deref(), Some("ops@example.com"));
        assert_eq!(config.notifications.queue_capacity, 256);
        assert_eq!(config.auth.access_token_hours, 24);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("STOREFRONT_PORT", "8081"),
            ("STOREFRONT_DATABASE_PATH", "/var/lib/storefront.db"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        apply_overrides(&mut config, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.database.path, "/var/lib/storefront.db");
        assert_eq!(config.auth.jwt_secret, "change-me-in-production");
    }

    #[test]
    fn test_bad_port_override_is_an_error() {
        let mut config = Config::default();
        let result = apply_overrides(&mut config, |k| {
            (k == "STOREFRONT_PORT").then(|| "http".to_string())
        });
        assert!(result.is_err());
    }
}
