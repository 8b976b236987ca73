use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Prefix of the listener variables (`OPENSHIFT_INTERNAL_IP`, `OPENSHIFT_INTERNAL_PORT`).
pub const LISTENER_ENV_PREFIX: &str = "OPENSHIFT_INTERNAL";

#[derive(Debug, Clone)]
pub struct LocationConfig {
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    /// Directory served for any path no route claims.
    pub static_dir: String,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub collection: String,
    pub username: Option<String>,
    pub password: Option<Secret<String>>,
    pub auth_source: String,
}

impl LocationConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load(LISTENER_ENV_PREFIX)?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let port = get_env("OPENSHIFT_MONGODB_DB_PORT", Some("27017"), is_prod)?;
        let port = port.trim().parse::<u16>().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "OPENSHIFT_MONGODB_DB_PORT must be a port number, got {:?}: {}",
                port,
                e
            ))
        })?;

        Ok(LocationConfig {
            common: common_config,
            mongodb: MongoConfig {
                host: get_env("OPENSHIFT_MONGODB_DB_HOST", Some("localhost"), is_prod)?,
                port,
                database: get_env("OPENSHIFT_APP_NAME", Some("location"), is_prod)?,
                collection: get_env("LOCATION_COLLECTION", Some("zips"), false)?,
                username: get_optional_env("OPENSHIFT_MONGODB_DB_USERNAME", is_prod)?,
                password: get_optional_env("OPENSHIFT_MONGODB_DB_PASSWORD", is_prod)?
                    .map(Secret::new),
                auth_source: "admin".to_string(),
            },
            static_dir: get_env("LOCATION_STATIC_DIR", Some("html"), false)?,
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

/// Like `get_env`, but outside production an unset variable is simply absent.
fn get_optional_env(key: &str, is_prod: bool) -> Result<Option<String>, AppError> {
    match env::var(key) {
        Ok(val) => Ok(Some(val)),
        Err(_) if is_prod => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} is required in production but not set",
            key
        ))),
        Err(_) => Ok(None),
    }
}
