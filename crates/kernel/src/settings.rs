use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "TUMAE_ENV";
const CONFIG_DIR_ENV: &str = "TUMAE_CONFIG_DIR";

/// Deployment environment the gateway is running in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub upstream: UpstreamSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub session: SessionSettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, and environment overlay.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            // Default to repo root `config` directory.
            Err(_) => std::env::current_dir()
                .with_context(|| "unable to resolve current directory")?
                .join("config"),
        };

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix("TUMAE")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parse_environment(&environment)?;

        Ok(settings)
    }
}

fn parse_environment(value: &str) -> anyhow::Result<Environment> {
    match value {
        "local" => Ok(Environment::Local),
        "staging" => Ok(Environment::Staging),
        "production" => Ok(Environment::Production),
        other => Err(anyhow!(
            "unsupported environment '{}'; expected local/staging/production",
            other
        )),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

/// Where the remote backend API lives and how long calls to it may take.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSettings {
    #[serde(default = "UpstreamSettings::default_base_url")]
    pub base_url: String,
    #[serde(default = "UpstreamSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Logout is the one call bounded more tightly than the rest.
    #[serde(default = "UpstreamSettings::default_logout_timeout_ms")]
    pub logout_timeout_ms: u64,
}

impl UpstreamSettings {
    fn default_base_url() -> String {
        "https://tumae-api.onrender.com".to_string()
    }

    fn default_request_timeout_ms() -> u64 {
        10000
    }

    fn default_logout_timeout_ms() -> u64 {
        5000
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            request_timeout_ms: Self::default_request_timeout_ms(),
            logout_timeout_ms: Self::default_logout_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info,tower_http=info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Location of the persisted client session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "SessionSettings::default_path")]
    pub path: PathBuf,
}

impl SessionSettings {
    fn default_path() -> PathBuf {
        PathBuf::from(".tumae/session.json")
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}
