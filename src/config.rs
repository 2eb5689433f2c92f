use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub collection: CollectionSettings,
    #[serde(default)]
    pub validation: ValidationSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub leaderboard: LeaderboardSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

/// Connection details for the hosted document database
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub database_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    #[serde(default = "default_profiles_collection")]
    pub profiles: String,
    #[serde(default = "default_errors_collection")]
    pub errors: String,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            profiles: default_profiles_collection(),
            errors: default_errors_collection(),
        }
    }
}

fn default_profiles_collection() -> String {
    "profiles".to_string()
}
fn default_errors_collection() -> String {
    "errors".to_string()
}

/// Email validation policy; each check toggles independently
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationSettings {
    #[serde(default = "default_true")]
    pub syntax: bool,
    #[serde(default)]
    pub allow_list: bool,
    #[serde(default = "default_true")]
    pub disposable: bool,
    #[serde(default = "default_true")]
    pub mx: bool,
    /// Domains accepted when the allow-list check is enabled
    #[serde(default)]
    pub allowed_domains: Vec<String>,
    /// HTTP source for the disposable-domain list
    #[serde(default)]
    pub disposable_list_url: Option<String>,
    /// Local file fallback for the disposable-domain list
    #[serde(default)]
    pub disposable_list_path: Option<String>,
    /// How often to re-fetch the disposable list; 0 disables the refresh
    #[serde(default = "default_disposable_refresh")]
    pub disposable_refresh_secs: u64,
    #[serde(default = "default_mx_timeout")]
    pub mx_timeout_secs: u64,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            syntax: true,
            allow_list: false,
            disposable: true,
            mx: true,
            allowed_domains: vec![],
            disposable_list_url: None,
            disposable_list_path: None,
            disposable_refresh_secs: default_disposable_refresh(),
            mx_timeout_secs: default_mx_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_disposable_refresh() -> u64 {
    86_400
}
fn default_mx_timeout() -> u64 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_session_capacity")]
    pub capacity: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
            capacity: default_session_capacity(),
        }
    }
}

fn default_session_ttl() -> u64 {
    3600
}
fn default_session_capacity() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardSettings {
    #[serde(default = "default_leaderboard_size")]
    pub size: usize,
}

impl Default for LeaderboardSettings {
    fn default() -> Self {
        Self {
            size: default_leaderboard_size(),
        }
    }
}

fn default_leaderboard_size() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml, config/local.toml)
    /// 3. Environment variables (prefixed with VOTE_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g. VOTE_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("VOTE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("VOTE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply store credential overrides from plain environment variables
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let store_endpoint = env::var("VOTE_STORE__ENDPOINT").ok();
    let store_api_key = env::var("VOTE_STORE__API_KEY").ok();
    let store_project_id = env::var("VOTE_STORE__PROJECT_ID").ok();
    let store_database_id = env::var("VOTE_STORE__DATABASE_ID").ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(endpoint) = store_endpoint {
        builder = builder.set_override("store.endpoint", endpoint)?;
    }
    if let Some(api_key) = store_api_key {
        builder = builder.set_override("store.api_key", api_key)?;
    }
    if let Some(project_id) = store_project_id {
        builder = builder.set_override("store.project_id", project_id)?;
    }
    if let Some(database_id) = store_database_id {
        builder = builder.set_override("store.database_id", database_id)?;
    }

    builder.build()
}
