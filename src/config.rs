use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub directory: DirectorySettings,
    pub collection: CollectionSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub calls: CallConfig,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Profile directory (external REST service) connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct DirectorySettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    pub user_profiles: String,
    pub likes: String,
    pub messages: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,
    #[serde(default = "default_min_score")]
    pub min_compatibility_score: f64,
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            max_distance_km: default_max_distance_km(),
            min_compatibility_score: default_min_score(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_max_distance_km() -> f64 { 100.0 }
fn default_min_score() -> f64 { 0.6 }
fn default_limit() -> u16 { 10 }
fn default_max_limit() -> u16 { 50 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_collaborative_weight")]
    pub collaborative: f64,
    #[serde(default = "default_content_weight")]
    pub content: f64,
    #[serde(default = "default_geographic_weight")]
    pub geographic: f64,
    #[serde(default = "default_behavioral_weight")]
    pub behavioral: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            collaborative: default_collaborative_weight(),
            content: default_content_weight(),
            geographic: default_geographic_weight(),
            behavioral: default_behavioral_weight(),
        }
    }
}

fn default_collaborative_weight() -> f64 { 0.40 }
fn default_content_weight() -> f64 { 0.30 }
fn default_geographic_weight() -> f64 { 0.20 }
fn default_behavioral_weight() -> f64 { 0.10 }

/// Call session settings
#[derive(Debug, Clone, Deserialize)]
pub struct CallConfig {
    #[serde(default = "default_invitation_timeout")]
    pub invitation_timeout_secs: i64,
    #[serde(default = "default_max_participants")]
    pub max_participants: usize,
    #[serde(default = "default_max_call_duration")]
    pub max_call_duration_minutes: i64,
    /// STUN server URLs handed verbatim to clients.
    #[serde(default)]
    pub stun_servers: Vec<String>,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            invitation_timeout_secs: default_invitation_timeout(),
            max_participants: default_max_participants(),
            max_call_duration_minutes: default_max_call_duration(),
            stun_servers: Vec::new(),
        }
    }
}

fn default_invitation_timeout() -> i64 { 60 }
fn default_max_participants() -> usize { 2 }
fn default_max_call_duration() -> i64 { 120 }

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

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with CORAZON_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with CORAZON_)
            // e.g., CORAZON_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("CORAZON")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("CORAZON")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
