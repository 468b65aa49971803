use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub airtable: AirtableConfig,
    #[serde(default)]
    pub access: AccessConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AirtableConfig {
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    pub base_id: String,
    pub payments_table_id: String,
    #[serde(default)]
    pub orders_table_id: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AccessConfig {
    /// ID операторов, которым разрешено вносить оплаты
    #[serde(default)]
    pub authorized_users: Vec<i64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub path: String,
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: i64,
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_max_age_hours() -> i64 {
    24
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[airtable]
api_url = "https://api.airtable.com/v0"
api_key = ""
base_id = ""
payments_table_id = ""
orders_table_id = ""
timeout_secs = 20

[access]
authorized_users = []

[cache]
path = "cache/orders_cache.json"
max_age_hours = 24
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// Ключ API можно переопределить переменной окружения `AIRTABLE_API_KEY`.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = read_config_file()?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn read_config_file() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
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

fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(key) = lookup("AIRTABLE_API_KEY").filter(|v| !v.trim().is_empty()) {
        config.airtable.api_key = key;
    }
}

/// Путь к файлу кэша заказов
/// Relative paths are resolved against the executable directory
pub fn get_cache_path(config: &Config) -> PathBuf {
    let cache_path = Path::new(&config.cache.path);

    if cache_path.is_absolute() {
        return cache_path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(cache_path);
        }
    }

    PathBuf::from(&config.cache.path)
}
