//! Configuration module
//!
//! Settings are read from the environment (after loading an optional `.env` file)
//! once at startup. A missing CloudConvert API key is not a startup error: the
//! server still starts, logs a warning, and conversion calls fail at call time.

use std::env;
use std::path::PathBuf;

// Common constants
const HOST: &str = "0.0.0.0";
const PORT: u16 = 8000;
const MAX_FILE_SIZE_MB: usize = 10;
const TEMP_DIR: &str = "temp";
const CLOUDCONVERT_API_URL: &str = "https://api.cloudconvert.com/v2";
const CLEANUP_INTERVAL_SECS: u64 = 3600;
const CLEANUP_MAX_AGE_HOURS: u64 = 2;
const POLL_INTERVAL_SECS: u64 = 2;
const CONVERSION_TIMEOUT_SECS: u64 = 120;
const HTTP_TIMEOUT_SECS: u64 = 120;

/// Value shipped in the sample `.env`; treated the same as an unset key.
pub const API_KEY_PLACEHOLDER: &str = "your_api_key_here";

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Emit logs as JSON lines (`LOG_FORMAT=json`)
    pub log_json: bool,
}

/// Converter service configuration
#[derive(Clone, Debug)]
pub struct ConverterConfig {
    pub base: BaseConfig,
    pub cloudconvert_api_key: String,
    pub cloudconvert_api_url: String,
    pub max_file_size_mb: usize,
    pub temp_dir: PathBuf,
    /// Seconds between temp directory sweeps
    pub cleanup_interval_secs: u64,
    /// Files older than this are removed by the sweep
    pub cleanup_max_age_hours: u64,
    pub poll_interval_secs: u64,
    /// Upper bound on the total time spent polling one remote job
    pub conversion_timeout_secs: u64,
    /// Timeout applied to every request of one conversion's network session
    pub http_timeout_secs: u64,
    pub delete_after_download: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            base: BaseConfig {
                host: HOST.to_string(),
                port: PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                log_json: false,
            },
            cloudconvert_api_key: String::new(),
            cloudconvert_api_url: CLOUDCONVERT_API_URL.to_string(),
            max_file_size_mb: MAX_FILE_SIZE_MB,
            temp_dir: PathBuf::from(TEMP_DIR),
            cleanup_interval_secs: CLEANUP_INTERVAL_SECS,
            cleanup_max_age_hours: CLEANUP_MAX_AGE_HOURS,
            poll_interval_secs: POLL_INTERVAL_SECS,
            conversion_timeout_secs: CONVERSION_TIMEOUT_SECS,
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            delete_after_download: false,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ConverterConfig>);

impl Config {
    fn as_converter(&self) -> &ConverterConfig {
        &self.0
    }

    pub fn new(config: ConverterConfig) -> Self {
        Config(Box::new(config))
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.as_converter().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ConverterConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_converter().validate()
    }

    /// True when an API key is set and is not the sample placeholder
    pub fn api_configured(&self) -> bool {
        let key = self.as_converter().cloudconvert_api_key.trim();
        !key.is_empty() && key != API_KEY_PLACEHOLDER
    }

    // Convenience getters for common fields
    pub fn host(&self) -> &str {
        &self.as_converter().base.host
    }

    pub fn server_port(&self) -> u16 {
        self.as_converter().base.port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_converter().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_converter().base.environment
    }

    pub fn log_json(&self) -> bool {
        self.as_converter().base.log_json
    }

    pub fn cloudconvert_api_key(&self) -> &str {
        &self.as_converter().cloudconvert_api_key
    }

    pub fn cloudconvert_api_url(&self) -> &str {
        &self.as_converter().cloudconvert_api_url
    }

    pub fn max_file_size_mb(&self) -> usize {
        self.as_converter().max_file_size_mb
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_converter().max_file_size_mb * 1024 * 1024
    }

    pub fn temp_dir(&self) -> &PathBuf {
        &self.as_converter().temp_dir
    }

    pub fn cleanup_interval_secs(&self) -> u64 {
        self.as_converter().cleanup_interval_secs
    }

    pub fn cleanup_max_age_hours(&self) -> u64 {
        self.as_converter().cleanup_max_age_hours
    }

    pub fn poll_interval_secs(&self) -> u64 {
        self.as_converter().poll_interval_secs
    }

    pub fn conversion_timeout_secs(&self) -> u64 {
        self.as_converter().conversion_timeout_secs
    }

    pub fn http_timeout_secs(&self) -> u64 {
        self.as_converter().http_timeout_secs
    }

    pub fn delete_after_download(&self) -> bool {
        self.as_converter().delete_after_download
    }
}

fn is_production_name(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

impl ConverterConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            host: env::var("HOST").unwrap_or_else(|_| HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            log_json: env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        };

        let config = ConverterConfig {
            base,
            cloudconvert_api_key: env::var("CLOUDCONVERT_API_KEY").unwrap_or_default(),
            cloudconvert_api_url: env::var("CLOUDCONVERT_API_URL")
                .unwrap_or_else(|_| CLOUDCONVERT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            max_file_size_mb: env::var("MAX_FILE_SIZE_MB")
                .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_FILE_SIZE_MB must be a valid number"))?,
            temp_dir: env::var("TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(TEMP_DIR)),
            cleanup_interval_secs: env::var("CLEANUP_INTERVAL_SECS")
                .unwrap_or_else(|_| CLEANUP_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(CLEANUP_INTERVAL_SECS),
            cleanup_max_age_hours: env::var("CLEANUP_MAX_AGE_HOURS")
                .unwrap_or_else(|_| CLEANUP_MAX_AGE_HOURS.to_string())
                .parse()
                .unwrap_or(CLEANUP_MAX_AGE_HOURS),
            poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| POLL_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(POLL_INTERVAL_SECS),
            conversion_timeout_secs: env::var("CONVERSION_TIMEOUT_SECS")
                .unwrap_or_else(|_| CONVERSION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONVERSION_TIMEOUT_SECS),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| HTTP_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(HTTP_TIMEOUT_SECS),
            delete_after_download: env::var("DELETE_AFTER_DOWNLOAD")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.poll_interval_secs == 0 {
            return Err(anyhow::anyhow!("POLL_INTERVAL_SECS must be greater than 0"));
        }

        if self.poll_interval_secs > self.conversion_timeout_secs {
            return Err(anyhow::anyhow!(
                "POLL_INTERVAL_SECS ({}) cannot exceed CONVERSION_TIMEOUT_SECS ({})",
                self.poll_interval_secs,
                self.conversion_timeout_secs
            ));
        }

        if self.cleanup_interval_secs == 0 {
            return Err(anyhow::anyhow!(
                "CLEANUP_INTERVAL_SECS must be greater than 0"
            ));
        }

        Ok(())
    }
}
