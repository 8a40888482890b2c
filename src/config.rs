use std::env;

use thiserror::Error;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 85.0;
pub const DEFAULT_MIN_ACRONYM_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Strictly-greater-than cut-off on the similarity percentage.
    pub similarity_threshold: f64,
    pub min_acronym_len: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            min_acronym_len: DEFAULT_MIN_ACRONYM_LEN,
        }
    }
}

impl ResolverConfig {
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Result<Self, ConfigError> {
        if !(0.0..=100.0).contains(&threshold) {
            return Err(ConfigError::InvalidThreshold(threshold.to_string()));
        }
        self.similarity_threshold = threshold;
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub log_level: String,
    pub resolver: ResolverConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());
        let log_level = env::var("SURVEY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let max_connections = match env::var("SURVEY_DB_MAX_CONNECTIONS") {
            Ok(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|count| *count > 0)
                .ok_or(ConfigError::InvalidMaxConnections(value))?,
            Err(_) => 5,
        };

        let resolver = match env::var("SURVEY_SIMILARITY_THRESHOLD") {
            Ok(value) => {
                let threshold = value
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| ConfigError::InvalidThreshold(value.clone()))?;
                ResolverConfig::default().with_similarity_threshold(threshold)?
            }
            Err(_) => ResolverConfig::default(),
        };

        Ok(Self {
            database_url,
            max_connections,
            log_level,
            resolver,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("similarity threshold must be a percentage between 0 and 100, got '{0}'")]
    InvalidThreshold(String),
    #[error("SURVEY_DB_MAX_CONNECTIONS must be a positive integer, got '{0}'")]
    InvalidMaxConnections(String),
}
