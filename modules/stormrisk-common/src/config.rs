use std::env;

/// Pipeline configuration loaded from environment variables.
///
/// Formula constants and thresholds here are business-rule choices carried
/// over from the production system; they are tunable, not derived.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string (PostGIS + pg_trgm required).
    pub database_url: String,

    /// Parcels per page in the batch assessment driver.
    pub assess_page_size: i64,

    /// Trigram similarity floor for fuzzy address matching.
    pub linkage_similarity_threshold: f64,

    /// Days an inactive event is kept before deletion.
    pub event_retention_days: i32,

    /// Days a non-latest assessment is kept before deletion.
    pub assessment_retention_days: i32,

    /// Path to a serialized trained risk model, if one is deployed.
    pub risk_model_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing or malformed.
    pub fn from_env() -> Self {
        let config = Self {
            database_url: required_env("DATABASE_URL"),
            assess_page_size: parsed_env("ASSESS_PAGE_SIZE", 1000),
            linkage_similarity_threshold: parsed_env("LINKAGE_SIMILARITY_THRESHOLD", 0.8),
            event_retention_days: parsed_env("EVENT_RETENTION_DAYS", 30),
            assessment_retention_days: parsed_env("ASSESSMENT_RETENTION_DAYS", 365),
            risk_model_path: env::var("RISK_MODEL_PATH").ok(),
        };
        if config.assess_page_size < 1 {
            panic!(
                "ASSESS_PAGE_SIZE must be positive, got {}",
                config.assess_page_size
            );
        }
        config
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid number, got '{raw}'")),
        Err(_) => default,
    }
}
