//! Configuration module

use std::env;
use std::path::PathBuf;

use risk_review_core::constants::{DEFAULT_AUDIT_LOG_FILE, DEFAULT_MODEL_BUNDLE};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Model bundle manifest, loaded once at startup
    pub model_bundle_path: PathBuf,

    /// Directory holding the audit log (created at startup)
    pub log_dir: PathBuf,

    /// Audit log file name inside `log_dir`
    pub audit_log_file: String,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            model_bundle_path: env::var("MODEL_BUNDLE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_BUNDLE)),

            log_dir: env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("logs")),

            audit_log_file: env::var("AUDIT_LOG_FILE")
                .unwrap_or_else(|_| DEFAULT_AUDIT_LOG_FILE.to_string()),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Full path of the audit log
    pub fn audit_log_path(&self) -> PathBuf {
        self.log_dir.join(&self.audit_log_file)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
