//! Central Constants
//!
//! Verdict texts and file names shared by the core, the CLI and the server.

/// Verdict text for class 1 (flagged for enhanced KYC review)
pub const HIGH_RISK_MESSAGE: &str = "可能為高風險帳戶！請行員加強 KYC！";

/// Verdict text for class 0
pub const NORMAL_MESSAGE: &str = "正常帳戶！";

/// Default audit log file name inside the log directory
pub const DEFAULT_AUDIT_LOG_FILE: &str = "prediction_log.csv";

/// Default model bundle manifest
pub const DEFAULT_MODEL_BUNDLE: &str = "model/model_bundle.json";

/// Timestamp format of the audit log (local time)
pub const AUDIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Decimal places of the persisted confidence
pub const AUDIT_CONFIDENCE_DECIMALS: usize = 4;

/// Decimal places of the confidence shown to reviewers
pub const DISPLAY_CONFIDENCE_DECIMALS: usize = 3;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
