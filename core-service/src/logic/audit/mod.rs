//! Audit Log Module - one CSV row per review decision
//!
//! Purpose: compliance traceability and downstream analysis of every
//! verdict, together with the inputs it was made on.
//!
//! Log format: CSV (UTF-8, CRLF rows, header written once)
//! Location: `{LOG_DIR}/prediction_log.csv` by default

pub mod record;
pub mod writer;
pub mod reader;


pub use record::{format_confidence, AuditRecord, AUDIT_COLUMN_COUNT, AUDIT_HEADER};
pub use writer::AuditLog;
pub use reader::{AuditRows, AuditStats};
