//! KYC Risk Review Server
//!
//! Form-submission shell around the review pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   RISK REVIEW SERVER                     │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐      ┌──────────────────────────────────┐ │
//! │  │  Axum     │ ───► │  ReviewPipeline (blocking pool)  │ │
//! │  │  Router   │      │  encode → predict → audit append │ │
//! │  └───────────┘      └────────┬──────────────────┬──────┘ │
//! │                              ▼                  ▼        │
//! │                     ┌──────────────┐  ┌────────────────┐ │
//! │                     │ Model bundle │  │ prediction_log │ │
//! │                     │  (read-only) │  │     .csv       │ │
//! │                     └──────────────┘  └────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod handlers;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use risk_review_core::{AuditLog, ModelBundle, ReviewPipeline, RiskModel};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "risk_review_server=debug,risk_review_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Risk Review Server starting ({})...", config.environment);

    // Storage bootstrap
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory {}", config.log_dir.display()))?;
    let audit = AuditLog::new(config.audit_log_path());
    tracing::info!("Audit log: {}", audit.path().display());

    // Model bundle, read-only for the process lifetime
    let bundle = ModelBundle::load(&config.model_bundle_path)
        .with_context(|| format!("Failed to load model bundle {}", config.model_bundle_path.display()))?;
    tracing::info!("Model: {}", bundle.name);

    let state = AppState {
        pipeline: ReviewPipeline::new(Arc::new(RiskModel::new(bundle)), Arc::new(audit)),
        config: config.clone(),
    };

    let app = create_router(state);

    let ip = config.host.parse::<std::net::IpAddr>()
        .with_context(|| format!("Invalid HOST {}", config.host))?;
    let addr = SocketAddr::new(ip, config.port);
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: ReviewPipeline,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    if !state.config.is_production() {
        tracing::debug!("Routes: /, /submit, /healthz, /api/v1/model/status, /api/v1/audit/stats");
    }

    Router::new()
        .route("/", get(handlers::review::form))
        .route("/submit", post(handlers::review::submit))
        .route("/healthz", get(handlers::health::check))
        .route("/api/v1/model/status", get(handlers::status::model))
        .route("/api/v1/audit/stats", get(handlers::status::audit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use risk_review_core::logic::model::{ColumnTransformer, LogisticClassifier, TransformStep};
    use risk_review_core::ReviewOutcome;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_state(dir: &TempDir, audit_file: &str) -> AppState {
        let transform = ColumnTransformer::new(vec![TransformStep::Passthrough {
            columns: vec!["年齡".to_string(), "30-39歲".to_string()],
        }])
        .unwrap();
        let bundle = ModelBundle::new(
            "test",
            Box::new(transform),
            Box::new(LogisticClassifier::new(vec![0.05, 1.0], -1.0)),
        );

        let config = config::Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            model_bundle_path: dir.path().join("model_bundle.json"),
            log_dir: dir.path().to_path_buf(),
            audit_log_file: audit_file.to_string(),
            environment: "test".to_string(),
        };

        AppState {
            pipeline: ReviewPipeline::new(
                Arc::new(RiskModel::new(bundle)),
                Arc::new(AuditLog::new(config.audit_log_path())),
            ),
            config,
        }
    }

    fn submit_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/submit")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_healthz_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir, "prediction_log.csv"));

        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_form_page_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir, "prediction_log.csv"));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_submit_returns_audited_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, "prediction_log.csv");
        let app = create_router(state.clone());

        let response = app
            .oneshot(submit_request("姓名=王小明&性別=2&年齡區間=30-39歲&年齡=35"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let outcome: ReviewOutcome = serde_json::from_slice(&body).unwrap();

        // 0.05 * 35 + 1.0 - 1.0 = 1.75 > 0
        assert_eq!(outcome.verdict.class_label, 1);
        assert_eq!(outcome.identity.name, "王小明");
        assert_eq!(outcome.features.gender_code, 2);
        assert!(outcome.confidence_display.is_some());

        let stats = state.pipeline.audit().stats().unwrap();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.high_risk_entries, 1);
    }

    #[tokio::test]
    async fn test_unwritable_audit_log_withholds_verdict() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("blocked")).unwrap();
        // The "log file" is a directory
        let app = create_router(test_state(&dir, "blocked"));

        let response = app.oneshot(submit_request("年齡=20")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Audit log unavailable, verdict withheld");
        assert!(json.get("verdict").is_none());
    }

    #[tokio::test]
    async fn test_model_status_counts_inferences() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, "prediction_log.csv");

        create_router(state.clone())
            .oneshot(submit_request("年齡=20"))
            .await
            .unwrap();
        let response = create_router(state)
            .oneshot(Request::builder().uri("/api/v1/model/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["model_name"], "test");
        assert_eq!(json["inference_count"], 1);
    }
}
