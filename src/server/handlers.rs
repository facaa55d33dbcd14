//! HTTP request handlers
//!
//! Contains handlers for all HTTP endpoints.

use std::time::Instant;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::AppState;
use crate::error::AppResult;
use crate::transformer::{merge, preamble, MetricType, CONTENT_TYPE};

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Health status
    status: String,
    /// Application version
    version: String,
}

/// Root endpoint - displays basic info
pub async fn root(State(state): State<AppState>) -> Html<String> {
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>mq-exporter</title>
</head>
<body>
    <h1>mq-exporter</h1>
    <p>Version: {}</p>
    <ul>
        <li><a href="/health">Health Check</a></li>
        <li><a href="{}">Metrics</a></li>
    </ul>
</body>
</html>"#,
        env!("CARGO_PKG_VERSION"),
        state.config.server.path
    );
    Html(html)
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Metrics endpoint - runs the pipeline for every manager and returns Prometheus format
#[instrument(skip(state), name = "metrics_handler")]
pub async fn metrics(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let start = Instant::now();

    let managers = state.pipeline.managers(&state.config.mq.managers).await?;
    debug!(managers = managers.len(), "Starting metrics collection");

    let results = state.pipeline.collect_all(&managers).await;

    let mut texts = Vec::with_capacity(results.len());
    let mut errors = 0usize;
    let mut samples = 0usize;

    for (manager, result) in &results {
        match result {
            Ok(outcome) => {
                for e in &outcome.errors {
                    debug!(manager = %manager, error = %e, "Entity skipped");
                }
                errors += outcome.errors.len();
                samples += outcome.samples;
                texts.push(outcome.text.as_str());
            }
            Err(e) => {
                warn!(manager = %manager, error = %e, "Failed to collect manager");
                errors += 1;
            }
        }
    }

    let mut output = merge(&texts);

    // Exporter self metrics
    let scrape_duration = start.elapsed().as_secs_f64();
    output.push_str(&preamble(
        "mq_exporter_scrape_duration_seconds",
        "Time spent collecting MQ metrics.",
        MetricType::Gauge,
    ));
    output.push_str(&format!(
        "mq_exporter_scrape_duration_seconds {}\n",
        scrape_duration
    ));
    output.push_str(&preamble(
        "mq_exporter_scrape_errors",
        "Number of errors during the last collection.",
        MetricType::Gauge,
    ));
    output.push_str(&format!("mq_exporter_scrape_errors {}\n", errors));

    debug!(
        duration_ms = start.elapsed().as_millis() as u64,
        samples,
        errors,
        "Metrics collection complete"
    );

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{CommandRunner, MqTask};
    use crate::config::Config;
    use crate::error::TransportError;
    use crate::pipeline::Pipeline;
    use crate::server::router;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct StaticRunner;

    #[async_trait]
    impl CommandRunner for StaticRunner {
        async fn run(&self, task: MqTask, manager: &str) -> Result<String, TransportError> {
            match task {
                MqTask::ListManagers => Ok("QMNAME(QM1) STATUS(Running)\nQMNAME(QM2) STATUS(Ended)".to_string()),
                MqTask::ManagerStatus => Ok(format!(
                    "QMNAME({}) STATUS({}) DEFAULT(no) STANDBY(Not permitted) \
                     INSTNAME(Installation1) INSTPATH(/opt/mqm) INSTVER(9.3.0.0)",
                    manager,
                    if manager == "QM1" { "Running" } else { "Ended" }
                )),
                MqTask::QueueDepth => Ok("QUEUE(Q1) TYPE(QLOCAL) CURDEPTH(5) MAXDEPTH(50)".to_string()),
                MqTask::QueueMonitor => Err(TransportError::Timeout(10)),
            }
        }
    }

    fn state() -> AppState {
        AppState {
            config: Arc::new(Config::default()),
            pipeline: Pipeline::new(Arc::new(StaticRunner)),
        }
    }

    async fn get(uri: &str) -> (StatusCode, String) {
        let response = router(state())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get("/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_metrics_merges_managers() {
        let (status, body) = get("/metrics").await;
        assert_eq!(status, StatusCode::OK);

        // QM1 fails on the monitor query, QM2 is stopped
        assert_eq!(body.matches("# HELP mq_manager_status").count(), 1);
        assert!(body.contains("qmname=\"QM2\", standby=\"Not permitted\"} 0"));
        assert!(!body.contains("mq_queue_curdepth"));
        assert!(body.contains("mq_exporter_scrape_errors 1\n"));
    }

    #[tokio::test]
    async fn test_root_links_metrics_path() {
        let (status, body) = get("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("href=\"/metrics\""));
    }
}
