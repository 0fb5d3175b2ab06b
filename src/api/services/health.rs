use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, trace, warn};

use crate::services::{AdService, QuotaStatus};
use crate::utils::format_uptime;

use super::helpers::json_response;

const PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: &'static str,
    pub quota: Option<QuotaStatus>,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health Service
///
/// Talks to the store directly so that a health check never waits on a full scan.
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        service: web::Data<Arc<AdService>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let store = service.store();
        let ping_error = match tokio::time::timeout(PING_TIMEOUT, store.ping()).await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => {
                error!("Storage health check failed: {}", e);
                Some(e.message().to_string())
            }
            Err(_) => {
                error!("Storage health check timeout");
                Some("timeout".to_string())
            }
        };

        let quota = if ping_error.is_none() {
            match service.quota_status().await {
                Ok(quota) => Some(quota),
                Err(e) => {
                    warn!("Could not read quota counter: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let now = chrono::Utc::now();
        let uptime_seconds = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;
        let is_healthy = ping_error.is_none();

        info!(
            "Health check completed in {:?}, status: {}, uptime: {}",
            start_time.elapsed(),
            if is_healthy { "healthy" } else { "unhealthy" },
            format_uptime(app_start_time.start_datetime, now)
        );

        let status = if is_healthy {
            actix_web::http::StatusCode::OK
        } else {
            actix_web::http::StatusCode::SERVICE_UNAVAILABLE
        };

        json_response(
            status,
            &HealthResponse {
                status: if is_healthy { "healthy" } else { "unhealthy" },
                backend: store.backend_name(),
                quota,
                uptime_seconds,
                error: ping_error,
            },
        )
    }

    // Liveness only: the process answers.
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::NoContent().finish()
    }
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/live", web::get().to(HealthService::liveness_check))
}
