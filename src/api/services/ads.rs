//! Ad endpoints: create, list and counter reset

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, Responder, web};
use serde::Serialize;
use tracing::{error, info, trace, warn};

use crate::api::validation::{parse_list_params, validate_new_ad};
use crate::errors::AdError;
use crate::services::AdService;
use crate::storage::Ad;
use crate::utils::country::CountryCatalog;

use super::error_code::ErrorCode;
use super::helpers::{error_from_ad, error_response, json_response};

#[derive(Debug, Serialize)]
pub struct CreatedAd<'a> {
    pub status: &'static str,
    pub ad: &'a Ad,
}

#[derive(Debug, Serialize)]
pub struct AdList {
    pub items: Vec<Ad>,
}

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub status: &'static str,
}

pub struct AdHandlers;

impl AdHandlers {
    /// `POST /api/v1/ad`
    pub async fn create_ad(
        body: web::Bytes,
        service: web::Data<Arc<AdService>>,
        countries: web::Data<Arc<dyn CountryCatalog>>,
    ) -> impl Responder {
        let ad: Ad = match serde_json::from_slice(&body) {
            Ok(ad) => ad,
            Err(e) => {
                warn!("Rejected ad body: {}", e);
                return error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::BadRequest,
                    "Invalid request body",
                );
            }
        };

        if let Err(e) = validate_new_ad(&ad, countries.get_ref().as_ref()) {
            warn!("Rejected ad '{}': {}", ad.title, e.message());
            return error_from_ad(&e);
        }

        match service.create(ad).await {
            Ok(ad) => json_response(
                StatusCode::CREATED,
                &CreatedAd {
                    status: "success",
                    ad: &ad,
                },
            ),
            Err(e) => {
                if matches!(e, AdError::QuotaExceeded(_)) {
                    warn!("Ad creation refused: {}", e.message());
                }
                error_from_ad(&e)
            }
        }
    }

    /// `GET /api/v1/ad`
    pub async fn list_ads(req: HttpRequest, service: web::Data<Arc<AdService>>) -> impl Responder {
        trace!("Listing ads with query '{}'", req.query_string());

        let pairs = url::form_urlencoded::parse(req.query_string().as_bytes()).into_owned();
        let params = match parse_list_params(pairs) {
            Ok(params) => params,
            Err(e) => {
                warn!("Rejected ad query: {}", e.message());
                return error_from_ad(&e);
            }
        };

        match service
            .list(
                &params.query,
                chrono::Utc::now(),
                params.offset,
                params.limit,
            )
            .await
        {
            Ok(items) => json_response(StatusCode::OK, &AdList { items }),
            Err(e) => {
                error!("Failed to list ads: {}", e);
                error_from_ad(&e)
            }
        }
    }

    /// `POST /api/v1/admin/reset-ad-counter`
    pub async fn reset_ad_counter(service: web::Data<Arc<AdService>>) -> impl Responder {
        match service.reset_counter().await {
            Ok(()) => {
                info!("Ad creation counter reset");
                json_response(
                    StatusCode::OK,
                    &StatusMessage {
                        status: "Ad creation counter has been reset",
                    },
                )
            }
            Err(e) => {
                error!("Failed to reset ad creation counter: {}", e);
                error_from_ad(&e)
            }
        }
    }
}

/// Ad routes under `/api/v1`.
pub fn ad_routes() -> actix_web::Scope {
    web::scope("/api/v1")
        .route("/ad", web::post().to(AdHandlers::create_ad))
        .route("/ad", web::get().to(AdHandlers::list_ads))
        .route(
            "/admin/reset-ad-counter",
            web::post().to(AdHandlers::reset_ad_counter),
        )
}
