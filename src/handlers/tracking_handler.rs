//! handlers/tracking_handler.rs
//! Callbacks de engagement (pixel y redirect) y consultas de tracking.
//!
//! Los callbacks siempre responden lo mismo, se haya podido registrar el
//! evento o no.

use actix_web::{
    http::header::{CACHE_CONTROL, LOCATION, USER_AGENT},
    web, HttpRequest, HttpResponse,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

use crate::{
    errors::EmailError,
    models::{
        email_model::EmailStatus,
        tracking_model::{EmailEvent, TrackingEventsResponse, TrackingId},
    },
    services::{
        analytics_service::{AnalyticsService, DEFAULT_WINDOW_DAYS},
        tracking_service::TrackingStore,
    },
};

/// GIF transparente de 1x1.
pub const TRACKING_PIXEL_GIF: &[u8] = b"\x47\x49\x46\x38\x39\x61\x01\x00\x01\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00\x21\xf9\x04\x01\x00\x00\x00\x00\x2c\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02\x44\x01\x00\x3b";

#[derive(Deserialize)]
pub struct RedirectQuery {
    url: String,
}

#[derive(Deserialize)]
pub struct AnalyticsQuery {
    days: Option<u32>,
}

fn client_info(req: &HttpRequest) -> (Option<String>, Option<String>) {
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let ip_address = req.peer_addr().map(|addr| addr.ip().to_string());
    (user_agent, ip_address)
}

async fn record_engagement(store: &dyn TrackingStore, tracking_id: &TrackingId, event: EmailEvent) {
    let event_type = event.event_type;
    if store.add_event(tracking_id, event).await {
        log::info!("{:?} event recorded for email {}", event_type, tracking_id);
    } else {
        log::error!(
            "{}",
            EmailError::StoreWrite(format!("{:?} for {}", event_type, tracking_id))
        );
    }
}

/// GET /api/v1/tracking/{tracking_id}/pixel
pub async fn tracking_pixel_endpoint(
    store: web::Data<dyn TrackingStore>,
    path: web::Path<String>,
    req: HttpRequest,
) -> HttpResponse {
    let tracking_id = TrackingId::from(path.into_inner());
    let (user_agent, ip_address) = client_info(&req);

    let event = EmailEvent::new(EmailStatus::Opened)
        .with_client(user_agent, ip_address)
        .with_metadata("source", "pixel");
    record_engagement(store.get_ref(), &tracking_id, event).await;

    HttpResponse::Ok()
        .content_type("image/gif")
        .insert_header((CACHE_CONTROL, "no-cache, no-store, must-revalidate"))
        .body(Bytes::from_static(TRACKING_PIXEL_GIF))
}

/// GET /api/v1/tracking/{tracking_id}/redirect?url=<destino>
pub async fn tracking_redirect_endpoint(
    store: web::Data<dyn TrackingStore>,
    path: web::Path<String>,
    query: web::Query<RedirectQuery>,
    req: HttpRequest,
) -> HttpResponse {
    let tracking_id = TrackingId::from(path.into_inner());
    let target_url = query.into_inner().url;
    let (user_agent, ip_address) = client_info(&req);

    let event = EmailEvent::new(EmailStatus::Clicked)
        .with_client(user_agent, ip_address)
        .with_metadata("clicked_url", target_url.clone());
    record_engagement(store.get_ref(), &tracking_id, event).await;

    HttpResponse::TemporaryRedirect()
        .insert_header((LOCATION, target_url))
        .finish()
}

/// GET /api/v1/tracking/analytics?days=<n>
pub async fn analytics_endpoint(
    analytics_service: web::Data<AnalyticsService>,
    query: web::Query<AnalyticsQuery>,
) -> HttpResponse {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let analytics = analytics_service.get_analytics(Some(days)).await;
    HttpResponse::Ok().json(analytics)
}

/// GET /api/v1/tracking/events/{tracking_id}
pub async fn tracking_events_endpoint(
    store: web::Data<dyn TrackingStore>,
    path: web::Path<String>,
) -> HttpResponse {
    let tracking_id = TrackingId::from(path.into_inner());
    let events = store.get_events(&tracking_id).await;

    if events.is_empty() {
        let err = EmailError::NotFound(format!("No events for tracking id {}", tracking_id));
        return HttpResponse::build(err.status_code()).json(json!({
            "success": false,
            "error": err.to_string()
        }));
    }

    HttpResponse::Ok().json(TrackingEventsResponse {
        tracking_id,
        events,
    })
}
