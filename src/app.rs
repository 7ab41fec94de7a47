//! app.rs
use crate::handlers::{email_handler, tracking_handler};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(email_handler::json_error_handler))
        .route("/", web::get().to(email_handler::service_info_endpoint))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/email")
                        .route("/send", web::post().to(email_handler::send_email_endpoint))
                        .route(
                            "/status/{tracking_id}",
                            web::get().to(email_handler::email_status_endpoint),
                        ),
                )
                .service(
                    web::scope("/tracking")
                        .route(
                            "/analytics",
                            web::get().to(tracking_handler::analytics_endpoint),
                        )
                        .route(
                            "/events/{tracking_id}",
                            web::get().to(tracking_handler::tracking_events_endpoint),
                        )
                        .route(
                            "/{tracking_id}/pixel",
                            web::get().to(tracking_handler::tracking_pixel_endpoint),
                        )
                        .route(
                            "/{tracking_id}/redirect",
                            web::get().to(tracking_handler::tracking_redirect_endpoint),
                        ),
                ),
        );
}
