use actix_web::{
    error::{InternalError, JsonPayloadError},
    web, HttpRequest, HttpResponse,
};
use lettre::Address;
use serde_json::json;

use crate::{
    errors::EmailError,
    models::{email_model::SendTaskEmailRequest, tracking_model::TrackingId},
    services::email_service::EmailService,
};

/// GET /
pub async fn service_info_endpoint() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Task Manager Email Service is running"
    }))
}

/// Cuerpos JSON que no deserializan (prioridad fuera de rango, campos
/// faltantes) responden 400 con el mismo sobre de error que el resto.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let err = EmailError::InvalidRequest(err.to_string());
    log::warn!("Rejected send request: {}", err);
    let response = HttpResponse::build(err.status_code()).json(json!({
        "success": false,
        "error": err.to_string()
    }));
    InternalError::from_response(err, response).into()
}

/// POST /api/v1/email/send
pub async fn send_email_endpoint(
    email_service: web::Data<EmailService>,
    body: web::Json<SendTaskEmailRequest>,
) -> HttpResponse {
    let req_data = body.into_inner();

    if let Err(e) = req_data.to.parse::<Address>() {
        let err = EmailError::from(e);
        log::warn!("Rejected send request: {}", err);
        return HttpResponse::build(err.status_code()).json(json!({
            "success": false,
            "error": err.to_string()
        }));
    }

    match email_service.try_send_task_email(req_data).await {
        Ok(resp) => HttpResponse::Ok().json(resp),
        Err(failure) => {
            log::error!("Email send error: {}", failure.error);
            HttpResponse::build(failure.error.status_code()).json(json!({
                "success": false,
                "tracking_id": failure.tracking_id,
                "error": format!("Failed to send email: {}", failure.error)
            }))
        }
    }
}

/// GET /api/v1/email/status/{tracking_id}
///
/// Se consulta por tracking id (el que devuelve `/send`), no por el
/// message id del proveedor.
pub async fn email_status_endpoint(
    email_service: web::Data<EmailService>,
    path: web::Path<String>,
) -> HttpResponse {
    let tracking_id = TrackingId::from(path.into_inner());

    match email_service.get_status_details(&tracking_id).await {
        Ok(status) => HttpResponse::Ok().json(status),
        Err(e) => HttpResponse::build(e.status_code()).json(json!({
            "success": false,
            "error": e.to_string()
        })),
    }
}
