//! services/email_service.rs
//! Orquesta un envío completo: tracking id, render, envío y eventos de ciclo de vida.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::{
    errors::{EmailError, EmailResult},
    models::{
        email_model::{EmailResponse, EmailStatus, EmailStatusResponse, SendTaskEmailRequest},
        tracking_model::{EmailEvent, TrackingId},
    },
    services::{
        template_service::{TemplateRenderer, TASK_NOTIFICATION_TEMPLATE},
        tracking_service::TrackingStore,
        transport_service::EmailTransport,
    },
};

/// Falla "dura" del envío: el llamador recibe un error, no una respuesta FAILED.
#[derive(Debug)]
pub struct SendFailure {
    pub tracking_id: TrackingId,
    pub error: EmailError,
}

#[derive(Clone)]
pub struct EmailService {
    store: Arc<dyn TrackingStore>,
    renderer: Arc<dyn TemplateRenderer>,
    transport: Arc<dyn EmailTransport>,
    service_url: String,
}

impl EmailService {
    pub fn new(
        store: Arc<dyn TrackingStore>,
        renderer: Arc<dyn TemplateRenderer>,
        transport: Arc<dyn EmailTransport>,
        service_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            renderer,
            transport,
            service_url: service_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn tracking_pixel_url(&self, tracking_id: &TrackingId) -> String {
        format!(
            "{}/api/v1/tracking/{}/pixel",
            self.service_url, tracking_id
        )
    }

    /// Prefijo del redirect; falta agregar la URL destino url-encodeada.
    pub fn tracking_link_base(&self, tracking_id: &TrackingId) -> String {
        format!(
            "{}/api/v1/tracking/{}/redirect?url=",
            self.service_url, tracking_id
        )
    }

    pub fn tracking_link(&self, tracking_id: &TrackingId, original_url: &str) -> String {
        format!(
            "{}{}",
            self.tracking_link_base(tracking_id),
            urlencoding::encode(original_url)
        )
    }

    /// Nunca devuelve error: cualquier falla termina en una respuesta FAILED.
    pub async fn send_task_email(&self, req: SendTaskEmailRequest) -> EmailResponse {
        match self.try_send_task_email(req).await {
            Ok(resp) => resp,
            Err(failure) => {
                log::error!(
                    "Error in send_task_email ({}): {}",
                    failure.tracking_id,
                    failure.error
                );
                let events = self.store.get_events(&failure.tracking_id).await;
                EmailResponse::failed(failure.tracking_id, events)
            }
        }
    }

    /// Igual que `send_task_email`, pero una falla de render se devuelve como
    /// error. Una falla del transporte queda registrada como evento FAILED y
    /// se responde con estado FAILED.
    ///
    /// Si falla el render NO se registra evento terminal: el log queda solo
    /// con PENDING, a diferencia de una falla del transporte.
    pub async fn try_send_task_email(
        &self,
        req: SendTaskEmailRequest,
    ) -> Result<EmailResponse, SendFailure> {
        log::debug!("Starting to send email to: {}", req.to);

        // 1) tracking id + PENDING
        let tracking_id = self.store.create_tracking_id().await;
        self.record(
            &tracking_id,
            EmailEvent::new(EmailStatus::Pending).with_metadata("task_id", req.task_id.clone()),
        )
        .await;

        // 2) Render
        let html = match self.render_task_email(&tracking_id, &req) {
            Ok(html) => html,
            Err(error) => {
                log::error!("Template rendering error ({}): {}", tracking_id, error);
                return Err(SendFailure { tracking_id, error });
            }
        };
        log::debug!("Template rendered successfully ({} bytes)", html.len());

        // 3) Envío
        log::debug!("Attempting to send email via {}", self.transport.name());
        match self.transport.send(&req.to, &req.subject, &html).await {
            Ok(Some(message_id)) => {
                log::info!(
                    "Email sent successfully with message_id: {} (tracking {})",
                    message_id,
                    tracking_id
                );
                self.record(
                    &tracking_id,
                    EmailEvent::new(EmailStatus::Sent).with_metadata("message_id", message_id.clone()),
                )
                .await;
                let events = self.store.get_events(&tracking_id).await;
                Ok(EmailResponse {
                    status: EmailStatus::Sent,
                    message_id,
                    timestamp: Utc::now(),
                    tracking_id,
                    events,
                })
            }
            Ok(None) => {
                log::error!("Email sending failed - no message_id received ({})", tracking_id);
                Ok(self.fail(tracking_id, "no message id").await)
            }
            Err(e) => {
                log::error!("{} transport error ({}): {}", self.transport.name(), tracking_id, e);
                Ok(self.fail(tracking_id, &e.to_string()).await)
            }
        }
    }

    /// Estado derivado: tipo del último evento del log de `tracking_id`.
    /// La clave es siempre el tracking id, nunca el message id del proveedor.
    pub async fn get_email_status(&self, tracking_id: &TrackingId) -> Option<EmailStatus> {
        self.store
            .get_events(tracking_id)
            .await
            .last()
            .map(|e| e.event_type)
    }

    pub async fn get_status_details(
        &self,
        tracking_id: &TrackingId,
    ) -> EmailResult<EmailStatusResponse> {
        let events = self.store.get_events(tracking_id).await;
        let last = events.last().ok_or_else(|| {
            EmailError::NotFound(format!("Email with tracking id {} not found", tracking_id))
        })?;

        let sent_at = events
            .iter()
            .find(|e| e.event_type == EmailStatus::Sent)
            .unwrap_or(&events[0])
            .timestamp;
        let delivered_at = events
            .iter()
            .find(|e| e.event_type == EmailStatus::Delivered)
            .map(|e| e.timestamp);
        let error = events
            .iter()
            .rev()
            .find(|e| e.event_type == EmailStatus::Failed)
            .and_then(|e| e.metadata.get("error").cloned());

        Ok(EmailStatusResponse {
            status: last.event_type,
            sent_at,
            delivered_at,
            error,
        })
    }

    fn render_task_email(
        &self,
        tracking_id: &TrackingId,
        req: &SendTaskEmailRequest,
    ) -> EmailResult<String> {
        let context = json!({
            "task_id": req.task_id,
            "task_title": req.task_title,
            "task_description": req.task_description,
            "priority": u8::from(req.priority),
            "priority_label": req.priority.label(),
            "tags": req.tags.clone().unwrap_or_default(),
            "metadata": req.metadata.clone().unwrap_or_default(),
            "task_url": req.task_url.as_deref().map(|url| self.tracking_link(tracking_id, url)),
            "tracking_pixel_url": self.tracking_pixel_url(tracking_id),
            "tracking_link_base": self.tracking_link_base(tracking_id),
        });
        self.renderer.render(TASK_NOTIFICATION_TEMPLATE, &context)
    }

    async fn fail(&self, tracking_id: TrackingId, error: &str) -> EmailResponse {
        self.record(
            &tracking_id,
            EmailEvent::new(EmailStatus::Failed).with_metadata("error", error),
        )
        .await;
        let events = self.store.get_events(&tracking_id).await;
        EmailResponse::failed(tracking_id, events)
    }

    async fn record(&self, tracking_id: &TrackingId, event: EmailEvent) {
        let event_type = event.event_type;
        if !self.store.add_event(tracking_id, event).await {
            log::warn!(
                "{}",
                EmailError::StoreWrite(format!("{:?} for {}", event_type, tracking_id))
            );
        }
    }
}
