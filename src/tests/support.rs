//! tests/support.rs
//! Dobles de prueba para transporte, store y renderer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::{EmailError, EmailResult};
use crate::models::email_model::{Priority, SendTaskEmailRequest};
use crate::models::tracking_model::{EmailEvent, TrackingId};
use crate::services::email_service::EmailService;
use crate::services::template_service::{HandlebarsRenderer, TemplateRenderer};
use crate::services::tracking_service::{InMemoryTrackingStore, TrackingStore};
use crate::services::transport_service::EmailTransport;

pub const SERVICE_URL: &str = "http://localhost:8002";

#[derive(Debug, Clone)]
pub enum Outcome {
    Accepted(String),
    NoMessageId,
    Fails(String),
}

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Transporte que responde siempre lo mismo y guarda lo que "envió".
pub struct ScriptedTransport {
    outcome: Outcome,
    pub sent: Mutex<Vec<SentMessage>>,
}

impl ScriptedTransport {
    pub fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailTransport for ScriptedTransport {
    async fn send(&self, to: &str, subject: &str, html: &str) -> EmailResult<Option<String>> {
        self.sent.lock().unwrap().push(SentMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        match &self.outcome {
            Outcome::Accepted(id) => Ok(Some(id.clone())),
            Outcome::NoMessageId => Ok(None),
            Outcome::Fails(msg) => Err(EmailError::Transport(msg.clone())),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Store "caído": no registra nada.
pub struct UnreachableStore;

#[async_trait]
impl TrackingStore for UnreachableStore {
    async fn create_tracking_id(&self) -> TrackingId {
        TrackingId::generate()
    }

    async fn add_event(&self, _id: &TrackingId, _event: EmailEvent) -> bool {
        false
    }

    async fn get_events(&self, _id: &TrackingId) -> Vec<EmailEvent> {
        Vec::new()
    }

    async fn all_logs(&self) -> HashMap<TrackingId, Vec<EmailEvent>> {
        HashMap::new()
    }
}

pub struct BrokenRenderer;

impl TemplateRenderer for BrokenRenderer {
    fn render(&self, template_name: &str, _context: &serde_json::Value) -> EmailResult<String> {
        Err(EmailError::Render(format!("template {} not found", template_name)))
    }
}

pub fn task_request(to: &str, priority: Priority) -> SendTaskEmailRequest {
    SendTaskEmailRequest {
        to: to.to_string(),
        subject: "Test Task Created".to_string(),
        task_id: "123".to_string(),
        task_title: "Test Task".to_string(),
        task_description: "This is a test task to verify email notifications.".to_string(),
        priority,
        task_url: None,
        tags: None,
        metadata: None,
    }
}

pub fn email_service(
    store: Arc<dyn TrackingStore>,
    transport: Arc<dyn EmailTransport>,
) -> EmailService {
    let renderer = HandlebarsRenderer::new(None).expect("embedded template must register");
    EmailService::new(store, Arc::new(renderer), transport, SERVICE_URL)
}

pub fn in_memory_store() -> Arc<dyn TrackingStore> {
    Arc::new(InMemoryTrackingStore::new())
}
