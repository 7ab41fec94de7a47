use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::email_model::EmailStatus;

/// Identificador opaco de un mensaje saliente. Se genera una sola vez por
/// intento de envío y es la clave primaria del tracking store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingId(String);

impl TrackingId {
    pub fn generate() -> Self {
        TrackingId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TrackingId {
    fn from(value: String) -> Self {
        TrackingId(value)
    }
}

impl From<&str> for TrackingId {
    fn from(value: &str) -> Self {
        TrackingId(value.to_string())
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registro inmutable de algo que le pasó a un mensaje.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailEvent {
    pub event_type: EmailStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl EmailEvent {
    pub fn new(event_type: EmailStatus) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
            user_agent: None,
            ip_address: None,
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn with_client(mut self, user_agent: Option<String>, ip_address: Option<String>) -> Self {
        self.user_agent = user_agent;
        self.ip_address = ip_address;
        self
    }

    #[cfg(test)]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Resumen puntual sobre todos los logs del tracking store.
#[derive(Debug, Clone, Serialize)]
pub struct EmailAnalytics {
    pub total_sent: u64,
    /// Aproximación: no existe canal de confirmación de entrega, igual a `total_sent`.
    pub total_delivered: u64,
    pub total_opened: u64,
    pub total_clicked: u64,
    pub average_open_rate: f64,
    pub average_click_rate: f64,
    /// Placeholder fijo en 1.0, no es un valor calculado.
    pub delivery_success_rate: f64,
    pub peak_times: Vec<DateTime<Utc>>,
    pub common_failures: HashMap<String, u64>,
}

/// GET /api/v1/tracking/events/{tracking_id}
#[derive(Debug, Clone, Serialize)]
pub struct TrackingEventsResponse {
    pub tracking_id: TrackingId,
    pub events: Vec<EmailEvent>,
}
