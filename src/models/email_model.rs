use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::tracking_model::{EmailEvent, TrackingId};

/// Prioridad de la tarea, 1 = más alta, 5 = más baja.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    Highest = 1,
    High = 2,
    Medium = 3,
    Low = 4,
    Lowest = 5,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Highest => "Highest",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Lowest => "Lowest",
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Highest),
            2 => Ok(Priority::High),
            3 => Ok(Priority::Medium),
            4 => Ok(Priority::Low),
            5 => Ok(Priority::Lowest),
            other => Err(format!("priority must be between 1 and 5, got {}", other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p as u8
    }
}

/// Tipos de evento del log de un mensaje. El estado "actual" de un
/// mensaje es el tipo del último evento registrado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    Pending,
    Sent,
    Delivered,
    Opened,
    Clicked,
    Failed,
}

/// POST /api/v1/email/send
#[derive(Debug, Clone, Deserialize)]
pub struct SendTaskEmailRequest {
    pub to: String,
    pub subject: String,
    pub task_id: String,
    pub task_title: String,
    pub task_description: String,
    pub priority: Priority,

    /// Link a la tarea en el sistema externo; se envuelve con el redirect de tracking.
    pub task_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailResponse {
    pub status: EmailStatus,
    /// Vacío cuando el envío falla.
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub tracking_id: TrackingId,
    pub events: Vec<EmailEvent>,
}

impl EmailResponse {
    pub fn failed(tracking_id: TrackingId, events: Vec<EmailEvent>) -> Self {
        Self {
            status: EmailStatus::Failed,
            message_id: String::new(),
            timestamp: Utc::now(),
            tracking_id,
            events,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailStatusResponse {
    pub status: EmailStatus,
    pub sent_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}
