//! services/tracking_service.rs
//! Log append-only de eventos por mensaje, en memoria.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::tracking_model::{EmailEvent, TrackingId};

/// Único punto de acceso al estado compartido de tracking. Ningún otro
/// componente toca la colección de logs directamente.
#[async_trait]
pub trait TrackingStore: Send + Sync {
    /// Reserva un id nuevo e inicializa su log vacío.
    async fn create_tracking_id(&self) -> TrackingId;

    /// Agrega el evento al log de `id` (lo crea si no existe).
    /// Nunca falla hacia afuera: devuelve `false` si no se pudo registrar.
    async fn add_event(&self, id: &TrackingId, event: EmailEvent) -> bool;

    /// Eventos en orden de inserción; vacío si el id es desconocido.
    async fn get_events(&self, id: &TrackingId) -> Vec<EmailEvent>;

    /// Snapshot de todos los logs, para analytics.
    async fn all_logs(&self) -> HashMap<TrackingId, Vec<EmailEvent>>;
}

#[derive(Clone, Default)]
pub struct InMemoryTrackingStore {
    logs: Arc<RwLock<HashMap<TrackingId, Vec<EmailEvent>>>>,
}

impl InMemoryTrackingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrackingStore for InMemoryTrackingStore {
    async fn create_tracking_id(&self) -> TrackingId {
        // 128 bits aleatorios; no se chequean colisiones.
        let id = TrackingId::generate();
        self.logs.write().await.insert(id.clone(), Vec::new());
        log::debug!("Tracking id creado: {}", id);
        id
    }

    async fn add_event(&self, id: &TrackingId, event: EmailEvent) -> bool {
        let event_type = event.event_type;
        {
            let mut logs = self.logs.write().await;
            logs.entry(id.clone()).or_default().push(event);
        }
        log::info!("Email event recorded for {}: {:?}", id, event_type);
        true
    }

    async fn get_events(&self, id: &TrackingId) -> Vec<EmailEvent> {
        self.logs
            .read()
            .await
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    async fn all_logs(&self) -> HashMap<TrackingId, Vec<EmailEvent>> {
        self.logs.read().await.clone()
    }
}
