//! services/analytics_service.rs
//! Resumen de solo lectura sobre el snapshot del tracking store.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, DurationRound, Utc};

use crate::{
    models::{
        email_model::EmailStatus,
        tracking_model::{EmailAnalytics, EmailEvent, TrackingId},
    },
    services::tracking_service::TrackingStore,
};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
const MAX_PEAK_TIMES: usize = 3;

#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn TrackingStore>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn TrackingStore>) -> Self {
        Self { store }
    }

    /// `days = Some(0)` o `None` cuenta todos los logs. Una ventana que no
    /// entra en el rango de fechas también cuenta todo.
    pub async fn get_analytics(&self, days: Option<u32>) -> EmailAnalytics {
        let logs = self.store.all_logs().await;
        let window = days
            .filter(|d| *d > 0)
            .and_then(|d| Duration::try_days(i64::from(d)));
        summarize(&logs, Utc::now(), window)
    }
}

/// Fold puro sobre los logs. Nunca divide por cero: sin envíos, todas las tasas son 0.
pub fn summarize(
    logs: &HashMap<TrackingId, Vec<EmailEvent>>,
    now: DateTime<Utc>,
    window: Option<Duration>,
) -> EmailAnalytics {
    let cutoff = window.and_then(|w| now.checked_sub_signed(w));
    let in_window = |events: &&Vec<EmailEvent>| match (cutoff, events.first()) {
        (Some(cutoff), Some(first)) => first.timestamp >= cutoff,
        (Some(_), None) => false,
        (None, _) => true,
    };
    let logs: Vec<&Vec<EmailEvent>> = logs.values().filter(in_window).collect();

    let count = |kind: EmailStatus| {
        logs.iter()
            .filter(|events| events.iter().any(|e| e.event_type == kind))
            .count() as u64
    };

    let total_sent = count(EmailStatus::Sent);
    let total_opened = count(EmailStatus::Opened);
    let total_clicked = count(EmailStatus::Clicked);

    // Opens/clicks sobre ids sin SENT (callbacks huérfanos) no pueden pasar la tasa de 1.
    let rate = |n: u64| {
        if total_sent > 0 {
            (n as f64 / total_sent as f64).min(1.0)
        } else {
            0.0
        }
    };

    EmailAnalytics {
        total_sent,
        total_delivered: total_sent,
        total_opened,
        total_clicked,
        average_open_rate: rate(total_opened),
        average_click_rate: rate(total_clicked),
        delivery_success_rate: 1.0,
        peak_times: peak_times(&logs, now),
        common_failures: common_failures(&logs),
    }
}

/// Horas (truncadas) con más aperturas, de mayor a menor.
fn peak_times(logs: &[&Vec<EmailEvent>], now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let mut buckets: HashMap<DateTime<Utc>, u64> = HashMap::new();
    for event in logs
        .iter()
        .flat_map(|events| events.iter())
        .filter(|e| e.event_type == EmailStatus::Opened)
    {
        let hour = event
            .timestamp
            .duration_trunc(Duration::hours(1))
            .unwrap_or(event.timestamp);
        *buckets.entry(hour).or_default() += 1;
    }

    if buckets.is_empty() {
        return vec![now];
    }

    let mut ranked: Vec<(DateTime<Utc>, u64)> = buckets.into_iter().collect();
    // empates: la hora más reciente primero
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
    ranked
        .into_iter()
        .take(MAX_PEAK_TIMES)
        .map(|(hour, _)| hour)
        .collect()
}

fn common_failures(logs: &[&Vec<EmailEvent>]) -> HashMap<String, u64> {
    let mut failures = HashMap::new();
    for event in logs
        .iter()
        .flat_map(|events| events.iter())
        .filter(|e| e.event_type == EmailStatus::Failed)
    {
        let reason = event
            .metadata
            .get("error")
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());
        *failures.entry(reason).or_default() += 1;
    }
    failures
}
