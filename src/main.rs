use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::{anyhow, Context, Result};
use dotenv::dotenv;
use lettre::message::Mailbox;

use crate::config::app_config::{AppConfig, TransportKind};
use crate::logger::init_logger;
use crate::services::analytics_service::AnalyticsService;
use crate::services::email_service::EmailService;
use crate::services::gmail_service::GmailTransport;
use crate::services::template_service::HandlebarsRenderer;
use crate::services::tracking_service::{InMemoryTrackingStore, TrackingStore};
use crate::services::transport_service::{EmailTransport, SmtpTransport};

mod app;
mod config;
mod errors;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

fn build_transport(config: &AppConfig) -> Result<Arc<dyn EmailTransport>> {
    let from: Mailbox = format!("{} <{}>", config.sender_name, config.sender_email)
        .parse()
        .context("EMAIL_SENDER inválido")?;

    let transport: Arc<dyn EmailTransport> = match config.transport {
        TransportKind::Smtp => {
            let smtp = config
                .smtp
                .as_ref()
                .ok_or_else(|| anyhow!("Falta configuración SMTP"))?;
            log::info!("Transporte SMTP en {}:{}", smtp.host, smtp.port);
            Arc::new(
                SmtpTransport::new(smtp, from, config.send_timeout())
                    .context("No se pudo inicializar el transporte SMTP")?,
            )
        }
        TransportKind::Gmail => {
            let gmail = config
                .gmail
                .clone()
                .ok_or_else(|| anyhow!("Falta configuración de Gmail"))?;
            log::info!("Transporte Gmail API");
            Arc::new(
                GmailTransport::new(gmail, from, config.send_timeout())
                    .context("No se pudo inicializar el transporte Gmail")?,
            )
        }
    };
    Ok(transport)
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env().context("Configuración inválida")?;

    // Único estado mutable compartido; vive en memoria hasta que termina el proceso.
    let store: Arc<dyn TrackingStore> = Arc::new(InMemoryTrackingStore::new());

    let renderer = HandlebarsRenderer::new(config.templates_dir.as_deref())
        .context("No se pudieron cargar los templates")?;
    let transport = build_transport(&config)?;

    let email_service = EmailService::new(
        store.clone(),
        Arc::new(renderer),
        transport,
        config.service_url.clone(),
    );
    let analytics_service = AnalyticsService::new(store.clone());

    log::info!(
        "Levantando servidor en {}:{} (tracking en {})",
        config.host,
        config.port,
        config.service_url
    );
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(store.clone()))
            .app_data(web::Data::new(email_service.clone()))
            .app_data(web::Data::new(analytics_service.clone()))
            .configure(app::init_app)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
