//! config/app_config.rs
//! Estructura global de configuración, con valores por defecto para desarrollo.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Qué proveedor usar para enviar los correos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Smtp,
    Gmail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailSettings {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// URL pública del servicio, se usa para armar los links de tracking.
    pub service_url: String,
    pub sender_email: String,
    pub sender_name: String,
    pub transport: TransportKind,
    pub smtp: Option<SmtpSettings>,
    pub gmail: Option<GmailSettings>,
    pub templates_dir: Option<PathBuf>,
    pub send_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 8002,
            service_url: "http://localhost:8002".to_string(),
            sender_email: "noreply@localhost".to_string(),
            sender_name: "Task Manager".to_string(),
            transport: TransportKind::Smtp,
            smtp: None,
            gmail: None,
            templates_dir: None,
            send_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Lee la configuración del entorno. Se asume que `dotenv()` ya se llamó.
    pub fn from_env() -> Result<Self> {
        let defaults = AppConfig::default();

        let transport = match env::var("EMAIL_TRANSPORT")
            .unwrap_or_else(|_| "smtp".to_string())
            .to_lowercase()
            .as_str()
        {
            "smtp" => TransportKind::Smtp,
            "gmail" => TransportKind::Gmail,
            other => return Err(anyhow!("EMAIL_TRANSPORT no soportado: {}", other)),
        };

        let smtp = match transport {
            TransportKind::Smtp => Some(SmtpSettings {
                host: env::var("SMTP_HOST").context("Falta SMTP_HOST")?,
                port: parse_var("SMTP_PORT", 587)?,
                user: env::var("SMTP_USER").ok(),
                pass: env::var("SMTP_PASS").ok(),
                tls: parse_var("SMTP_TLS", true)?,
            }),
            TransportKind::Gmail => None,
        };

        let gmail = match transport {
            TransportKind::Gmail => Some(GmailSettings {
                client_id: env::var("GOOGLE_CLIENT_ID").context("Falta GOOGLE_CLIENT_ID")?,
                client_secret: env::var("GOOGLE_CLIENT_SECRET")
                    .context("Falta GOOGLE_CLIENT_SECRET")?,
                refresh_token: env::var("GOOGLE_REFRESH_TOKEN")
                    .context("Falta GOOGLE_REFRESH_TOKEN")?,
            }),
            TransportKind::Smtp => None,
        };

        Ok(AppConfig {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            service_url: env::var("EMAIL_SERVICE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.service_url),
            sender_email: env::var("EMAIL_SENDER").context("Falta EMAIL_SENDER")?,
            sender_name: env::var("EMAIL_SENDER_NAME").unwrap_or(defaults.sender_name),
            transport,
            smtp,
            gmail,
            templates_dir: env::var("TEMPLATES_DIR").ok().map(PathBuf::from),
            send_timeout_secs: parse_var("SEND_TIMEOUT_SECS", defaults.send_timeout_secs)?,
        })
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("Valor inválido para {}: {} ({})", name, raw, e)),
        Err(_) => Ok(default),
    }
}
