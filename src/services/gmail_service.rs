//! services/gmail_service.rs
//! Transporte por la API REST de Gmail. El refresh del access token vive
//! acá; el orquestador recibe el transporte ya inicializado.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use chrono::{DateTime, Utc};
use lettre::message::Mailbox;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    config::app_config::GmailSettings,
    errors::{EmailError, EmailResult},
    services::transport_service::{build_html_message, EmailTransport},
};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";
/// Se renueva el token si le queda menos que esto.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

pub struct GmailTransport {
    http_client: Client,
    credentials: GmailSettings,
    from: Mailbox,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl GmailTransport {
    pub fn new(credentials: GmailSettings, from: Mailbox, timeout: Duration) -> EmailResult<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            credentials,
            from,
            token: Arc::new(Mutex::new(None)),
        })
    }

    async fn access_token(&self) -> EmailResult<String> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at - chrono::Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) > Utc::now()
            {
                return Ok(token.value.clone());
            }
        }

        log::debug!("(gmail) Renovando access token");
        let resp = self
            .http_client
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            log::error!("(gmail) Falló el refresh del token: {}", body);
            return Err(EmailError::Transport(format!(
                "token refresh failed: {}",
                body
            )));
        }

        let token: TokenResponse = resp.json().await?;
        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(token.expires_in),
        });
        Ok(value)
    }
}

#[async_trait]
impl EmailTransport for GmailTransport {
    async fn send(&self, to: &str, subject: &str, html: &str) -> EmailResult<Option<String>> {
        let message = build_html_message(&self.from, to, subject, html, None)?;
        let raw = URL_SAFE.encode(message.formatted());

        let access_token = self.access_token().await?;

        log::debug!("(gmail) Enviando mensaje a {}", to);
        let resp = self
            .http_client
            .post(SEND_URL)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "raw": raw }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            log::error!("(gmail) Respuesta no exitosa {}: {}", status, body);
            return Err(EmailError::Transport(format!(
                "Gmail API returned {}: {}",
                status, body
            )));
        }

        let sent: SendResponse = resp.json().await?;
        log::info!("(gmail) Mensaje enviado, id={:?}", sent.id);
        Ok(sent.id.filter(|id| !id.is_empty()))
    }

    fn name(&self) -> &'static str {
        "gmail"
    }
}
