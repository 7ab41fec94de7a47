//! services/transport_service.rs
//! Envío de los mensajes ya renderizados a través del proveedor de correo.

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use uuid::Uuid;

use crate::{
    config::app_config::SmtpSettings,
    errors::{EmailError, EmailResult},
};

/// Contrato con el proveedor de correo. `Ok(None)` significa que el
/// proveedor aceptó el mensaje pero no devolvió un id utilizable.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> EmailResult<Option<String>>;

    fn name(&self) -> &'static str;
}

/// Arma el mensaje HTML de una sola parte que comparten los transportes.
pub fn build_html_message(
    from: &Mailbox,
    to: &str,
    subject: &str,
    html: &str,
    message_id: Option<String>,
) -> EmailResult<Message> {
    let to: Mailbox = to.parse()?;
    let message = Message::builder()
        .from(from.clone())
        .to(to)
        .subject(subject)
        .message_id(message_id)
        .header(ContentType::TEXT_HTML)
        .body(html.to_string())?;
    Ok(message)
}

pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    timeout: Duration,
}

impl SmtpTransport {
    pub fn new(settings: &SmtpSettings, from: Mailbox, timeout: Duration) -> EmailResult<Self> {
        let mailer = if settings.tls {
            let tls_params = TlsParameters::new(settings.host.clone())?;
            let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
                .port(settings.port)
                .tls(Tls::Required(tls_params));
            if let (Some(user), Some(pass)) = (&settings.user, &settings.pass) {
                builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
            }
            builder.build()
        } else {
            // Servidores locales tipo Mailpit, sin TLS
            let mut builder =
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
                    .port(settings.port);
            if let (Some(user), Some(pass)) = (&settings.user, &settings.pass) {
                builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
            }
            builder.build()
        };

        Ok(Self {
            mailer,
            from,
            timeout,
        })
    }
}

#[async_trait]
impl EmailTransport for SmtpTransport {
    async fn send(&self, to: &str, subject: &str, html: &str) -> EmailResult<Option<String>> {
        // SMTP no devuelve un id propio: usamos el Message-ID que generamos.
        let message_id = format!("{}@{}", Uuid::new_v4(), self.from.email.domain());
        let message =
            build_html_message(&self.from, to, subject, html, Some(format!("<{}>", message_id)))?;

        log::debug!("Enviando email por SMTP a {} (Message-ID {})", to, message_id);

        tokio::time::timeout(self.timeout, self.mailer.send(message))
            .await
            .map_err(|_| {
                EmailError::Transport(format!("SMTP send timed out after {:?}", self.timeout))
            })??;

        Ok(Some(message_id))
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
