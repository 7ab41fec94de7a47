//! errors.rs
//! Errores de dominio del servicio de envío y tracking de emails.

use actix_web::http::StatusCode;
use thiserror::Error;

pub type EmailResult<T> = Result<T, EmailError>;

#[derive(Debug, Error)]
pub enum EmailError {
    /// Falló el render del template (template inexistente o variable sin resolver).
    #[error("Template rendering error: {0}")]
    Render(String),

    /// El proveedor rechazó el mensaje o no se pudo conectar.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Nunca cruza la frontera de los handlers de tracking, solo se loguea.
    #[error("Could not record tracking event: {0}")]
    StoreWrite(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl EmailError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EmailError::NotFound(_) => StatusCode::NOT_FOUND,
            EmailError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            EmailError::Render(_)
            | EmailError::Transport(_)
            | EmailError::StoreWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<handlebars::RenderError> for EmailError {
    fn from(err: handlebars::RenderError) -> Self {
        EmailError::Render(err.to_string())
    }
}

impl From<handlebars::TemplateError> for EmailError {
    fn from(err: handlebars::TemplateError) -> Self {
        EmailError::Render(format!("invalid template: {}", err))
    }
}

impl From<reqwest::Error> for EmailError {
    fn from(err: reqwest::Error) -> Self {
        EmailError::Transport(err.to_string())
    }
}

impl From<lettre::error::Error> for EmailError {
    fn from(err: lettre::error::Error) -> Self {
        EmailError::Transport(format!("could not build message: {}", err))
    }
}

impl From<lettre::transport::smtp::Error> for EmailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        EmailError::Transport(format!("SMTP: {}", err))
    }
}

impl From<lettre::address::AddressError> for EmailError {
    fn from(err: lettre::address::AddressError) -> Self {
        EmailError::InvalidRequest(format!("invalid email address: {}", err))
    }
}
