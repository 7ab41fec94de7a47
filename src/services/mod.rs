//! services/mod.rs
//! Módulo que agrupa las distintas capas de negocio de la app.

pub mod analytics_service;
pub mod email_service;
pub mod gmail_service;
pub mod template_service;
pub mod tracking_service;
pub mod transport_service;
