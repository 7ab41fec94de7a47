//! handlers/mod.rs
//! Módulo que agrupa los handlers HTTP (envío de email y tracking).
pub mod email_handler;
pub mod tracking_handler;
