//! config/mod.rs
//! Configuración global del servicio (leída de variables de entorno / .env).

pub mod app_config;
