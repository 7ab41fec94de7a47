//! logger.rs
//! Configuración del logger usando env_logger.

/// Nivel por defecto cuando no hay RUST_LOG. El handshake SMTP y el parser
/// de templates son muy verbosos en debug, se dejan en warn.
const DEFAULT_FILTER: &str = "info,lettre=warn,handlebars=warn";

pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();
}
