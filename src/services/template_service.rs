//! services/template_service.rs
//! Render de los cuerpos HTML con Handlebars.

use std::path::Path;
use std::sync::Arc;

use handlebars::Handlebars;

use crate::errors::EmailResult;

pub const TASK_NOTIFICATION_TEMPLATE: &str = "task_notification";

const TASK_NOTIFICATION_HTML: &str = include_str!("../../templates/task_notification.html");

/// Contrato mínimo con el motor de templates: nombre + contexto -> HTML.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template_name: &str, context: &serde_json::Value) -> EmailResult<String>;
}

#[derive(Clone)]
pub struct HandlebarsRenderer {
    handlebars: Arc<Handlebars<'static>>,
}

impl HandlebarsRenderer {
    /// Registra el template embebido; si `templates_dir` trae un
    /// `task_notification.html`, ese lo reemplaza.
    pub fn new(templates_dir: Option<&Path>) -> EmailResult<Self> {
        let mut handlebars = Handlebars::new();
        // Variables sin resolver => error de render
        handlebars.set_strict_mode(true);

        handlebars.register_template_string(TASK_NOTIFICATION_TEMPLATE, TASK_NOTIFICATION_HTML)?;

        if let Some(dir) = templates_dir {
            let override_path = dir.join(format!("{}.html", TASK_NOTIFICATION_TEMPLATE));
            if override_path.is_file() {
                log::info!("Usando template de {:?}", override_path);
                handlebars.register_template_file(TASK_NOTIFICATION_TEMPLATE, &override_path)?;
            } else {
                log::warn!(
                    "No existe {:?}, se usa el template embebido",
                    override_path
                );
            }
        }

        Ok(Self {
            handlebars: Arc::new(handlebars),
        })
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(&self, template_name: &str, context: &serde_json::Value) -> EmailResult<String> {
        Ok(self.handlebars.render(template_name, context)?)
    }
}
