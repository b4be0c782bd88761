use std::fs;
use std::path::Path;
use log::{debug, info};
use crate::errors::WikiError;
use crate::types::TemplateContext;
use crate::utils::escape_html;

/// Component for handling HTML template rendering
pub struct TemplateComponent {
    base: Option<String>,
}

impl TemplateComponent {
    /// Create a new template component, loading `base.html` from `template_dir` if present
    pub fn new(template_dir: &Path) -> Self {
        let base_path = template_dir.join("base.html");
        let base = match fs::read_to_string(&base_path) {
            Ok(base) => {
                info!("Using page shell {:?}", base_path);
                Some(base)
            }
            Err(_) => {
                debug!("No page shell at {:?}, using the built-in one", base_path);
                None
            }
        };
        Self { base }
    }

    /// Component with only the built-in shell
    pub fn inline() -> Self {
        Self { base: None }
    }

    /// Render the main HTML shell around a context
    pub fn render_shell_template(&self, context: &TemplateContext) -> Result<String, WikiError> {
        let title = escape_html(&context.title);

        if let Some(base) = &self.base {
            if !base.contains("{{CONTENT}}") {
                return Err(WikiError::TemplateError("base.html lacks {{CONTENT}}".to_string()));
            }
            let html = base
                .replace("{{TITLE}}", &title)
                .replace("{{NAVIGATION}}", &context.navigation)
                .replace("{{CONTENT}}", &context.content);
            return Ok(html);
        }

        Ok(format!(
            "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"><title>{}</title></head><body><header class=\"topnav\">{}</header><main class=\"content\">{}</main></body></html>",
            title, context.navigation, context.content
        ))
    }

    /// Generate a complete page with navigation and content
    pub fn render_page(&self, title: &str, navigation: &str, content: &str) -> Result<String, WikiError> {
        let context = TemplateContext {
            title: title.to_string(),
            content: content.to_string(),
            navigation: navigation.to_string(),
        };
        self.render_shell_template(&context)
    }
}
