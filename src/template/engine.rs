use handlebars::Handlebars;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use thiserror::Error;

use super::types::ProjectLabelContext;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Render error: {0}")]
    RenderError(#[from] handlebars::RenderError),
}

/// Single-brace placeholders of older display formats
fn legacy_placeholder() -> Option<&'static Regex> {
    static LEGACY: OnceLock<Option<Regex>> = OnceLock::new();
    LEGACY
        .get_or_init(|| {
            Regex::new(r"\{(project_name|project_group|active_project_indicator)\}").ok()
        })
        .as_ref()
}

/// Turn `{project_name}` style formats into `{{project_name}}`.
/// Formats already using double braces are returned as they are.
pub fn upgrade_legacy_format(format: &str) -> Cow<'_, str> {
    if format.contains("{{") {
        return Cow::Borrowed(format);
    }
    match legacy_placeholder() {
        Some(placeholder) => placeholder.replace_all(format, "{{$1}}"),
        None => Cow::Borrowed(format),
    }
}

pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        // Labels are plain text, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        Self { handlebars }
    }

    /// Render the menu label of a project with the configured format
    pub fn render_project_label(
        &self,
        format: &str,
        context: &ProjectLabelContext,
    ) -> Result<String, TemplateError> {
        let format = upgrade_legacy_format(format);
        let label = self.handlebars.render_template(&format, context)?;
        Ok(label.trim().to_string())
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(indicator: &str) -> ProjectLabelContext {
        ProjectLabelContext {
            project_name: "Alpha".to_string(),
            project_group: "work/".to_string(),
            active_project_indicator: indicator.to_string(),
        }
    }

    #[test]
    fn test_default_format() {
        let engine = TemplateEngine::new();
        let label = engine
            .render_project_label(
                "{{project_group}}{{project_name}}{{active_project_indicator}}",
                &context("*"),
            )
            .unwrap();
        assert_eq!(label, "work/Alpha*");
    }

    #[test]
    fn test_legacy_format_is_upgraded() {
        assert_eq!(
            upgrade_legacy_format("{project_name} ({project_group})"),
            "{{project_name}} ({{project_group}})"
        );
        assert_eq!(upgrade_legacy_format("{{project_name}}"), "{{project_name}}");

        let engine = TemplateEngine::new();
        let label = engine
            .render_project_label("{project_name} {active_project_indicator}", &context(""))
            .unwrap();
        assert_eq!(label, "Alpha");
    }

    #[test]
    fn test_no_html_escaping() {
        let engine = TemplateEngine::new();
        let mut ctx = context("<*>");
        ctx.project_name = "R&D".to_string();
        let label = engine
            .render_project_label("{{project_name}}{{active_project_indicator}}", &ctx)
            .unwrap();
        assert_eq!(label, "R&D<*>");
    }
}
