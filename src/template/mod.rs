mod engine;
mod types;

pub use engine::{upgrade_legacy_format, TemplateEngine, TemplateError};
pub use types::ProjectLabelContext;
