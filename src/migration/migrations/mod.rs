//! All available migrations.

pub mod legacy_settings;
pub mod recent_format;
