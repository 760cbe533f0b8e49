//! Upgrades of files written by older releases.
//!
//! - Migrations are registered in a `MigrationRegistry`
//! - The `MigrationExecutor` runs every migration whose files still need it
//! - Each migration implements the `Migration` trait with `is_needed()` and
//!   `apply()`; both are idempotent
//!
//! # Usage
//!
//! ```ignore
//! let executor = MigrationExecutor::new(create_registry());
//! let result = executor.run(&ctx).await;
//! ```

mod executor;
pub mod migrations;
mod registry;
mod types;

pub use executor::MigrationExecutor;
pub use registry::MigrationRegistry;
pub use types::{Migration, MigrationContext, MigrationError, MigrationOutcome, MigrationResult};

use migrations::legacy_settings::LegacySettingsMigration;
use migrations::recent_format::RecentFormatMigration;
use std::sync::Arc;

/// Create the default migration registry with all available migrations.
pub fn create_registry() -> Arc<MigrationRegistry> {
    let mut registry = MigrationRegistry::new();

    // Settings first: they decide where the primary directory is
    registry.register(Arc::new(LegacySettingsMigration::new()));
    registry.register(Arc::new(RecentFormatMigration::new()));

    Arc::new(registry)
}
