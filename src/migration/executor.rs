//! Migration executor for running migrations.

use super::registry::MigrationRegistry;
use super::types::{MigrationContext, MigrationResult};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Executor for running migrations.
pub struct MigrationExecutor {
    registry: Arc<MigrationRegistry>,
}

impl MigrationExecutor {
    /// Create a new executor with the given registry.
    pub fn new(registry: Arc<MigrationRegistry>) -> Self {
        Self { registry }
    }

    /// Run every migration whose files are still in the old format.
    ///
    /// A failing migration is logged and recorded in the result; the
    /// following ones still run, since they touch different files.
    pub async fn run(&self, ctx: &MigrationContext) -> MigrationResult {
        let mut result = MigrationResult::default();

        for migration in self.registry.migrations() {
            let name = migration.name().to_string();

            let needed = match migration.is_needed(ctx).await {
                Ok(needed) => needed,
                Err(e) => {
                    error!(migration = %name, error = %e, "Could not inspect files");
                    result.failures.push((name, e.to_string()));
                    continue;
                }
            };
            if !needed {
                debug!(migration = %name, "Already up to date");
                continue;
            }

            info!(migration = %name, description = migration.description(), "Applying migration");
            match migration.apply(ctx).await {
                Ok(outcome) => {
                    result.outcome.merge(outcome);
                    result.migrations_applied.push(name);
                }
                Err(e) => {
                    error!(migration = %name, error = %e, "Migration failed");
                    result.failures.push((name, e.to_string()));
                }
            }
        }

        if !result.migrations_applied.is_empty() {
            info!(
                count = result.migrations_applied.len(),
                "Migrations completed"
            );
        }
        result
    }
}
