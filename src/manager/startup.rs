use super::{Manager, ManagerError};
use crate::config::read_settings;
use crate::host::{Host, LaunchRequest};
use crate::migration::{create_registry, MigrationContext, MigrationExecutor, MigrationResult};
use crate::registry::ReorganizeReport;
use std::path::Path;
use tracing::info;

/// What start-up changed on disk
#[derive(Debug, Default)]
pub struct StartupReport {
    pub migrations: MigrationResult,
    pub reorganized: ReorganizeReport,
}

impl<H: Host> Manager<H> {
    /// Bring files left by older releases up to date.
    ///
    /// Runs the migrations, reloads the settings if they were rewritten,
    /// moves flat-layout projects into their own folders and reopens the
    /// workspace the active window had to let go of.
    pub async fn startup(&mut self, settings_path: &Path) -> Result<StartupReport, ManagerError> {
        let ctx = MigrationContext {
            settings_path: settings_path.to_path_buf(),
            primary_dir: self.registry.primary_dir().to_path_buf(),
        };
        let migrations = MigrationExecutor::new(create_registry()).run(&ctx).await;

        if migrations.outcome.clear_recent_history {
            self.host.clear_recent_history();
        }
        if migrations.outcome.settings_changed {
            if let Some(settings) = read_settings(settings_path).await? {
                self.apply_settings(settings).await?;
            }
        }

        let reorganized = self.registry.reorganize(&self.host).await?;
        for workspace in &reorganized.relaunch {
            self.host.launch(LaunchRequest::OpenWorkspace {
                workspace: workspace.clone(),
                new_window: false,
            });
        }
        if reorganized.changed() {
            info!(projects = reorganized.moved.len(), "Reorganized project folders");
        }

        Ok(StartupReport {
            migrations,
            reorganized,
        })
    }
}
