//! Types for the migration system.

use crate::store::StoreError;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for migration operations.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Files a migration may look at.
#[derive(Debug, Clone)]
pub struct MigrationContext {
    /// The settings document, which may not exist yet
    pub settings_path: PathBuf,
    /// Primary projects directory, holding `recent.json`
    pub primary_dir: PathBuf,
}

/// Side effects a migration asks of the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Settings were rewritten and must be reloaded
    pub settings_changed: bool,
    /// The host's own recent history no longer matches and must be cleared
    pub clear_recent_history: bool,
}

impl MigrationOutcome {
    pub fn merge(&mut self, other: MigrationOutcome) {
        self.settings_changed |= other.settings_changed;
        self.clear_recent_history |= other.clear_recent_history;
    }
}

/// A one-way upgrade of files written by older releases.
///
/// Migrations are idempotent: `is_needed` inspects the files and `apply`
/// is only called when it returns true.
#[async_trait]
pub trait Migration: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Human-readable description of what this migration does.
    fn description(&self) -> &str;

    /// Whether the files are still in the old format.
    async fn is_needed(&self, ctx: &MigrationContext) -> Result<bool, MigrationError>;

    /// Rewrite the files.
    async fn apply(&self, ctx: &MigrationContext) -> Result<MigrationOutcome, MigrationError>;
}

/// Result of migration execution.
#[derive(Debug, Clone, Default)]
pub struct MigrationResult {
    /// Names of the migrations that were applied.
    pub migrations_applied: Vec<String>,
    /// Names of the migrations that failed, with their error.
    pub failures: Vec<(String, String)>,
    pub outcome: MigrationOutcome,
}

impl MigrationResult {
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }
}
