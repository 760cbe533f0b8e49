//! Ordered list of the known migrations.

use super::types::Migration;
use std::sync::Arc;

/// Registry of all available migrations, run in registration order.
pub struct MigrationRegistry {
    migrations: Vec<Arc<dyn Migration>>,
}

impl MigrationRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            migrations: Vec::new(),
        }
    }

    /// Register a migration. Later registrations run later.
    pub fn register(&mut self, migration: Arc<dyn Migration>) {
        self.migrations.push(migration);
    }

    pub fn migrations(&self) -> &[Arc<dyn Migration>] {
        &self.migrations
    }

    pub fn names(&self) -> Vec<String> {
        self.migrations.iter().map(|m| m.name().to_string()).collect()
    }
}

impl Default for MigrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
