pub mod command;
pub mod config;
pub mod descriptions;
pub mod display;
pub mod host;
pub mod manager;
pub mod migration;
pub mod recent;
pub mod registry;
pub mod store;
pub mod template;
pub mod utils;

// Re-export commonly used types
pub use command::{Action, Answer, CommandSession, Overrides, Prompt, Step};
pub use config::{read_settings, write_settings, ConfigError, Settings};
pub use descriptions::{DescriptionError, DescriptionMap};
pub use display::{DisplayError, MenuItem, ProjectListing, WorkspaceListing};
pub use host::{Host, LaunchRequest, MemoryHost, WindowId, WindowInfo};
pub use manager::{Manager, ManagerError, Severity, StartupReport};
pub use migration::{
    create_registry, Migration, MigrationContext, MigrationError, MigrationExecutor,
    MigrationOutcome, MigrationRegistry, MigrationResult,
};
pub use recent::{RecencyLedger, RecentEntry, RecentError};
pub use registry::{
    ProjectDescriptor, ProjectOrigin, ProjectRecord, ProjectRegistry, ProjectTable,
    RegistryError, ReorganizeReport, WorkspaceDocument, WorkspaceRecord,
};
pub use store::StoreError;
pub use template::{TemplateEngine, TemplateError};
