//! Ordered, labelled listings of projects and workspaces for selection menus.
//!
//! Listings are recomputed from the project table, the recent ledger and the
//! live windows every time; nothing here is cached or mutated in place.

mod format;
mod projects;
mod workspaces;

pub use format::{format_buffers, status_label, BUFFER_DETAILS_BUDGET};
pub use projects::rank_projects;
pub use workspaces::rank_workspaces;

use crate::config::Settings;
use crate::descriptions::DescriptionMap;
use crate::host::OpenFiles;
use crate::recent::RecentEntry;
use crate::store::StoreError;
use crate::template::TemplateError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Project \"{0}\" doesn't exist")]
    ProjectNotFound(String),

    #[error("Template error: {0}")]
    TemplateError(#[from] TemplateError),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
}

/// Label shown for the workspace named after its project
pub const DEFAULT_WORKSPACE_LABEL: &str = "(Default)";

/// Two lines of a menu entry, plus an optional right-aligned note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub primary: String,
    pub secondary: String,
    pub annotation: Option<String>,
}

impl MenuItem {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            annotation: None,
        }
    }
}

/// A project entry of the selection menu
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectListing {
    /// Project name
    pub key: String,
    pub item: MenuItem,
    pub descriptor: PathBuf,
}

/// A workspace entry of the selection menu
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceListing {
    pub path: PathBuf,
    pub item: MenuItem,
    /// Files of the buffers saved in the workspace
    pub buffers: Vec<String>,
}

/// Everything besides the project table that shapes a listing
#[derive(Debug, Clone, Copy)]
pub struct RankContext<'a> {
    pub settings: &'a Settings,
    pub open: &'a OpenFiles,
    /// Recent ledger entries, oldest first
    pub recent: &'a [RecentEntry],
    pub descriptions: &'a DescriptionMap,
    /// Project shown in the window the menu is opened from
    pub current_project: Option<&'a str>,
}

/// Reorder by recency, most recent first. `rank` is the position in a list
/// ordered oldest to newest, `None` for items never used; those keep their
/// relative order at the end.
pub(crate) fn sort_by_recency<T>(items: &mut [T], rank: impl Fn(&T) -> Option<usize>) {
    let key = |item: &T| rank(item).map_or(-1, |r| r as i64);
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}
