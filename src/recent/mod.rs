//! Recently used projects and, per project, recently used workspaces.
//!
//! The ledger is a list ordered oldest to newest. Each entry holds one
//! project and its workspaces, also oldest to newest. Paths are stored in
//! their portable `~/...` form.

mod ledger;

pub use ledger::{RecencyLedger, RecentEntry, MAX_RECENT};

use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecentError {
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
}
