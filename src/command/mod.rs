//! Menu-driven command surface.
//!
//! An [`Action`] names what to do; a [`CommandSession`] runs it, stopping at
//! every question for the operator. The session hands back a [`Prompt`] and
//! waits for the matching [`Answer`], so the whole flow can be driven by a
//! terminal, an editor UI or a test.

mod action;
mod session;

pub use action::{Action, Overrides};
pub use session::CommandSession;

use crate::display::MenuItem;

/// A question for the operator
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    /// Pick one item of a list
    Choose { title: String, items: Vec<MenuItem> },
    /// Type a line of text
    Input { caption: String, initial: String },
    /// Yes or no
    Confirm { message: String },
}

/// The operator's reply to a [`Prompt`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Index into the items of a `Choose` prompt
    Chosen(usize),
    Text(String),
    Confirmed(bool),
    /// The prompt was dismissed
    Cancelled,
}

/// Where a session stands after a call
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Waiting for the answer to this prompt
    Prompt(Prompt),
    Done,
}

impl Step {
    pub fn is_done(&self) -> bool {
        matches!(self, Step::Done)
    }
}
