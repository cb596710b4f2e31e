//! Publishing workflow state machine
//!
//! Flat content entities move through five states:
//! Draft → SubmittedForReview → Approved | Rejected → Published
//!
//! Transitions are triggered by [`StatusAction`]s. Which actions are legal
//! depends on the current status; which actions a user may invoke depends
//! on their [`Role`]. Menus offer the intersection of both.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Moderation status of a flat content entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    #[default]
    Draft,
    SubmittedForReview,
    Approved,
    Rejected,
    Published,
}

impl ContentStatus {
    pub const ALL: [ContentStatus; 5] = [
        ContentStatus::Draft,
        ContentStatus::SubmittedForReview,
        ContentStatus::Approved,
        ContentStatus::Rejected,
        ContentStatus::Published,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::SubmittedForReview => "submitted_for_review",
            ContentStatus::Approved => "approved",
            ContentStatus::Rejected => "rejected",
            ContentStatus::Published => "published",
        }
    }

    /// Actions legal from this status, in menu order
    pub fn legal_actions(self) -> &'static [StatusAction] {
        use StatusAction::*;
        match self {
            ContentStatus::Draft => &[Submit, Delete],
            ContentStatus::SubmittedForReview => &[Approve, Reject, ReturnToDraft, Delete],
            ContentStatus::Approved => &[Publish, ReturnToDraft, Delete],
            ContentStatus::Rejected => &[ReturnToDraft, Delete],
            ContentStatus::Published => &[Unpublish],
        }
    }

    pub fn permits(self, action: StatusAction) -> bool {
        self.legal_actions().contains(&action)
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ContentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown status: {}", s)))
    }
}

/// Menu action on one or more selected rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    Submit,
    Approve,
    Reject,
    Publish,
    Unpublish,
    ReturnToDraft,
    Delete,
}

impl StatusAction {
    pub const ALL: [StatusAction; 7] = [
        StatusAction::Submit,
        StatusAction::Approve,
        StatusAction::Reject,
        StatusAction::Publish,
        StatusAction::Unpublish,
        StatusAction::ReturnToDraft,
        StatusAction::Delete,
    ];

    /// Status reached by applying this action, `None` for `Delete`
    pub fn target_status(self) -> Option<ContentStatus> {
        match self {
            StatusAction::Submit => Some(ContentStatus::SubmittedForReview),
            StatusAction::Approve => Some(ContentStatus::Approved),
            StatusAction::Reject => Some(ContentStatus::Rejected),
            StatusAction::Publish => Some(ContentStatus::Published),
            StatusAction::Unpublish | StatusAction::ReturnToDraft => Some(ContentStatus::Draft),
            StatusAction::Delete => None,
        }
    }

    /// Apply this status-changing action to `from`
    ///
    /// Fails with `Conflict` if the action is not legal from `from`, and with
    /// `InvalidInput` for `Delete`, which removes rows instead of moving them.
    pub fn apply(self, from: ContentStatus) -> Result<ContentStatus> {
        let target = self
            .target_status()
            .ok_or_else(|| Error::InvalidInput("Delete does not change status".to_string()))?;
        if !from.permits(self) {
            return Err(Error::Conflict(format!(
                "Cannot {:?} content in status {}",
                self, from
            )));
        }
        Ok(target)
    }
}

/// Console user role, resolved from the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Editor,
    Reviewer,
    Publisher,
    Admin,
}

impl Role {
    /// Actions this role may invoke, regardless of row status
    pub fn allowed_actions(self) -> &'static [StatusAction] {
        use StatusAction::*;
        match self {
            Role::Editor => &[Submit, ReturnToDraft, Delete],
            Role::Reviewer => &[Approve, Reject, ReturnToDraft],
            Role::Publisher => &[Publish, Unpublish],
            Role::Admin => &StatusAction::ALL,
        }
    }

    pub fn may(self, action: StatusAction) -> bool {
        self.allowed_actions().contains(&action)
    }
}
