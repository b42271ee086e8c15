//! # Work Items and Completion Tokens
//!
//! A [`WorkItem`] describes a single `createPermission` call. The driver
//! produces them, exactly one worker consumes each, and the worker answers
//! with exactly one [`Completion`] regardless of how the call ended.
//!
//! ## Constants
//!
//! The synthetic stress-test identities are fixed so that runs against a
//! shared IAM deployment are easy to find and clean up afterwards. Only the
//! object AUI varies: it carries a fresh UUID so repeated runs never collide.

use crate::{Error, Result, proto::CreatePermissionRequest};
use uuid::Uuid;

/// Subject granted every synthetic permission.
pub const SUBJECT_AUI: &str = "aui:iam:user/userfoo";

/// Prefix of the per-item object AUI. A UUID v4 is appended.
pub const ASSET_PREFIX: &str = "aui:asset:vehicle/stress-test-";

/// Role attached to every synthetic permission.
pub const ROLE_AUI: &str = "aui:iam:role/vehicle-driver";

/// Subject recorded as the requestor of every synthetic permission.
pub const REQUESTOR_AUI: &str = "aui:iam:user/stress-test-runner";

/// An immutable permission-creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    subject_aui: String,
    object_aui: String,
    role_aui: String,
    requestor_aui: String,
}

impl WorkItem {
    /// Builds a work item from four AUIs.
    ///
    /// Only emptiness is checked; AUI format is validated by the service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if any identifier is empty.
    pub fn new(
        subject_aui: impl Into<String>,
        object_aui: impl Into<String>,
        role_aui: impl Into<String>,
        requestor_aui: impl Into<String>,
    ) -> Result<Self> {
        let item = Self {
            subject_aui: subject_aui.into(),
            object_aui: object_aui.into(),
            role_aui: role_aui.into(),
            requestor_aui: requestor_aui.into(),
        };

        for (field, value) in [
            ("subject_aui", &item.subject_aui),
            ("object_aui", &item.object_aui),
            ("role_aui", &item.role_aui),
            ("requestor_aui", &item.requestor_aui),
        ] {
            if value.is_empty() {
                return Err(Error::InvalidRequest {
                    reason: format!("{field} must not be empty"),
                });
            }
        }

        Ok(item)
    }

    /// Builds the stress-test item the driver dispatches, with a unique
    /// object AUI.
    pub fn synthetic() -> Self {
        Self {
            subject_aui: SUBJECT_AUI.to_owned(),
            object_aui: format!("{ASSET_PREFIX}{}", Uuid::new_v4()),
            role_aui: ROLE_AUI.to_owned(),
            requestor_aui: REQUESTOR_AUI.to_owned(),
        }
    }

    pub fn subject_aui(&self) -> &str {
        &self.subject_aui
    }

    pub fn object_aui(&self) -> &str {
        &self.object_aui
    }

    pub fn role_aui(&self) -> &str {
        &self.role_aui
    }

    pub fn requestor_aui(&self) -> &str {
        &self.requestor_aui
    }
}

impl From<&WorkItem> for CreatePermissionRequest {
    fn from(item: &WorkItem) -> Self {
        Self {
            subject_aui: item.subject_aui.clone(),
            object_aui: item.object_aui.clone(),
            role_aui: item.role_aui.clone(),
            requesting_subject_aui: item.requestor_aui.clone(),
        }
    }
}

/// How a single RPC attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
}

/// Token a worker sends after every attempted [`WorkItem`].
///
/// The driver counts these to know when all dispatched work has been
/// attempted. A failed call still produces a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub worker_id: usize,
    pub outcome: Outcome,
}
