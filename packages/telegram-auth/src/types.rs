//! Workflow result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Outcome of one workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowStatus {
    /// The user has not answered yet; poll again
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "cancel")]
    Cancelled,
    #[serde(rename = "success")]
    Success,
}

/// Telegram account data as returned by the login widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default, with = "chrono::serde::ts_seconds")]
    pub auth_date: DateTime<Utc>,
    #[serde(default)]
    pub hash: String,
    /// Filled in locally; the remote never sends it
    #[serde(default)]
    pub phone: String,
}

/// What a caller gets back from [`send_push`](crate::TelegramAuth::send_push)
/// or [`check_acceptance`](crate::TelegramAuth::check_acceptance).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmationResult {
    #[serde(skip)]
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    pub status: WorkflowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConfirmationResult {
    pub fn pending(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            user: None,
            status: WorkflowStatus::Pending,
            error: None,
        }
    }

    pub fn success(phone: impl Into<String>, user: Option<UserProfile>) -> Self {
        Self {
            phone: phone.into(),
            user,
            status: WorkflowStatus::Success,
            error: None,
        }
    }

    pub fn cancelled(phone: impl Into<String>, error: &AuthError) -> Self {
        Self {
            phone: phone.into(),
            user: None,
            status: WorkflowStatus::Cancelled,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == WorkflowStatus::Success
    }
}
