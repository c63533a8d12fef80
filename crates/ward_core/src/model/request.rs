//! Service request domain model and status lifecycle.
//!
//! # Responsibility
//! - Define the request record raised on behalf of one member.
//! - Apply the completion-stamp rule on every status change.
//!
//! # Invariants
//! - New requests start as `Pending` with `completed_at = None`.
//! - `member_id` and `created_at` never change after construction.
//! - Any status may follow any status; there is no transition graph.
//! - Setting `Completed` or `Rejected` stamps `completed_at` with a value
//!   `>= created_at`. Leaving a terminal status keeps the stamp.

use crate::model::member::MemberId;
use crate::model::validation::{enum_key, optional_text, required_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of a service request.
pub type RequestId = Uuid;

pub const MAX_DESCRIPTION_CHARS: usize = 2000;
pub const MAX_NOTES_CHARS: usize = 1000;

/// Request lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum RequestStatus {
    /// Submitted, not yet triaged.
    Pending,
    /// Being handled by the ward office.
    InProgress,
    /// Resolved successfully. Terminal.
    Completed,
    /// Declined. Terminal.
    Rejected,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Returns whether entering this status stamps `completed_at`.
    pub fn is_terminal(self) -> bool {
        match self {
            Self::Completed | Self::Rejected => true,
            Self::Pending | Self::InProgress => false,
        }
    }
}

impl Display for RequestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match enum_key(value).as_str() {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(ValidationError::UnknownValue {
                field: "status",
                value: value.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Service request record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Serialized as `id` to match external schema naming.
    #[serde(rename = "id")]
    pub uuid: RequestId,
    pub member_id: MemberId,
    #[serde(rename = "requestDescription")]
    pub description: String,
    /// Unix epoch milliseconds.
    #[serde(rename = "requestDate")]
    pub created_at: i64,
    pub status: RequestStatus,
    /// Unix epoch milliseconds. Set once a terminal status is entered.
    #[serde(rename = "completedDate")]
    pub completed_at: Option<i64>,
    pub notes: Option<String>,
}

impl Request {
    /// Creates a pending request with a generated stable ID.
    pub fn new(
        member_id: MemberId,
        description: &str,
        created_at: i64,
    ) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), member_id, description, created_at)
    }

    /// Creates a pending request with a caller-provided stable ID.
    pub fn with_id(
        uuid: RequestId,
        member_id: MemberId,
        description: &str,
        created_at: i64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            uuid,
            member_id,
            description: Self::normalize_description(description)?,
            created_at,
            status: RequestStatus::Pending,
            completed_at: None,
            notes: None,
        })
    }

    /// Moves the request to `status` at time `at`.
    ///
    /// Terminal statuses stamp `completed_at`, clamped to `created_at` so the
    /// stamp never predates creation under clock skew.
    pub fn transition(&mut self, status: RequestStatus, at: i64) {
        self.status = status;
        if status.is_terminal() {
            self.completed_at = Some(at.max(self.created_at));
        }
    }

    /// Checks and trims a description before it is stored.
    pub fn normalize_description(description: &str) -> Result<String, ValidationError> {
        required_text("description", description, MAX_DESCRIPTION_CHARS)
    }

    /// Checks and trims notes before they are stored. Blank notes become `None`.
    pub fn normalize_notes(notes: Option<&str>) -> Result<Option<String>, ValidationError> {
        optional_text("notes", notes, MAX_NOTES_CHARS)
    }

    /// Re-checks invariants of an already constructed record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        required_text("description", &self.description, MAX_DESCRIPTION_CHARS)?;
        optional_text("notes", self.notes.as_deref(), MAX_NOTES_CHARS)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Request, RequestStatus};
    use crate::model::validation::ValidationError;
    use uuid::Uuid;

    #[test]
    fn new_request_is_pending_without_completion() {
        let request = Request::new(Uuid::new_v4(), "need ramp access", 1_000).unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.created_at, 1_000);
        assert_eq!(request.completed_at, None);
        assert_eq!(request.notes, None);
    }

    #[test]
    fn terminal_statuses_stamp_completion() {
        for status in [RequestStatus::Completed, RequestStatus::Rejected] {
            let mut request = Request::new(Uuid::new_v4(), "fix roof", 1_000).unwrap();
            request.transition(status, 5_000);
            assert_eq!(request.completed_at, Some(5_000));
            assert!(request.status.is_terminal());
        }
    }

    #[test]
    fn completion_stamp_never_predates_creation() {
        let mut request = Request::new(Uuid::new_v4(), "fix roof", 9_000).unwrap();
        request.transition(RequestStatus::Completed, 8_000);
        assert_eq!(request.completed_at, Some(9_000));
    }

    #[test]
    fn reopening_keeps_completion_stamp() {
        let mut request = Request::new(Uuid::new_v4(), "fix roof", 1_000).unwrap();
        request.transition(RequestStatus::Rejected, 2_000);
        request.transition(RequestStatus::Pending, 3_000);
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.completed_at, Some(2_000));

        request.transition(RequestStatus::InProgress, 4_000);
        assert_eq!(request.completed_at, Some(2_000));
    }

    #[test]
    fn non_terminal_transitions_do_not_stamp() {
        let mut request = Request::new(Uuid::new_v4(), "fix roof", 1_000).unwrap();
        request.transition(RequestStatus::InProgress, 2_000);
        assert_eq!(request.completed_at, None);
    }

    #[test]
    fn status_parses_wire_and_loose_spellings() {
        assert_eq!("PENDING".parse::<RequestStatus>(), Ok(RequestStatus::Pending));
        assert_eq!("in_progress".parse::<RequestStatus>(), Ok(RequestStatus::InProgress));
        assert_eq!("In Progress".parse::<RequestStatus>(), Ok(RequestStatus::InProgress));
        assert_eq!(
            "DONE".parse::<RequestStatus>(),
            Err(ValidationError::UnknownValue {
                field: "status",
                value: "DONE".to_string()
            })
        );
    }

    #[test]
    fn description_is_required_and_bounded() {
        assert_eq!(
            Request::new(Uuid::new_v4(), "  ", 0).unwrap_err(),
            ValidationError::EmptyField("description")
        );
        assert!(Request::new(Uuid::new_v4(), &"x".repeat(2001), 0).is_err());
        assert!(Request::new(Uuid::new_v4(), &"x".repeat(2000), 0).is_ok());
    }

    #[test]
    fn blank_notes_normalize_to_none() {
        assert_eq!(
            Request::normalize_notes(Some(" called owner ")),
            Ok(Some("called owner".to_string()))
        );
        assert_eq!(Request::normalize_notes(Some("  ")), Ok(None));
        assert_eq!(Request::normalize_notes(None), Ok(None));
        assert!(Request::normalize_notes(Some(&"x".repeat(1001))).is_err());
    }
}
