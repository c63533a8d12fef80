//! Service request lifecycle use-case service.
//!
//! # Responsibility
//! - Raise requests for existing members and move them through their statuses.
//! - Provide status, member and description projections.
//!
//! # Invariants
//! - New requests are always `PENDING` with no completion stamp.
//! - Status text, description and notes are validated before any storage
//!   access; a bad value is a validation error even for an unknown id.
//! - Every call that sets `COMPLETED` or `REJECTED` stamps `completed_at`.
//!   Moving back to an open status keeps the stamp.
//! - Notes are replaced, never appended.

use crate::model::member::MemberId;
use crate::model::now_epoch_ms;
use crate::model::request::{Request, RequestId, RequestStatus};
use crate::repo::family_repo::RecordRef;
use crate::repo::request_repo::{RequestListQuery, RequestRepository};
use crate::service::{rejected, ServiceError, ServiceResult};
use log::info;
use serde::{Deserialize, Serialize};

/// Status change payload as received at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    /// One of `PENDING | IN_PROGRESS | COMPLETED | REJECTED`.
    pub status: String,
    /// Replaces stored notes when present.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Full-replace payload for a request's mutable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestUpdate {
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request lifecycle service facade.
pub struct RequestService<R: RequestRepository> {
    repo: R,
    clock: fn() -> i64,
}

impl<R: RequestRepository> RequestService<R> {
    /// Creates a service using the provided repository and the system clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, now_epoch_ms)
    }

    /// Creates a service with an explicit epoch-millisecond clock.
    pub fn with_clock(repo: R, clock: fn() -> i64) -> Self {
        Self { repo, clock }
    }

    /// Raises a new request for an existing member.
    ///
    /// # Errors
    /// - `Validation` for blank or over-long description.
    /// - `NotFound` when `member_id` does not resolve.
    pub fn create_request(&self, member_id: MemberId, description: &str) -> ServiceResult<Request> {
        let request = Request::new(member_id, description, (self.clock)())
            .map_err(|err| rejected("request_create", err))?;
        self.repo.create_request(&request)?;
        info!(
            "event=request_create module=service status=ok request_id={} member_id={member_id}",
            request.uuid
        );
        Ok(request)
    }

    /// Applies a status change received as text.
    ///
    /// # Errors
    /// - `Validation` when `update.status` is not a recognized status or the
    ///   notes are too long.
    /// - `NotFound` when `id` does not resolve.
    pub fn set_status(&self, id: RequestId, update: &StatusUpdate) -> ServiceResult<Request> {
        let status = update
            .status
            .parse::<RequestStatus>()
            .map_err(|err| rejected("request_status", err))?;
        self.transition(id, status, update.notes.as_deref())
    }

    /// Moves a request to `status`, replacing notes when `notes` is present.
    pub fn transition(
        &self,
        id: RequestId,
        status: RequestStatus,
        notes: Option<&str>,
    ) -> ServiceResult<Request> {
        let notes = notes
            .map(|notes| Request::normalize_notes(Some(notes)))
            .transpose()
            .map_err(|err| rejected("request_status", err))?;
        let mut request = self.load(id)?;
        let previous = request.status;
        if let Some(notes) = notes {
            request.notes = notes;
        }
        request.transition(status, (self.clock)());
        self.repo.update_request(&request)?;
        info!(
            "event=request_status module=service status=ok request_id={id} from={previous} to={status}"
        );
        Ok(request)
    }

    /// Replaces description, status and notes.
    ///
    /// The completion stamp rule applies only when the status changes, so
    /// editing the text of a closed request keeps its first stamp.
    pub fn update_request(&self, id: RequestId, update: &RequestUpdate) -> ServiceResult<Request> {
        let (status, description, notes) = update
            .status
            .parse::<RequestStatus>()
            .and_then(|status| {
                let description = Request::normalize_description(&update.description)?;
                let notes = Request::normalize_notes(update.notes.as_deref())?;
                Ok((status, description, notes))
            })
            .map_err(|err| rejected("request_update", err))?;
        let mut request = self.load(id)?;
        request.description = description;
        request.notes = notes;
        if request.status != status {
            request.transition(status, (self.clock)());
        }
        self.repo.update_request(&request)?;
        info!("event=request_update module=service status=ok request_id={id}");
        Ok(request)
    }

    /// Gets one request by ID.
    pub fn get_request(&self, id: RequestId) -> ServiceResult<Option<Request>> {
        Ok(self.repo.get_request(id)?)
    }

    /// Lists every request, most recently created first.
    pub fn list_all_ordered_by_date_descending(&self) -> ServiceResult<Vec<Request>> {
        Ok(self.repo.list_requests(&RequestListQuery::default())?)
    }

    /// Lists requests in one status, most recently created first.
    pub fn list_by_status(&self, status: RequestStatus) -> ServiceResult<Vec<Request>> {
        let query = RequestListQuery {
            status: Some(status),
            ..RequestListQuery::default()
        };
        Ok(self.repo.list_requests(&query)?)
    }

    /// Lists requests raised for one member, most recently created first.
    ///
    /// Requests whose member was removed with its family are still returned.
    pub fn list_by_member(&self, member_id: MemberId) -> ServiceResult<Vec<Request>> {
        let query = RequestListQuery {
            member_id: Some(member_id),
            ..RequestListQuery::default()
        };
        Ok(self.repo.list_requests(&query)?)
    }

    /// Case-insensitive substring search on request description.
    pub fn search_by_description(&self, text: &str) -> ServiceResult<Vec<Request>> {
        let query = RequestListQuery {
            description_contains: Some(text.to_string()),
            ..RequestListQuery::default()
        };
        Ok(self.repo.list_requests(&query)?)
    }

    /// Deletes one request.
    pub fn delete_request(&self, id: RequestId) -> ServiceResult<()> {
        self.repo.delete_request(id)?;
        info!("event=request_delete module=service status=ok request_id={id}");
        Ok(())
    }

    fn load(&self, id: RequestId) -> ServiceResult<Request> {
        self.repo
            .get_request(id)?
            .ok_or(ServiceError::NotFound(RecordRef::Request(id)))
    }
}
