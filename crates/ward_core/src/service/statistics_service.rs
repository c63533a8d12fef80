//! Ward-wide aggregate counts.
//!
//! Counts are computed from storage on every call; nothing is cached.

use crate::model::member::MemberFlag;
use crate::model::request::RequestStatus;
use crate::repo::family_repo::FamilyRepository;
use crate::repo::request_repo::RequestRepository;
use crate::service::ServiceResult;
use log::debug;
use serde::{Deserialize, Serialize};

/// Registry totals shown on the ward dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardStatistics {
    pub total_families: u64,
    pub total_members: u64,
    pub disabled_members: u64,
    pub senior_citizens: u64,
    pub students: u64,
}

/// Request counts per lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub rejected: u64,
}

impl RequestSummary {
    pub fn total(&self) -> u64 {
        self.pending + self.in_progress + self.completed + self.rejected
    }
}

/// Read-only statistics facade over both repositories.
pub struct StatisticsService<F: FamilyRepository, Q: RequestRepository> {
    families: F,
    requests: Q,
}

impl<F: FamilyRepository, Q: RequestRepository> StatisticsService<F, Q> {
    pub fn new(families: F, requests: Q) -> Self {
        Self { families, requests }
    }

    /// Returns the five registry totals.
    ///
    /// Flag counts are independent: one member may add to several of them.
    pub fn statistics(&self) -> ServiceResult<WardStatistics> {
        let stats = WardStatistics {
            total_families: self.families.count_families()?,
            total_members: self.families.count_members(None)?,
            disabled_members: self.families.count_members(Some(MemberFlag::Disabled))?,
            senior_citizens: self
                .families
                .count_members(Some(MemberFlag::SeniorCitizen))?,
            students: self.families.count_members(Some(MemberFlag::Student))?,
        };
        debug!(
            "event=statistics module=service status=ok families={} members={}",
            stats.total_families, stats.total_members
        );
        Ok(stats)
    }

    /// Number of members receiving a pension.
    pub fn pensioners(&self) -> ServiceResult<u64> {
        Ok(self.families.count_members(Some(MemberFlag::Pensioner))?)
    }

    /// Returns request counts grouped by status.
    pub fn request_summary(&self) -> ServiceResult<RequestSummary> {
        let count = |status| self.requests.count_requests(Some(status));
        Ok(RequestSummary {
            pending: count(RequestStatus::Pending)?,
            in_progress: count(RequestStatus::InProgress)?,
            completed: count(RequestStatus::Completed)?,
            rejected: count(RequestStatus::Rejected)?,
        })
    }
}
