//! Core domain logic for the ward household registry.
//! This crate is the single source of truth for registry invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::family::{Family, FamilyId, FamilyInput, HouseOwnership, Zone};
pub use model::member::{Member, MemberFlag, MemberId, MemberInput, Relation};
pub use model::request::{Request, RequestId, RequestStatus};
pub use model::validation::ValidationError;
pub use repo::family_repo::{
    FamilyListQuery, FamilyRepository, MemberListQuery, RecordRef, RepoError, RepoResult,
    SqliteFamilyRepository,
};
pub use repo::request_repo::{RequestListQuery, RequestRepository, SqliteRequestRepository};
pub use service::family_service::FamilyService;
pub use service::request_service::{RequestService, RequestUpdate, StatusUpdate};
pub use service::statistics_service::{RequestSummary, StatisticsService, WardStatistics};
pub use service::{ErrorKind, ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
