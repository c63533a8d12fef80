//! Family/member aggregate use-case service.
//!
//! # Responsibility
//! - Create, update, list and delete households and their members.
//! - Provide zone, name, flag and occupation lookups.
//!
//! # Invariants
//! - Updates use full replacement semantics; identity and owning family of a
//!   member never change.
//! - Deleting a family removes all its members atomically.
//! - Lookups with no match return an empty list; fetching an unknown id
//!   returns `None`; mutating an unknown id returns `NotFound`.

use crate::model::family::{Family, FamilyId, FamilyInput, Zone};
use crate::model::member::{Member, MemberFlag, MemberId, MemberInput};
use crate::repo::family_repo::{FamilyListQuery, FamilyRepository, MemberListQuery, RecordRef};
use crate::service::{rejected, ServiceError, ServiceResult};
use log::info;

/// Household registry service facade.
pub struct FamilyService<R: FamilyRepository> {
    repo: R,
}

impl<R: FamilyRepository> FamilyService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a household.
    ///
    /// # Errors
    /// - `Validation` when zone is outside `1..=5`, house number is not
    ///   positive, or name/address is blank.
    pub fn create_family(&self, input: &FamilyInput) -> ServiceResult<Family> {
        let family = Family::new(input).map_err(|err| rejected("family_create", err))?;
        self.repo.create_family(&family)?;
        info!(
            "event=family_create module=service status=ok family_id={} zone={}",
            family.uuid, family.zone
        );
        Ok(family)
    }

    /// Replaces every mutable household field.
    pub fn update_family(&self, id: FamilyId, input: &FamilyInput) -> ServiceResult<Family> {
        let family = Family::with_id(id, input).map_err(|err| rejected("family_update", err))?;
        self.repo.update_family(&family)?;
        info!("event=family_update module=service status=ok family_id={id}");
        Ok(family)
    }

    /// Gets one household by ID.
    pub fn get_family(&self, id: FamilyId) -> ServiceResult<Option<Family>> {
        Ok(self.repo.get_family(id)?)
    }

    /// Lists all households in registration order.
    pub fn list_families(&self) -> ServiceResult<Vec<Family>> {
        Ok(self.repo.list_families(&FamilyListQuery::default())?)
    }

    /// Lists households in one zone.
    ///
    /// # Errors
    /// - `Validation` when `zone` is outside `1..=5`.
    pub fn list_by_zone(&self, zone: i64) -> ServiceResult<Vec<Family>> {
        let zone = Zone::new(zone).map_err(|err| rejected("family_list_zone", err))?;
        let query = FamilyListQuery {
            zone: Some(zone),
            ..FamilyListQuery::default()
        };
        Ok(self.repo.list_families(&query)?)
    }

    /// Case-insensitive substring search on household name.
    pub fn search_by_name(&self, text: &str) -> ServiceResult<Vec<Family>> {
        let query = FamilyListQuery {
            name_contains: Some(text.to_string()),
            ..FamilyListQuery::default()
        };
        Ok(self.repo.list_families(&query)?)
    }

    /// Deletes a household and every member it owns.
    ///
    /// Returns the removed member IDs. Requests raised by those members are
    /// left in place.
    pub fn delete_family(&self, id: FamilyId) -> ServiceResult<Vec<MemberId>> {
        let removed = self.repo.delete_family(id)?;
        info!(
            "event=family_delete module=service status=ok family_id={id} removed_members={}",
            removed.len()
        );
        Ok(removed)
    }

    /// Adds a member to an existing household.
    ///
    /// # Errors
    /// - `Validation` for blank name/phone or over-long optional text.
    /// - `NotFound` when `family_id` does not resolve.
    pub fn add_member(&self, family_id: FamilyId, input: &MemberInput) -> ServiceResult<Member> {
        let member = Member::new(family_id, input).map_err(|err| rejected("member_add", err))?;
        self.repo.add_member(&member)?;
        info!(
            "event=member_add module=service status=ok family_id={family_id} member_id={}",
            member.uuid
        );
        Ok(member)
    }

    /// Replaces every mutable member field. The owning family is kept.
    ///
    /// # Errors
    /// - `Validation` for bad input, checked before the member is looked up.
    /// - `NotFound` when `id` does not resolve.
    pub fn update_member(&self, id: MemberId, input: &MemberInput) -> ServiceResult<Member> {
        let mut member = Member::with_id(id, FamilyId::nil(), input)
            .map_err(|err| rejected("member_update", err))?;
        member.family_id = self
            .repo
            .get_member(id)?
            .ok_or(ServiceError::NotFound(RecordRef::Member(id)))?
            .family_id;
        self.repo.update_member(&member)?;
        info!("event=member_update module=service status=ok member_id={id}");
        Ok(member)
    }

    /// Gets one member by ID.
    pub fn get_member(&self, id: MemberId) -> ServiceResult<Option<Member>> {
        Ok(self.repo.get_member(id)?)
    }

    /// Lists every member in registration order.
    pub fn list_members(&self) -> ServiceResult<Vec<Member>> {
        Ok(self.repo.list_members(&MemberListQuery::default())?)
    }

    /// Lists the members of one household in insertion order.
    ///
    /// # Errors
    /// - `NotFound` when the household does not exist, so callers can tell an
    ///   unknown household from an empty one.
    pub fn list_family_members(&self, family_id: FamilyId) -> ServiceResult<Vec<Member>> {
        if self.repo.get_family(family_id)?.is_none() {
            return Err(ServiceError::NotFound(RecordRef::Family(family_id)));
        }
        let query = MemberListQuery {
            family_id: Some(family_id),
            ..MemberListQuery::default()
        };
        Ok(self.repo.list_members(&query)?)
    }

    /// Removes one member from its household.
    pub fn delete_member(&self, id: MemberId) -> ServiceResult<()> {
        self.repo.delete_member(id)?;
        info!("event=member_delete module=service status=ok member_id={id}");
        Ok(())
    }

    /// Lists members whose classification `flag` is set.
    pub fn list_members_with_flag(&self, flag: MemberFlag) -> ServiceResult<Vec<Member>> {
        let query = MemberListQuery {
            flag: Some(flag),
            ..MemberListQuery::default()
        };
        Ok(self.repo.list_members(&query)?)
    }

    /// Case-insensitive substring search on member name or phone number.
    pub fn search_members(&self, text: &str) -> ServiceResult<Vec<Member>> {
        let query = MemberListQuery {
            text: Some(text.to_string()),
            ..MemberListQuery::default()
        };
        Ok(self.repo.list_members(&query)?)
    }

    /// Case-insensitive substring search on member occupation.
    ///
    /// Members without an occupation never match.
    pub fn list_members_by_occupation(&self, text: &str) -> ServiceResult<Vec<Member>> {
        let query = MemberListQuery {
            occupation_contains: Some(text.to_string()),
            ..MemberListQuery::default()
        };
        Ok(self.repo.list_members(&query)?)
    }
}
