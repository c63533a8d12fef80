//! Family (household) domain model.
//!
//! # Responsibility
//! - Define the household record and its zone/ownership classification.
//! - Validate household input before it reaches storage.
//!
//! # Invariants
//! - `zone` is always within `1..=5`.
//! - `house_number` is always positive.
//! - `family_name` and `address` are never blank.
//! - Member ownership lives in storage (`members.family_uuid`), not here.

use crate::model::validation::{enum_key, required_label, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of a household.
pub type FamilyId = Uuid;

/// Administrative sub-area of the ward, `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Zone(u8);

impl Zone {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validates a raw zone number.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::ZoneOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Zone {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Zone> for i64 {
    fn from(value: Zone) -> Self {
        i64::from(value.0)
    }
}

impl Display for Zone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the household owns or rents its house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum HouseOwnership {
    Owned,
    Rental,
}

impl HouseOwnership {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owned => "OWNED",
            Self::Rental => "RENTAL",
        }
    }
}

impl FromStr for HouseOwnership {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match enum_key(value).as_str() {
            "OWNED" => Ok(Self::Owned),
            "RENTAL" => Ok(Self::Rental),
            _ => Err(ValidationError::UnknownValue {
                field: "house_ownership",
                value: value.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for HouseOwnership {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Caller-supplied household fields for create and full-replace update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyInput {
    pub family_name: String,
    /// Raw zone number; validated into [`Zone`].
    pub zone: i64,
    pub house_number: i64,
    pub house_ownership: HouseOwnership,
    pub address: String,
}

/// Household record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    /// Serialized as `id` to match external schema naming.
    #[serde(rename = "id")]
    pub uuid: FamilyId,
    pub family_name: String,
    pub zone: Zone,
    pub house_number: u32,
    pub house_ownership: HouseOwnership,
    pub address: String,
}

/// Validated mutable household fields.
struct FamilyFields {
    family_name: String,
    zone: Zone,
    house_number: u32,
    house_ownership: HouseOwnership,
    address: String,
}

impl FamilyFields {
    fn validate(input: &FamilyInput) -> Result<Self, ValidationError> {
        let family_name = required_label("family_name", &input.family_name)?;
        let zone = Zone::new(input.zone)?;
        let house_number = u32::try_from(input.house_number)
            .ok()
            .filter(|value| *value > 0)
            .ok_or(ValidationError::InvalidHouseNumber(input.house_number))?;
        let address = required_label("address", &input.address)?;
        Ok(Self {
            family_name,
            zone,
            house_number,
            house_ownership: input.house_ownership,
            address,
        })
    }
}

impl Family {
    /// Creates a validated household with a generated stable ID.
    pub fn new(input: &FamilyInput) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), input)
    }

    /// Creates a validated household with a caller-provided stable ID.
    pub fn with_id(uuid: FamilyId, input: &FamilyInput) -> Result<Self, ValidationError> {
        let fields = FamilyFields::validate(input)?;
        Ok(Self {
            uuid,
            family_name: fields.family_name,
            zone: fields.zone,
            house_number: fields.house_number,
            house_ownership: fields.house_ownership,
            address: fields.address,
        })
    }

    /// Re-checks invariants of an already constructed record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.family_name.trim().is_empty() {
            return Err(ValidationError::EmptyField("family_name"));
        }
        if self.house_number == 0 {
            return Err(ValidationError::InvalidHouseNumber(0));
        }
        if self.address.trim().is_empty() {
            return Err(ValidationError::EmptyField("address"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Family, FamilyInput, HouseOwnership, Zone};
    use crate::model::validation::ValidationError;

    fn input(zone: i64) -> FamilyInput {
        FamilyInput {
            family_name: "Smith".to_string(),
            zone,
            house_number: 12,
            house_ownership: HouseOwnership::Owned,
            address: "4 Mill Lane".to_string(),
        }
    }

    #[test]
    fn every_zone_in_range_is_accepted() {
        for zone in 1..=5 {
            let family = Family::new(&input(zone)).expect("zone in range");
            assert_eq!(i64::from(family.zone), zone);
        }
    }

    #[test]
    fn zones_outside_range_are_rejected() {
        for zone in [i64::MIN, -1, 0, 6, 255, 256] {
            assert_eq!(
                Family::new(&input(zone)).unwrap_err(),
                ValidationError::ZoneOutOfRange(zone)
            );
        }
    }

    #[test]
    fn house_number_must_be_positive() {
        let mut bad = input(1);
        bad.house_number = 0;
        assert_eq!(
            Family::new(&bad).unwrap_err(),
            ValidationError::InvalidHouseNumber(0)
        );
        bad.house_number = -4;
        assert!(Family::new(&bad).is_err());
    }

    #[test]
    fn blank_name_or_address_is_rejected() {
        let mut bad = input(2);
        bad.family_name = "   ".to_string();
        assert_eq!(
            Family::new(&bad).unwrap_err(),
            ValidationError::EmptyField("family_name")
        );

        let mut bad = input(2);
        bad.address = String::new();
        assert_eq!(
            Family::new(&bad).unwrap_err(),
            ValidationError::EmptyField("address")
        );
    }

    #[test]
    fn with_id_keeps_caller_identity() {
        let id = uuid::Uuid::new_v4();
        let mut update = input(4);
        update.family_name = "Smith  Jones".to_string();
        let family = Family::with_id(id, &update).unwrap();
        assert_eq!(family.uuid, id);
        assert_eq!(family.family_name, "Smith Jones");
        assert_eq!(family.zone, Zone::new(4).unwrap());
    }

    #[test]
    fn ownership_parses_case_insensitively() {
        assert_eq!("owned".parse::<HouseOwnership>(), Ok(HouseOwnership::Owned));
        assert_eq!(" Rental ".parse::<HouseOwnership>(), Ok(HouseOwnership::Rental));
        assert!("leased".parse::<HouseOwnership>().is_err());
    }
}
