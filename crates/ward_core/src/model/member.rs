//! Household member domain model.
//!
//! # Responsibility
//! - Define the member record and its demographic classification flags.
//! - Validate member input before it reaches storage.
//!
//! # Invariants
//! - `family_id` is fixed at construction; updates never change it.
//! - The four classification flags are independent caller-supplied booleans.
//!   Nothing derives them from `date_of_birth`.
//! - `pension_type` is not tied to `is_pensioner`.

use crate::model::family::FamilyId;
use crate::model::validation::{enum_key, optional_label, optional_text, required_label};
use crate::model::validation::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of a household member.
pub type MemberId = Uuid;

pub const MAX_OCCUPATION_CHARS: usize = 255;
pub const MAX_PENSION_TYPE_CHARS: usize = 500;
pub const MAX_MEDICAL_NEEDS_CHARS: usize = 1000;

/// Relation of a member to the head of the household.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum Relation {
    Head,
    Father,
    Mother,
    Husband,
    Wife,
    Son,
    Daughter,
    Brother,
    Sister,
    Grandfather,
    Grandmother,
    Grandson,
    Granddaughter,
    SonInLaw,
    DaughterInLaw,
    Other,
}

impl Relation {
    const ALL: [Relation; 16] = [
        Self::Head,
        Self::Father,
        Self::Mother,
        Self::Husband,
        Self::Wife,
        Self::Son,
        Self::Daughter,
        Self::Brother,
        Self::Sister,
        Self::Grandfather,
        Self::Grandmother,
        Self::Grandson,
        Self::Granddaughter,
        Self::SonInLaw,
        Self::DaughterInLaw,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Head => "HEAD",
            Self::Father => "FATHER",
            Self::Mother => "MOTHER",
            Self::Husband => "HUSBAND",
            Self::Wife => "WIFE",
            Self::Son => "SON",
            Self::Daughter => "DAUGHTER",
            Self::Brother => "BROTHER",
            Self::Sister => "SISTER",
            Self::Grandfather => "GRANDFATHER",
            Self::Grandmother => "GRANDMOTHER",
            Self::Grandson => "GRANDSON",
            Self::Granddaughter => "GRANDDAUGHTER",
            Self::SonInLaw => "SON_IN_LAW",
            Self::DaughterInLaw => "DAUGHTER_IN_LAW",
            Self::Other => "OTHER",
        }
    }
}

impl FromStr for Relation {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = enum_key(value);
        Self::ALL
            .into_iter()
            .find(|relation| relation.as_str() == key)
            .ok_or_else(|| ValidationError::UnknownValue {
                field: "relation",
                value: value.to_string(),
            })
    }
}

impl TryFrom<String> for Relation {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Demographic classification flag used by member lookups and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum MemberFlag {
    Student,
    SeniorCitizen,
    Disabled,
    Pensioner,
}

impl FromStr for MemberFlag {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match enum_key(value).as_str() {
            "STUDENT" | "STUDENTS" => Ok(Self::Student),
            "SENIOR_CITIZEN" | "SENIOR" | "SENIORS" => Ok(Self::SeniorCitizen),
            "DISABLED" => Ok(Self::Disabled),
            "PENSIONER" | "PENSIONERS" => Ok(Self::Pensioner),
            _ => Err(ValidationError::UnknownValue {
                field: "member_flag",
                value: value.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for MemberFlag {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Caller-supplied member fields for create and full-replace update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInput {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub relation: Relation,
    pub phone_number: String,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub is_student: bool,
    #[serde(default)]
    pub is_senior_citizen: bool,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub is_pensioner: bool,
    #[serde(default)]
    pub pension_type: Option<String>,
    #[serde(default)]
    pub medical_needs: Option<String>,
}

impl MemberInput {
    /// Input with every optional field empty and every flag cleared.
    pub fn new(
        name: impl Into<String>,
        date_of_birth: NaiveDate,
        relation: Relation,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            date_of_birth,
            relation,
            phone_number: phone_number.into(),
            occupation: None,
            is_student: false,
            is_senior_citizen: false,
            is_disabled: false,
            is_pensioner: false,
            pension_type: None,
            medical_needs: None,
        }
    }
}

/// Household member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Serialized as `id` to match external schema naming.
    #[serde(rename = "id")]
    pub uuid: MemberId,
    /// Owning household; never changed after construction.
    pub family_id: FamilyId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub relation: Relation,
    pub phone_number: String,
    pub occupation: Option<String>,
    pub is_student: bool,
    pub is_senior_citizen: bool,
    pub is_disabled: bool,
    pub is_pensioner: bool,
    pub pension_type: Option<String>,
    pub medical_needs: Option<String>,
}

impl Member {
    /// Creates a validated member of `family_id` with a generated stable ID.
    pub fn new(family_id: FamilyId, input: &MemberInput) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), family_id, input)
    }

    /// Creates a validated member with a caller-provided stable ID.
    pub fn with_id(
        uuid: MemberId,
        family_id: FamilyId,
        input: &MemberInput,
    ) -> Result<Self, ValidationError> {
        let mut member = Self {
            uuid,
            family_id,
            name: String::new(),
            date_of_birth: input.date_of_birth,
            relation: input.relation,
            phone_number: String::new(),
            occupation: None,
            is_student: false,
            is_senior_citizen: false,
            is_disabled: false,
            is_pensioner: false,
            pension_type: None,
            medical_needs: None,
        };
        member.replace_fields(input)?;
        Ok(member)
    }

    /// Replaces every mutable field. Identity and `family_id` are kept.
    ///
    /// Leaves `self` untouched on error.
    fn replace_fields(&mut self, input: &MemberInput) -> Result<(), ValidationError> {
        let name = required_label("name", &input.name)?;
        let phone_number = required_label("phone_number", &input.phone_number)?;
        let occupation = optional_label(
            "occupation",
            input.occupation.as_deref(),
            MAX_OCCUPATION_CHARS,
        )?;
        let pension_type = optional_label(
            "pension_type",
            input.pension_type.as_deref(),
            MAX_PENSION_TYPE_CHARS,
        )?;
        let medical_needs = optional_text(
            "medical_needs",
            input.medical_needs.as_deref(),
            MAX_MEDICAL_NEEDS_CHARS,
        )?;

        self.name = name;
        self.date_of_birth = input.date_of_birth;
        self.relation = input.relation;
        self.phone_number = phone_number;
        self.occupation = occupation;
        self.is_student = input.is_student;
        self.is_senior_citizen = input.is_senior_citizen;
        self.is_disabled = input.is_disabled;
        self.is_pensioner = input.is_pensioner;
        self.pension_type = pension_type;
        self.medical_needs = medical_needs;
        Ok(())
    }

    /// Returns whether the given classification flag is set.
    pub fn has_flag(&self, flag: MemberFlag) -> bool {
        match flag {
            MemberFlag::Student => self.is_student,
            MemberFlag::SeniorCitizen => self.is_senior_citizen,
            MemberFlag::Disabled => self.is_disabled,
            MemberFlag::Pensioner => self.is_pensioner,
        }
    }

    /// Re-checks invariants of an already constructed record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if self.phone_number.trim().is_empty() {
            return Err(ValidationError::EmptyField("phone_number"));
        }
        for (field, value, max_chars) in [
            ("occupation", &self.occupation, MAX_OCCUPATION_CHARS),
            ("pension_type", &self.pension_type, MAX_PENSION_TYPE_CHARS),
            ("medical_needs", &self.medical_needs, MAX_MEDICAL_NEEDS_CHARS),
        ] {
            if let Some(value) = value {
                let actual_chars = value.chars().count();
                if actual_chars > max_chars {
                    return Err(ValidationError::TooLong {
                        field,
                        max_chars,
                        actual_chars,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Member, MemberFlag, MemberInput, Relation};
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn alice() -> MemberInput {
        MemberInput::new(
            "Alice",
            NaiveDate::from_ymd_opt(2008, 4, 2).unwrap(),
            Relation::Daughter,
            "555-0101",
        )
    }

    #[test]
    fn flags_default_to_false_and_stay_independent() {
        let family_id = Uuid::new_v4();
        let mut input = alice();
        let member = Member::new(family_id, &input).unwrap();
        assert!(!member.is_student);
        assert!(!member.is_senior_citizen);
        assert!(!member.is_disabled);
        assert!(!member.is_pensioner);

        input.is_student = true;
        input.is_disabled = true;
        input.is_senior_citizen = true;
        let member = Member::new(family_id, &input).unwrap();
        assert!(member.has_flag(MemberFlag::Student));
        assert!(member.has_flag(MemberFlag::SeniorCitizen));
        assert!(member.has_flag(MemberFlag::Disabled));
        assert!(!member.has_flag(MemberFlag::Pensioner));
    }

    #[test]
    fn pension_type_is_accepted_without_pensioner_flag() {
        let mut input = alice();
        input.pension_type = Some("Widow".to_string());
        let member = Member::new(Uuid::new_v4(), &input).unwrap();
        assert!(!member.is_pensioner);
        assert_eq!(member.pension_type.as_deref(), Some("Widow"));
    }

    #[test]
    fn replace_fields_never_moves_member_to_another_family() {
        let family_id = Uuid::new_v4();
        let mut member = Member::new(family_id, &alice()).unwrap();
        let id = member.uuid;

        let mut update = alice();
        update.name = "Alice B".to_string();
        update.occupation = Some("Carpenter".to_string());
        member.replace_fields(&update).unwrap();

        assert_eq!(member.uuid, id);
        assert_eq!(member.family_id, family_id);
        assert_eq!(member.name, "Alice B");
        assert_eq!(member.occupation.as_deref(), Some("Carpenter"));
    }

    #[test]
    fn required_fields_and_bounds_are_enforced() {
        let mut input = alice();
        input.phone_number = " ".to_string();
        assert_eq!(
            Member::new(Uuid::new_v4(), &input).unwrap_err(),
            ValidationError::EmptyField("phone_number")
        );

        let mut input = alice();
        input.medical_needs = Some("x".repeat(1001));
        assert!(matches!(
            Member::new(Uuid::new_v4(), &input).unwrap_err(),
            ValidationError::TooLong {
                field: "medical_needs",
                ..
            }
        ));
    }

    #[test]
    fn relation_parses_free_form_spellings() {
        assert_eq!("Father".parse::<Relation>(), Ok(Relation::Father));
        assert_eq!("son-in-law".parse::<Relation>(), Ok(Relation::SonInLaw));
        assert_eq!(
            "Neighbour".parse::<Relation>(),
            Err(ValidationError::UnknownValue {
                field: "relation",
                value: "Neighbour".to_string()
            })
        );
    }

    #[test]
    fn member_flag_accepts_lookup_aliases() {
        assert_eq!("seniors".parse::<MemberFlag>(), Ok(MemberFlag::SeniorCitizen));
        assert_eq!("Senior Citizen".parse::<MemberFlag>(), Ok(MemberFlag::SeniorCitizen));
        assert_eq!("students".parse::<MemberFlag>(), Ok(MemberFlag::Student));
        assert!("veteran".parse::<MemberFlag>().is_err());
    }
}
