use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;
use ward_core::{
    Family, FamilyInput, HouseOwnership, Member, MemberFlag, MemberInput, Relation, Request,
    RequestStatus, StatusUpdate,
};

#[test]
fn family_serializes_with_external_field_names() {
    let family = Family::new(&FamilyInput {
        family_name: "Smith".to_string(),
        zone: 3,
        house_number: 21,
        house_ownership: HouseOwnership::Owned,
        address: "Station Road".to_string(),
    })
    .unwrap();

    let value = serde_json::to_value(&family).unwrap();
    assert_eq!(value["id"], json!(family.uuid.to_string()));
    assert_eq!(value["familyName"], json!("Smith"));
    assert_eq!(value["zone"], json!(3));
    assert_eq!(value["houseNumber"], json!(21));
    assert_eq!(value["houseOwnership"], json!("OWNED"));
}

#[test]
fn family_with_zone_out_of_range_does_not_deserialize() {
    let payload = json!({
        "id": Uuid::new_v4().to_string(),
        "familyName": "Smith",
        "zone": 6,
        "houseNumber": 21,
        "houseOwnership": "RENTAL",
        "address": "Station Road"
    });
    assert!(serde_json::from_value::<Family>(payload).is_err());
}

#[test]
fn member_input_defaults_optional_fields_and_flags() {
    let input: MemberInput = serde_json::from_value(json!({
        "name": "Alice",
        "dateOfBirth": "2008-01-15",
        "relation": "DAUGHTER",
        "phoneNumber": "0711111111",
        "isStudent": true
    }))
    .unwrap();

    assert_eq!(input.date_of_birth, NaiveDate::from_ymd_opt(2008, 1, 15).unwrap());
    assert_eq!(input.relation, Relation::Daughter);
    assert!(input.is_student);
    assert!(!input.is_senior_citizen);
    assert_eq!(input.occupation, None);

    let member = Member::new(Uuid::new_v4(), &input).unwrap();
    assert!(member.has_flag(MemberFlag::Student));
    let value = serde_json::to_value(&member).unwrap();
    assert_eq!(value["familyId"], json!(member.family_id.to_string()));
    assert_eq!(value["dateOfBirth"], json!("2008-01-15"));
    assert_eq!(value["isStudent"], json!(true));
}

#[test]
fn request_serializes_status_and_null_completion() {
    let request = Request::new(Uuid::new_v4(), "need ramp access", 1_000).unwrap();
    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(value["status"], json!("PENDING"));
    assert_eq!(value["completedDate"], json!(null));
    assert_eq!(value["requestDate"], json!(1_000));
    assert_eq!(value["requestDescription"], json!("need ramp access"));
    assert_eq!(value["memberId"], json!(request.member_id.to_string()));

    let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(
        keys,
        [
            "completedDate",
            "id",
            "memberId",
            "notes",
            "requestDate",
            "requestDescription",
            "status"
        ]
    );

    let parsed: Request = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, request);

    let status: RequestStatus = serde_json::from_value(json!("IN_PROGRESS")).unwrap();
    assert_eq!(status, RequestStatus::InProgress);
}

#[test]
fn status_update_notes_are_optional() {
    let update: StatusUpdate = serde_json::from_value(json!({ "status": "COMPLETED" })).unwrap();
    assert_eq!(update.status, "COMPLETED");
    assert_eq!(update.notes, None);
}

#[test]
fn enumerated_text_accepts_loose_spellings_and_rejects_unknown_values() {
    let relation: Relation = serde_json::from_value(json!("Father")).unwrap();
    assert_eq!(relation, Relation::Father);
    let relation: Relation = serde_json::from_value(json!("son in law")).unwrap();
    assert_eq!(relation, Relation::SonInLaw);

    let ownership: HouseOwnership = serde_json::from_value(json!("owned")).unwrap();
    assert_eq!(ownership, HouseOwnership::Owned);

    let flag: MemberFlag = serde_json::from_value(json!("seniors")).unwrap();
    assert_eq!(flag, MemberFlag::SeniorCitizen);

    let status: RequestStatus = serde_json::from_value(json!("in progress")).unwrap();
    assert_eq!(status, RequestStatus::InProgress);

    assert!(serde_json::from_value::<Relation>(json!("Cousin")).is_err());
    assert!(serde_json::from_value::<HouseOwnership>(json!("LEASED")).is_err());

    assert_eq!(serde_json::to_value(Relation::SonInLaw).unwrap(), json!("SON_IN_LAW"));
}
