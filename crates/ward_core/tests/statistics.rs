use chrono::NaiveDate;
use rusqlite::Connection;
use ward_core::db::open_db_in_memory;
use ward_core::{
    FamilyInput, FamilyService, HouseOwnership, MemberInput, Relation, RequestService,
    RequestStatus, RequestSummary, SqliteFamilyRepository, SqliteRequestRepository,
    StatisticsService, WardStatistics,
};

fn statistics(
    conn: &Connection,
) -> StatisticsService<SqliteFamilyRepository<'_>, SqliteRequestRepository<'_>> {
    StatisticsService::new(
        SqliteFamilyRepository::try_new(conn).unwrap(),
        SqliteRequestRepository::try_new(conn).unwrap(),
    )
}

fn smith_family() -> FamilyInput {
    FamilyInput {
        family_name: "Smith".to_string(),
        zone: 3,
        house_number: 21,
        house_ownership: HouseOwnership::Owned,
        address: "Station Road".to_string(),
    }
}

fn dob(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 15).unwrap()
}

#[test]
fn empty_registry_reports_zeroes() {
    let conn = open_db_in_memory().unwrap();
    let service = statistics(&conn);

    assert_eq!(service.statistics().unwrap(), WardStatistics::default());
    assert_eq!(service.request_summary().unwrap(), RequestSummary::default());
    assert_eq!(service.pensioners().unwrap(), 0);
}

#[test]
fn smith_household_scenario() {
    let conn = open_db_in_memory().unwrap();
    let families = FamilyService::new(SqliteFamilyRepository::try_new(&conn).unwrap());

    let smith = families.create_family(&smith_family()).unwrap();
    let mut alice = MemberInput::new("Alice", dob(2008), Relation::Daughter, "0711111111");
    alice.is_student = true;
    families.add_member(smith.uuid, &alice).unwrap();
    let mut bob = MemberInput::new("Bob", dob(1950), Relation::Grandfather, "0722222222");
    bob.is_senior_citizen = true;
    families.add_member(smith.uuid, &bob).unwrap();

    let stats = statistics(&conn).statistics().unwrap();
    assert_eq!(
        stats,
        WardStatistics {
            total_families: 1,
            total_members: 2,
            disabled_members: 0,
            senior_citizens: 1,
            students: 1,
        }
    );
}

#[test]
fn one_member_counts_toward_every_flag_it_carries() {
    let conn = open_db_in_memory().unwrap();
    let families = FamilyService::new(SqliteFamilyRepository::try_new(&conn).unwrap());
    let smith = families.create_family(&smith_family()).unwrap();

    let mut grace = MemberInput::new("Grace", dob(1940), Relation::Grandmother, "0733333333");
    grace.is_senior_citizen = true;
    grace.is_disabled = true;
    grace.is_pensioner = true;
    families.add_member(smith.uuid, &grace).unwrap();

    let service = statistics(&conn);
    let stats = service.statistics().unwrap();
    assert_eq!(stats.total_members, 1);
    assert_eq!(stats.senior_citizens, 1);
    assert_eq!(stats.disabled_members, 1);
    assert_eq!(stats.students, 0);
    assert_eq!(service.pensioners().unwrap(), 1);
}

#[test]
fn statistics_follow_family_deletion() {
    let conn = open_db_in_memory().unwrap();
    let families = FamilyService::new(SqliteFamilyRepository::try_new(&conn).unwrap());
    let smith = families.create_family(&smith_family()).unwrap();
    let mut alice = MemberInput::new("Alice", dob(2008), Relation::Daughter, "0711111111");
    alice.is_student = true;
    families.add_member(smith.uuid, &alice).unwrap();

    families.delete_family(smith.uuid).unwrap();

    assert_eq!(
        statistics(&conn).statistics().unwrap(),
        WardStatistics::default()
    );
}

#[test]
fn request_summary_counts_each_status() {
    let conn = open_db_in_memory().unwrap();
    let families = FamilyService::new(SqliteFamilyRepository::try_new(&conn).unwrap());
    let smith = families.create_family(&smith_family()).unwrap();
    let alice = families
        .add_member(
            smith.uuid,
            &MemberInput::new("Alice", dob(2008), Relation::Daughter, "0711111111"),
        )
        .unwrap();

    let requests = RequestService::new(SqliteRequestRepository::try_new(&conn).unwrap());
    requests.create_request(alice.uuid, "need ramp access").unwrap();
    let roof = requests.create_request(alice.uuid, "fix roof").unwrap();
    let water = requests.create_request(alice.uuid, "water supply").unwrap();
    requests
        .transition(roof.uuid, RequestStatus::Completed, None)
        .unwrap();
    requests
        .transition(water.uuid, RequestStatus::Rejected, None)
        .unwrap();

    let summary = statistics(&conn).request_summary().unwrap();
    assert_eq!(
        summary,
        RequestSummary {
            pending: 1,
            in_progress: 0,
            completed: 1,
            rejected: 1,
        }
    );
    assert_eq!(summary.total(), 3);
}
