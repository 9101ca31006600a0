//! Integration tests for the work order repository.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use workorders::clock::FixedClock;
use workorders::model::{Tier, WorkItemId, parse_id, parse_reference};
use workorders::{Error, Repository};

const MANAGEMENT_ID: &str = "15";
const OLDER_MANAGEMENT_ID: &str = "60";
const ANCIENT_MANAGEMENT_ID: &str = "120";
const VIP_ID: &str = "5";
const PRIORITY_ID: &str = "3";
const OLD_PRIORITY_ID: &str = "6";
const NORMAL_ID: &str = "7";
const OLD_NORMAL_ID: &str = "43";

const ENTRY_TIME: &str = "2018-11-25T23:45:43Z";
const OLDER_ENTRY_TIME: &str = "2018-11-25T23:45:42Z";
const ANCIENT_ENTRY_TIME: &str = "2016-11-25T23:45:42Z";

/// Shortly after `ENTRY_TIME`, so ancient entries dwarf recent ones.
fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2018, 11, 26, 0, 0, 0).unwrap()
}

fn test_repository() -> Repository {
    Repository::with_clock(Arc::new(FixedClock::new(reference_now())))
}

fn id(raw: &str) -> WorkItemId {
    parse_id(raw).unwrap()
}

fn ids(raw: &[&str]) -> Vec<WorkItemId> {
    raw.iter().map(|r| id(r)).collect()
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[test]
fn vip_ranks_above_priority_at_same_arrival() {
    let repository = Repository::new();
    repository.add(PRIORITY_ID, ENTRY_TIME).unwrap();
    repository.add(VIP_ID, ENTRY_TIME).unwrap();

    assert_eq!(repository.list_ids(), ids(&[VIP_ID, PRIORITY_ID]));
}

#[test]
fn pop_next_drains_in_rank_order() {
    let repository = Repository::new();
    repository.add(PRIORITY_ID, ENTRY_TIME).unwrap();
    repository.add(VIP_ID, ENTRY_TIME).unwrap();
    repository.add(MANAGEMENT_ID, ENTRY_TIME).unwrap();
    repository.add(NORMAL_ID, ENTRY_TIME).unwrap();

    let mut expected = vec![MANAGEMENT_ID, VIP_ID, PRIORITY_ID, NORMAL_ID];
    assert_eq!(repository.list_ids(), ids(&expected));

    while !expected.is_empty() {
        let next = repository.pop_next().expect("queue should not be empty");
        assert_eq!(next.id(), id(expected.remove(0)));
        assert_eq!(repository.list_ids(), ids(&expected));
    }

    assert!(repository.pop_next().is_none());
    assert!(repository.list_ids().is_empty());
}

#[test]
fn management_overrides_order_by_wait() {
    let repository = test_repository();
    repository.add(PRIORITY_ID, ENTRY_TIME).unwrap();
    repository.add(MANAGEMENT_ID, ENTRY_TIME).unwrap();
    repository.add(VIP_ID, ENTRY_TIME).unwrap();
    repository.add(OLDER_MANAGEMENT_ID, OLDER_ENTRY_TIME).unwrap();
    repository.add(NORMAL_ID, ENTRY_TIME).unwrap();
    repository.add(ANCIENT_MANAGEMENT_ID, ANCIENT_ENTRY_TIME).unwrap();

    assert_eq!(
        repository.list_ids(),
        ids(&[
            ANCIENT_MANAGEMENT_ID,
            OLDER_MANAGEMENT_ID,
            MANAGEMENT_ID,
            VIP_ID,
            PRIORITY_ID,
            NORMAL_ID,
        ])
    );
}

#[test]
fn long_waiting_priority_overtakes_recent_vip() {
    let repository = test_repository();
    repository.add(MANAGEMENT_ID, ENTRY_TIME).unwrap();
    repository.add(OLDER_MANAGEMENT_ID, OLDER_ENTRY_TIME).unwrap();
    repository.add(ANCIENT_MANAGEMENT_ID, ANCIENT_ENTRY_TIME).unwrap();
    repository.add(VIP_ID, ENTRY_TIME).unwrap();
    repository.add(PRIORITY_ID, ENTRY_TIME).unwrap();
    repository.add(OLD_PRIORITY_ID, ANCIENT_ENTRY_TIME).unwrap();
    repository.add(NORMAL_ID, ENTRY_TIME).unwrap();

    assert_eq!(
        repository.list_ids(),
        ids(&[
            ANCIENT_MANAGEMENT_ID,
            OLDER_MANAGEMENT_ID,
            MANAGEMENT_ID,
            OLD_PRIORITY_ID,
            VIP_ID,
            PRIORITY_ID,
            NORMAL_ID,
        ])
    );
}

#[test]
fn long_waiting_normal_overtakes_recent_vip() {
    let repository = test_repository();
    repository.add(MANAGEMENT_ID, ENTRY_TIME).unwrap();
    repository.add(OLDER_MANAGEMENT_ID, OLDER_ENTRY_TIME).unwrap();
    repository.add(ANCIENT_MANAGEMENT_ID, ANCIENT_ENTRY_TIME).unwrap();
    repository.add(VIP_ID, ENTRY_TIME).unwrap();
    repository.add(OLD_NORMAL_ID, ANCIENT_ENTRY_TIME).unwrap();
    repository.add(PRIORITY_ID, ENTRY_TIME).unwrap();
    repository.add(OLD_PRIORITY_ID, ANCIENT_ENTRY_TIME).unwrap();
    repository.add(NORMAL_ID, ENTRY_TIME).unwrap();

    assert_eq!(
        repository.list_ids(),
        ids(&[
            ANCIENT_MANAGEMENT_ID,
            OLDER_MANAGEMENT_ID,
            MANAGEMENT_ID,
            OLD_PRIORITY_ID,
            OLD_NORMAL_ID,
            VIP_ID,
            PRIORITY_ID,
            NORMAL_ID,
        ])
    );
}

#[test]
fn rank_drifts_as_the_clock_advances() {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2018, 11, 25, 23, 45, 45).unwrap(),
    ));
    let repository = Repository::with_clock(clock.clone());
    // Normal arrived 43 seconds before the VIP.
    repository.add(NORMAL_ID, "2018-11-25T23:45:00Z").unwrap();
    repository.add(VIP_ID, "2018-11-25T23:45:43Z").unwrap();

    // Normal has waited 45s against a VIP still on its floor.
    assert_eq!(repository.list_ids(), ids(&[NORMAL_ID, VIP_ID]));

    // An hour later the VIP's 2·w·ln(w) has far outgrown the normal's w.
    clock.advance(chrono::Duration::hours(1));
    assert_eq!(repository.list_ids(), ids(&[VIP_ID, NORMAL_ID]));
}

// ---------------------------------------------------------------------------
// Add / delete / position
// ---------------------------------------------------------------------------

#[test]
fn duplicate_id_is_rejected_and_store_unchanged() {
    let repository = test_repository();
    repository.add(PRIORITY_ID, ENTRY_TIME).unwrap();
    repository.add(MANAGEMENT_ID, ENTRY_TIME).unwrap();
    repository.add(VIP_ID, ENTRY_TIME).unwrap();
    let before = repository.list_ids();

    let err = repository.add(PRIORITY_ID, OLDER_ENTRY_TIME).unwrap_err();
    assert!(matches!(err, Error::DuplicateIdentity(dup) if dup == id(PRIORITY_ID)));

    assert_eq!(repository.list_ids(), before);
    let kept = repository.get(id(PRIORITY_ID)).unwrap();
    assert_eq!(kept.arrival().to_string(), ENTRY_TIME);
}

#[test]
fn invalid_input_is_rejected_without_mutation() {
    let repository = test_repository();

    assert!(matches!(
        repository.add("0", ENTRY_TIME),
        Err(Error::InvalidIdentity(_))
    ));
    assert!(matches!(
        repository.add("-3", ENTRY_TIME),
        Err(Error::InvalidIdentity(_))
    ));
    assert!(matches!(
        repository.add(PRIORITY_ID, "2017-02-29T15:36:22Z"),
        Err(Error::InvalidTimestamp { .. })
    ));
    // One second after the repository clock.
    assert!(matches!(
        repository.add(PRIORITY_ID, "2018-11-26T00:00:01Z"),
        Err(Error::InvalidTimestamp { .. })
    ));
    assert!(repository.is_empty());
}

#[test]
fn add_returns_classified_item() {
    let repository = test_repository();
    let item = repository.add(MANAGEMENT_ID, ENTRY_TIME).unwrap();
    assert_eq!(item.tier(), Tier::ManagementOverride);
    assert_eq!(repository.get(item.id()).unwrap(), item);
    assert_eq!(repository.len(), 1);
}

#[test]
fn delete_removes_and_returns_item() {
    let repository = test_repository();
    repository.add(PRIORITY_ID, ENTRY_TIME).unwrap();
    repository.add(MANAGEMENT_ID, ENTRY_TIME).unwrap();
    repository.add(VIP_ID, ENTRY_TIME).unwrap();

    let deleted = repository.delete(id(MANAGEMENT_ID)).unwrap();
    assert_eq!(deleted.id(), id(MANAGEMENT_ID));
    assert_eq!(repository.list_ids(), ids(&[VIP_ID, PRIORITY_ID]));

    assert!(repository.delete(id(MANAGEMENT_ID)).is_none());
    assert_eq!(repository.len(), 2);
}

#[test]
fn position_of_follows_rank_order() {
    let repository = test_repository();
    repository.add(PRIORITY_ID, ENTRY_TIME).unwrap();
    repository.add(MANAGEMENT_ID, ENTRY_TIME).unwrap();
    repository.add(VIP_ID, ENTRY_TIME).unwrap();

    assert_eq!(repository.position_of(id(MANAGEMENT_ID)), Some(0));
    assert_eq!(repository.position_of(id(VIP_ID)), Some(1));
    assert_eq!(repository.position_of(id(PRIORITY_ID)), Some(2));
    assert_eq!(repository.position_of(id(NORMAL_ID)), None);

    repository.delete(id(MANAGEMENT_ID));
    assert_eq!(repository.list_ids(), ids(&[VIP_ID, PRIORITY_ID]));
    assert_eq!(repository.position_of(id(VIP_ID)), Some(0));
}

// ---------------------------------------------------------------------------
// Mean wait time
// ---------------------------------------------------------------------------

#[test]
fn mean_wait_time_over_qualifying_items() {
    let repository = Repository::new();
    repository.add(PRIORITY_ID, ENTRY_TIME).unwrap();
    repository.add(VIP_ID, ENTRY_TIME).unwrap();
    repository.add(MANAGEMENT_ID, ENTRY_TIME).unwrap();
    repository.add(NORMAL_ID, ENTRY_TIME).unwrap();

    assert_eq!(repository.mean_wait_time("2018-11-25T23:46:43Z").unwrap(), 60.0);
    // Every arrival is after this reference.
    assert_eq!(repository.mean_wait_time("2018-11-25T23:43:43Z").unwrap(), 0.0);
}

#[test]
fn mean_wait_time_excludes_later_arrivals() {
    let repository = test_repository();
    repository.add(NORMAL_ID, "2018-11-25T23:40:00Z").unwrap();
    repository.add(PRIORITY_ID, "2018-11-25T23:44:00Z").unwrap();
    repository.add(VIP_ID, "2018-11-25T23:50:00Z").unwrap();

    // Waits 300 and 60; the VIP arrived after the reference and is ignored.
    assert_eq!(repository.mean_wait_time("2018-11-25T23:45:00Z").unwrap(), 180.0);
    // Arrival exactly at the reference counts as a zero wait.
    assert_eq!(repository.mean_wait_time("2018-11-25T23:40:00Z").unwrap(), 0.0);
    let reference = parse_reference("2018-11-25T23:44:00Z").unwrap();
    assert_eq!(repository.mean_wait_time_at(reference), 120.0);
}

#[test]
fn mean_wait_time_edge_cases() {
    let repository = test_repository();
    assert_eq!(repository.mean_wait_time(ENTRY_TIME).unwrap(), 0.0);
    assert!(matches!(
        repository.mean_wait_time("yesterday"),
        Err(Error::InvalidTimestamp { .. })
    ));

    repository.add(NORMAL_ID, ENTRY_TIME).unwrap();
    // References ahead of the clock are allowed.
    assert_eq!(repository.mean_wait_time("2018-11-26T00:00:43Z").unwrap(), 900.0);
}
