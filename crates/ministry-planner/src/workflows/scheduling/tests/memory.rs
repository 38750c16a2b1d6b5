use std::fs;

use super::common::*;
use crate::workflows::scheduling::domain::{
    Assignment, AssignmentId, PersonId, WeekPlanId, WeekPlanStatus,
};
use crate::workflows::scheduling::memory::{InMemoryPlanStore, PlanSnapshot, SnapshotError};
use crate::workflows::scheduling::repository::{
    AssignmentStore, EligibilityStore, RepositoryError, SettingsStore, WeekPlanFilter,
    WeekPlanStore,
};
use crate::workflows::scheduling::settings::AssignmentSettings;

fn assignment(id: &str, part: &str, person: PersonId, slot: u8) -> Assignment {
    Assignment {
        id: AssignmentId::new(id),
        weekly_part_id: part_id("w1", part),
        person_id: person,
        slot,
    }
}

#[test]
fn save_rejects_taken_slots_people_and_ids() {
    let store = seeded_store();
    store
        .save(assignment("a-1", "demo", bianca(), 1))
        .expect("first save");

    assert_eq!(
        store.save(assignment("a-2", "demo", diana(), 1)),
        Err(RepositoryError::Conflict)
    );
    assert_eq!(
        store.save(assignment("a-3", "demo", bianca(), 2)),
        Err(RepositoryError::Conflict)
    );
    assert_eq!(
        store.save(assignment("a-1", "reading", aldo(), 1)),
        Err(RepositoryError::Conflict)
    );
    store
        .save(assignment("a-4", "demo", carlo(), 2))
        .expect("free slot");
}

#[test]
fn list_by_week_follows_part_order_then_slot() {
    let store = seeded_store();
    seed_assignment(&store, "a-1", part_id("w1", "demo"), carlo(), 2);
    seed_assignment(&store, "a-2", part_id("w1", "demo"), bianca(), 1);
    seed_assignment(&store, "a-3", part_id("w1", "reading"), aldo(), 1);

    let order: Vec<(String, u8)> = assignments_in(&store, "w1")
        .into_iter()
        .map(|row| (row.assignment.weekly_part_id.0, row.assignment.slot))
        .collect();
    assert_eq!(
        order,
        vec![
            ("w1-reading".to_string(), 1),
            ("w1-demo".to_string(), 1),
            ("w1-demo".to_string(), 2),
        ]
    );

    assert_eq!(
        store.list_by_week(&WeekPlanId::new("missing")),
        Err(RepositoryError::NotFound)
    );
}

#[test]
fn history_is_strictly_before_the_given_date() {
    let store = seeded_store();
    seed_assignment(&store, "a-0", part_id("w0", "reading"), aldo(), 1);
    seed_assignment(&store, "a-1", part_id("w1", "demo"), bianca(), 1);

    let history = store.history_before(week_one()).expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].person_id, aldo());
    assert_eq!(history[0].role_type_id, reading().id);
    assert_eq!(history[0].week_start, date(2024, 12, 30));

    assert_eq!(store.history_before(week_two()).expect("history").len(), 2);
}

#[test]
fn week_listing_filters_by_status_and_bounds() {
    let store = seeded_store();

    let active_from_w1 = store
        .list_by_program(
            &program(),
            WeekPlanFilter {
                status: Some(WeekPlanStatus::Active),
                from: Some(week_one()),
                to: None,
            },
        )
        .expect("list");
    let ids: Vec<&str> = active_from_w1.iter().map(|week| week.id.as_str()).collect();
    assert_eq!(ids, vec!["w1", "w2"]);

    let everything = store
        .list_by_program(&program(), WeekPlanFilter::default())
        .expect("list");
    assert_eq!(everything.len(), 4);

    let in_range = store
        .list_in_range(week_one(), date(2025, 1, 20))
        .expect("range");
    assert_eq!(in_range.len(), 3);

    assert_eq!(
        store.insert_week(week_plan("w1", date(2025, 3, 3), WeekPlanStatus::Active)),
        Err(RepositoryError::Conflict)
    );
}

#[test]
fn lead_flags_and_commitments() {
    let store = seeded_store();
    assert!(store.can_lead(&aldo(), &reading().id).expect("query"));
    assert!(!store.can_lead(&aldo(), &demo().id).expect("query"));

    store
        .set_can_lead(&aldo(), &reading().id, false)
        .expect("revoke");
    assert!(!store.can_lead(&aldo(), &reading().id).expect("query"));

    seed_assignment(&store, "a-0", part_id("w0", "demo"), bianca(), 1);
    seed_assignment(&store, "a-1", part_id("w2", "demo"), bianca(), 1);
    let commitments = store
        .future_commitments(&bianca(), week_one())
        .expect("commitments");
    assert_eq!(commitments.len(), 1);
    assert_eq!(commitments[0].week_start, week_two());
    assert_eq!(commitments[0].part_label, "Starting a Conversation");
}

#[test]
fn settings_are_stored_normalized() {
    let store = seeded_store();
    assert_eq!(
        store.load_settings().expect("load"),
        AssignmentSettings::default()
    );

    let saved = store
        .save_settings(AssignmentSettings {
            lead_weight: 0,
            lead_cooldown_weeks: -2,
            ..AssignmentSettings::default()
        })
        .expect("save");
    assert_eq!(saved.lead_weight, 1);
    assert_eq!(saved.lead_cooldown_weeks, 0);
    assert_eq!(store.load_settings().expect("load"), saved);
}

#[test]
fn snapshot_survives_a_json_round_trip_through_disk() {
    let store = seeded_store();
    seed_assignment(&store, "a-1", part_id("w1", "reading"), aldo(), 1);

    let path = std::env::temp_dir().join(format!(
        "ministry-planner-snapshot-{}.json",
        std::process::id()
    ));
    store.save_json(&path).expect("save snapshot");
    let reloaded = InMemoryPlanStore::load_json(&path).expect("load snapshot");
    fs::remove_file(&path).ok();

    assert_eq!(
        reloaded.snapshot().expect("snapshot"),
        store.snapshot().expect("snapshot")
    );
}

#[test]
fn loading_normalizes_settings_and_reports_bad_files() {
    let json = r#"{ "settings": { "assist_weight": -4 } }"#;
    let snapshot: PlanSnapshot = serde_json::from_str(json).expect("parse");
    let store = InMemoryPlanStore::from_snapshot(snapshot);
    assert_eq!(store.load_settings().expect("load").assist_weight, 1);

    let missing = std::env::temp_dir().join("ministry-planner-does-not-exist.json");
    assert!(matches!(
        InMemoryPlanStore::load_json(&missing),
        Err(SnapshotError::Io(_))
    ));
}
