//! Lifecycle tests for the organisation hierarchy: add, terminate, and
//! move, including the uniqueness and activity invariants the store itself
//! does not enforce.

use orgchart_rs::batch::MoveDepartmentRecord;
use orgchart_rs::batch::MoveMinisterRecord;
use orgchart_rs::model::EntityPatch;
use orgchart_rs::{
    EnginePolicy, EntityStore, Error, MinorKind, RelationName, Relationship, Resolver,
};

mod support;
use support::{
    active_edges, add_department, add_minister, appoint_president, day, edges, seeded_engine,
    seeded_engine_with_policy, terminate_record, tx, PRESIDENT,
};

#[test]
fn test_add_then_terminate_minister_leaves_single_terminated_edge() {
    let (mut engine, mut counters) = seeded_engine();
    let minister_id = add_minister(
        &mut engine,
        &mut counters,
        "2153-12_tr_1",
        "Minister of Defence",
        "2019-12-10",
    );

    let president_id = Resolver::new(engine.store())
        .resolve_president(PRESIDENT, day("2019-12-10"))
        .expect("president")
        .id;

    engine
        .terminate_org(&terminate_record(
            "2403-01_tr_1",
            PRESIDENT,
            MinorKind::Citizen,
            "Minister of Defence",
            MinorKind::Minister,
            RelationName::AsMinister,
            "2024-01-01",
        ))
        .expect("terminate minister");

    let minister_edges: Vec<Relationship> =
        edges(&engine, &president_id, RelationName::AsMinister)
            .into_iter()
            .filter(|edge| edge.related_entity_id == minister_id)
            .collect();
    assert_eq!(minister_edges.len(), 1);
    assert_eq!(
        minister_edges[0].end_time.map(|ts| ts.to_rfc3339()),
        Some("2024-01-01T00:00:00Z".to_string())
    );
    assert_eq!(
        minister_edges[0].start_time.to_rfc3339(),
        "2019-12-10T00:00:00Z"
    );
}

#[test]
fn test_department_name_is_globally_unique() {
    let (mut engine, mut counters) = seeded_engine();
    add_minister(
        &mut engine,
        &mut counters,
        "2153-12_tr_1",
        "Minister of Defence",
        "2019-12-10",
    );
    add_minister(
        &mut engine,
        &mut counters,
        "2153-12_tr_2",
        "Minister of Finance",
        "2019-12-10",
    );
    add_department(
        &mut engine,
        &mut counters,
        "2153-12_tr_3",
        "Minister of Defence",
        "Sri Lankan Army",
        "2019-12-10",
    );

    // same name under a different minister must be rejected
    let duplicate = engine.add_org(
        &orgchart_rs::batch::AddRecord {
            id: tx("2153-12_tr_4"),
            parent: "Minister of Finance".to_string(),
            parent_kind: MinorKind::Minister,
            child: "Sri Lankan Army".to_string(),
            child_kind: MinorKind::Department,
            rel: RelationName::AsDepartment,
            date: day("2020-01-01"),
            president: Some(PRESIDENT.to_string()),
        },
        &mut counters,
    );
    assert!(matches!(duplicate, Err(Error::Invariant(_))));
}

#[test]
fn test_terminate_without_active_relationship_fails() {
    let (mut engine, mut counters) = seeded_engine();
    add_minister(
        &mut engine,
        &mut counters,
        "2153-12_tr_1",
        "Minister of Defence",
        "2019-12-10",
    );

    let record = terminate_record(
        "2403-01_tr_1",
        PRESIDENT,
        MinorKind::Citizen,
        "Minister of Defence",
        MinorKind::Minister,
        RelationName::AsMinister,
        "2024-01-01",
    );
    engine.terminate_org(&record).expect("first termination");
    // the edge is gone from the active set; terminating again must fail and
    // the recorded end time must be untouched
    let second = engine.terminate_org(&terminate_record(
        "2403-01_tr_2",
        PRESIDENT,
        MinorKind::Citizen,
        "Minister of Defence",
        MinorKind::Minister,
        RelationName::AsMinister,
        "2025-06-01",
    ));
    assert!(second.is_err());

    let president_id = Resolver::new(engine.store())
        .resolve_president(PRESIDENT, day("2019-12-10"))
        .expect("president")
        .id;
    let minister_edges = edges(&engine, &president_id, RelationName::AsMinister);
    assert_eq!(
        minister_edges[0].end_time.map(|ts| ts.to_rfc3339()),
        Some("2024-01-01T00:00:00Z".to_string())
    );
}

#[test]
fn test_move_department_terminates_every_stale_active_edge() {
    let (mut engine, mut counters) = seeded_engine();
    let m1 = add_minister(
        &mut engine,
        &mut counters,
        "2153-12_tr_1",
        "Minister of Defence",
        "2019-12-10",
    );
    let m2 = add_minister(
        &mut engine,
        &mut counters,
        "2153-12_tr_2",
        "Minister of Finance",
        "2019-12-10",
    );
    let m3 = add_minister(
        &mut engine,
        &mut counters,
        "2153-12_tr_3",
        "Minister of Justice",
        "2019-12-10",
    );
    let department = add_department(
        &mut engine,
        &mut counters,
        "2153-12_tr_4",
        "Minister of Defence",
        "Sri Lankan Army",
        "2019-12-10",
    );

    // a stale second active assignment left behind by an earlier
    // inconsistent state, written directly against the store
    let stale = Relationship {
        id: format!("{}_{}_stale", m2, department),
        name: RelationName::AsDepartment,
        related_entity_id: department.clone(),
        start_time: day("2020-01-01"),
        end_time: None,
    };
    engine
        .store_mut()
        .update_entity(&m2, EntityPatch::create_relationship(stale))
        .expect("stale edge");

    engine
        .move_department(&MoveDepartmentRecord {
            id: tx("2403-05_tr_1"),
            department: "Sri Lankan Army".to_string(),
            old_minister: "Minister of Defence".to_string(),
            new_minister: "Minister of Justice".to_string(),
            old_president: Some(PRESIDENT.to_string()),
            new_president: PRESIDENT.to_string(),
            date: day("2021-06-01"),
        })
        .expect("move department");

    assert!(active_edges(&engine, &m1, RelationName::AsDepartment).is_empty());
    assert!(active_edges(&engine, &m2, RelationName::AsDepartment).is_empty());
    let new_assignment = active_edges(&engine, &m3, RelationName::AsDepartment);
    assert_eq!(new_assignment.len(), 1);
    assert_eq!(new_assignment[0].related_entity_id, department);
    assert_eq!(
        new_assignment[0].start_time.to_rfc3339(),
        "2021-06-01T00:00:00Z"
    );
}

#[test]
fn test_strict_policy_refuses_terminating_minister_with_departments() {
    let (mut engine, mut counters) = seeded_engine_with_policy(EnginePolicy {
        forbid_minister_termination_with_departments: true,
    });
    add_minister(
        &mut engine,
        &mut counters,
        "2153-12_tr_1",
        "Minister of Defence",
        "2019-12-10",
    );
    add_department(
        &mut engine,
        &mut counters,
        "2153-12_tr_2",
        "Minister of Defence",
        "Sri Lankan Army",
        "2019-12-10",
    );

    let result = engine.terminate_org(&terminate_record(
        "2403-01_tr_1",
        PRESIDENT,
        MinorKind::Citizen,
        "Minister of Defence",
        MinorKind::Minister,
        RelationName::AsMinister,
        "2024-01-01",
    ));
    assert!(matches!(result, Err(Error::Invariant(_))));
}

#[test]
fn test_relaxed_policy_allows_terminating_minister_with_departments() {
    let (mut engine, mut counters) = seeded_engine();
    add_minister(
        &mut engine,
        &mut counters,
        "2153-12_tr_1",
        "Minister of Defence",
        "2019-12-10",
    );
    add_department(
        &mut engine,
        &mut counters,
        "2153-12_tr_2",
        "Minister of Defence",
        "Sri Lankan Army",
        "2019-12-10",
    );

    engine
        .terminate_org(&terminate_record(
            "2403-01_tr_1",
            PRESIDENT,
            MinorKind::Citizen,
            "Minister of Defence",
            MinorKind::Minister,
            RelationName::AsMinister,
            "2024-01-01",
        ))
        .expect("relaxed termination");
}

#[test]
fn test_move_minister_between_presidents() {
    let (mut engine, mut counters) = seeded_engine();
    let minister = add_minister(
        &mut engine,
        &mut counters,
        "2153-12_tr_1",
        "Minister of Defence",
        "2019-12-10",
    );
    let new_president = appoint_president(
        &mut engine,
        &mut counters,
        "2403-10_tr_1",
        "Anura Kumara Dissanayake",
        "2024-09-23",
    );

    engine
        .move_minister(&MoveMinisterRecord {
            id: tx("2403-10_tr_2"),
            minister: "Minister of Defence".to_string(),
            old_president: PRESIDENT.to_string(),
            new_president: "Anura Kumara Dissanayake".to_string(),
            date: day("2024-09-25"),
        })
        .expect("move minister");

    let old_president = Resolver::new(engine.store())
        .resolve_president(PRESIDENT, day("2024-09-25"))
        .expect("old president")
        .id;
    let old_edges: Vec<Relationship> = edges(&engine, &old_president, RelationName::AsMinister)
        .into_iter()
        .filter(|edge| edge.related_entity_id == minister)
        .collect();
    assert!(old_edges.iter().all(|edge| !edge.is_active()));

    let new_edges = active_edges(&engine, &new_president, RelationName::AsMinister);
    assert_eq!(new_edges.len(), 1);
    assert_eq!(new_edges[0].related_entity_id, minister);
}
