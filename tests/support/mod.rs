//! Shared fixtures: a seeded graph with the government root node and a
//! sitting president, built through the engine itself.

use orgchart_rs::batch::{AddRecord, TerminateRecord, TransactionId};
use orgchart_rs::engine::GOVERNMENT_NAME;
use orgchart_rs::model::RelationshipFilter;
use orgchart_rs::{
    Engine, EnginePolicy, EntityCounters, EntityId, EntityStore, InMemoryStore, MinorKind,
    RelationName, Relationship, Timestamp,
};

pub const PRESIDENT: &str = "Ranil Wickremesinghe";

#[allow(dead_code)]
pub fn day(raw: &str) -> Timestamp {
    Timestamp::from_day(raw).expect("valid date")
}

#[allow(dead_code)]
pub fn tx(raw: &str) -> TransactionId {
    TransactionId::parse(raw).expect("valid transaction id")
}

/// Engine over an in-memory store with the government node created and
/// Ranil Wickremesinghe appointed president on 2019-12-01.
#[allow(dead_code)]
pub fn seeded_engine() -> (Engine, EntityCounters) {
    seeded_engine_with_policy(EnginePolicy::default())
}

#[allow(dead_code)]
pub fn seeded_engine_with_policy(policy: EnginePolicy) -> (Engine, EntityCounters) {
    let mut engine = Engine::with_policy(Box::new(InMemoryStore::new()), policy);
    engine.create_government_node().expect("government node");

    let mut counters = EntityCounters::new();
    let appointment = AddRecord {
        id: tx("2152-12_tr_1"),
        parent: GOVERNMENT_NAME.to_string(),
        parent_kind: MinorKind::Government,
        child: PRESIDENT.to_string(),
        child_kind: MinorKind::Citizen,
        rel: RelationName::AsPresident,
        date: day("2019-12-01"),
        president: None,
    };
    engine
        .add_person(&appointment, &mut counters)
        .expect("president appointment");
    (engine, counters)
}

/// Appoint another citizen as president, alongside any sitting one.
#[allow(dead_code)]
pub fn appoint_president(
    engine: &mut Engine,
    counters: &mut EntityCounters,
    tx_id: &str,
    name: &str,
    date: &str,
) -> EntityId {
    engine
        .add_person(
            &AddRecord {
                id: tx(tx_id),
                parent: GOVERNMENT_NAME.to_string(),
                parent_kind: MinorKind::Government,
                child: name.to_string(),
                child_kind: MinorKind::Citizen,
                rel: RelationName::AsPresident,
                date: day(date),
                president: None,
            },
            counters,
        )
        .expect("president appointment")
}

#[allow(dead_code)]
pub fn add_minister(
    engine: &mut Engine,
    counters: &mut EntityCounters,
    tx_id: &str,
    name: &str,
    date: &str,
) -> EntityId {
    engine
        .add_org(
            &AddRecord {
                id: tx(tx_id),
                parent: PRESIDENT.to_string(),
                parent_kind: MinorKind::Citizen,
                child: name.to_string(),
                child_kind: MinorKind::Minister,
                rel: RelationName::AsMinister,
                date: day(date),
                president: None,
            },
            counters,
        )
        .expect("add minister")
}

#[allow(dead_code)]
pub fn add_department(
    engine: &mut Engine,
    counters: &mut EntityCounters,
    tx_id: &str,
    minister: &str,
    name: &str,
    date: &str,
) -> EntityId {
    engine
        .add_org(
            &AddRecord {
                id: tx(tx_id),
                parent: minister.to_string(),
                parent_kind: MinorKind::Minister,
                child: name.to_string(),
                child_kind: MinorKind::Department,
                rel: RelationName::AsDepartment,
                date: day(date),
                president: Some(PRESIDENT.to_string()),
            },
            counters,
        )
        .expect("add department")
}

#[allow(dead_code)]
pub fn terminate_record(
    tx_id: &str,
    parent: &str,
    parent_kind: MinorKind,
    child: &str,
    child_kind: MinorKind,
    rel: RelationName,
    date: &str,
) -> TerminateRecord {
    TerminateRecord {
        id: tx(tx_id),
        parent: parent.to_string(),
        parent_kind,
        child: child.to_string(),
        child_kind,
        rel,
        date: day(date),
        president: Some(PRESIDENT.to_string()),
    }
}

/// All `name` edges from `source`, active and terminated alike.
#[allow(dead_code)]
pub fn edges(engine: &Engine, source: &EntityId, name: RelationName) -> Vec<Relationship> {
    engine
        .store()
        .get_related_entities(source, &RelationshipFilter::named(name))
        .expect("relationship listing")
}

/// Only the currently-active `name` edges from `source`.
#[allow(dead_code)]
pub fn active_edges(engine: &Engine, source: &EntityId, name: RelationName) -> Vec<Relationship> {
    edges(engine, source, name)
        .into_iter()
        .filter(Relationship::is_active)
        .collect()
}
