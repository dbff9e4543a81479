//! # Entity Resolver
//!
//! Turns a (kind, name, scope) tuple into exactly one entity. Names are
//! unique only within a scope: a minister title is meaningful relative to a
//! sitting president, and a department name is expected to be globally
//! unique by convention but is validated rather than assumed. Presidency is
//! a role — a citizen holding an active `AS_PRESIDENT` edge from the
//! government node — not an intrinsic entity kind.

use crate::error::{Error, Result};
use crate::model::{
    EntityId, EntitySummary, KindFilter, MajorKind, MinorKind, RelationName, Relationship,
    RelationshipFilter, SearchCriteria,
};
use crate::store::EntityStore;
use crate::temporal::Timestamp;

/// Which temporal predicate a scoped lookup applies to candidate edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Activity {
    /// Edge active at the reference date (`start <= d`, `end` unset or `> d`).
    AsOf(Timestamp),
    /// Edge currently open: `end` unset, regardless of the reference date.
    Current,
}

/// Read-side name resolution over the store contract.
pub struct Resolver<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    /// Exactly-one lookup by kind filter and name.
    pub fn resolve(&self, kind: KindFilter, name: &str) -> Result<EntitySummary> {
        let what = kind
            .minor
            .as_ref()
            .map(|minor| minor.to_string())
            .unwrap_or_else(|| kind.major.to_string());
        let mut matches = self
            .store
            .search_entities(&SearchCriteria::by_kind_and_name(kind, name))?;
        match matches.len() {
            0 => Err(Error::not_found(what, name)),
            1 => Ok(matches.remove(0)),
            count => Err(Error::ambiguous(what, name, count)),
        }
    }

    /// The government root node; expected to exist exactly once.
    pub fn resolve_government(&self) -> Result<EntitySummary> {
        let mut matches = self.store.search_entities(&SearchCriteria::by_kind(
            KindFilter::exact(MajorKind::Organisation, MinorKind::Government),
        ))?;
        match matches.len() {
            0 => Err(Error::not_found("government", "government root node")),
            1 => Ok(matches.remove(0)),
            count => Err(Error::ambiguous("government", "government root node", count)),
        }
    }

    /// A citizen holding the presidency at `as_of`: resolved through the
    /// government node's `AS_PRESIDENT` edges, then matched by name.
    pub fn resolve_president(&self, name: &str, as_of: Timestamp) -> Result<EntitySummary> {
        let government = self.resolve_government()?;
        let edges = self.store.get_related_entities(
            &government.id,
            &RelationshipFilter::named(RelationName::AsPresident).active_at(as_of),
        )?;

        let mut matches = Vec::new();
        for edge in &edges {
            if let Some(summary) = self.summary_of(&edge.related_entity_id)? {
                if summary.name == name && summary.kind.major == MajorKind::Person {
                    matches.push(summary);
                }
            }
        }
        match matches.len() {
            0 => Err(Error::not_found("president", name)),
            1 => Ok(matches.remove(0)),
            count => Err(Error::ambiguous("president", name, count)),
        }
    }

    /// A minister held by `president` whose title matches, following the
    /// president's `AS_MINISTER` edges active at `as_of`.
    pub fn resolve_minister(
        &self,
        president: &str,
        name: &str,
        as_of: Timestamp,
    ) -> Result<EntitySummary> {
        self.minister_by_edges(president, name, as_of, Activity::AsOf(as_of))
    }

    /// Like [`Self::resolve_minister`], but the edge itself must still be
    /// open (no end time). Two simultaneous active matches is a modeled
    /// error.
    pub fn resolve_active_minister(
        &self,
        president: &str,
        name: &str,
        as_of: Timestamp,
    ) -> Result<EntitySummary> {
        self.minister_by_edges(president, name, as_of, Activity::Current)
    }

    fn minister_by_edges(
        &self,
        president: &str,
        name: &str,
        as_of: Timestamp,
        activity: Activity,
    ) -> Result<EntitySummary> {
        let president = self.resolve_president(president, as_of)?;
        let filter = match activity {
            Activity::AsOf(at) => {
                RelationshipFilter::named(RelationName::AsMinister).active_at(at)
            }
            Activity::Current => RelationshipFilter::named(RelationName::AsMinister),
        };
        let edges = self.store.get_related_entities(&president.id, &filter)?;

        let mut matches = Vec::new();
        for edge in &edges {
            if activity == Activity::Current && !edge.is_active() {
                continue;
            }
            if let Some(summary) = self.summary_of(&edge.related_entity_id)? {
                if summary.kind.minor == MinorKind::Minister && summary.name == name {
                    matches.push(summary);
                }
            }
        }
        match matches.len() {
            0 => Err(Error::not_found(
                "minister",
                format!("{} under president {}", name, president.name),
            )),
            1 => Ok(matches.remove(0)),
            _ => Err(Error::multiple_active("minister", name)),
        }
    }

    /// A department currently assigned to `minister_id`, matched by name
    /// across the minister's open `AS_DEPARTMENT` edges.
    pub fn department_under_minister(
        &self,
        minister_id: &EntityId,
        name: &str,
    ) -> Result<EntitySummary> {
        let edges = self.store.get_related_entities(
            minister_id,
            &RelationshipFilter::named(RelationName::AsDepartment),
        )?;

        let mut matches = Vec::new();
        for edge in edges.iter().filter(|edge| edge.is_active()) {
            if let Some(summary) = self.summary_of(&edge.related_entity_id)? {
                if summary.name == name {
                    matches.push(summary);
                }
            }
        }
        match matches.len() {
            0 => Err(Error::not_found(
                "department",
                format!("{} under minister {}", name, minister_id),
            )),
            1 => Ok(matches.remove(0)),
            _ => Err(Error::multiple_active("department", name)),
        }
    }

    /// Every minister currently holding an active `AS_DEPARTMENT` edge to
    /// the department, with the edge itself. Prior inconsistent states can
    /// leave more than one, and move must terminate them all.
    pub fn active_department_holders(
        &self,
        department_id: &EntityId,
    ) -> Result<Vec<(EntityId, Relationship)>> {
        let ministers = self.store.search_entities(&SearchCriteria::by_kind(
            KindFilter::exact(MajorKind::Organisation, MinorKind::Minister),
        ))?;

        let mut holders = Vec::new();
        for minister in &ministers {
            let edges = self.store.get_related_entities(
                &minister.id,
                &RelationshipFilter::named(RelationName::AsDepartment)
                    .related_to(department_id.clone()),
            )?;
            for edge in edges.into_iter().filter(|edge| edge.is_active()) {
                holders.push((minister.id.clone(), edge));
            }
        }
        Ok(holders)
    }

    /// Global person lookup by name alone, across every person minor kind.
    /// The one place a cross-type name lookup is used: person deduplication.
    pub fn find_person(&self, name: &str) -> Result<Option<EntitySummary>> {
        let mut matches = self.store.search_entities(&SearchCriteria::by_kind_and_name(
            KindFilter::major(MajorKind::Person),
            name,
        ))?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(matches.remove(0))),
            count => Err(Error::ambiguous("person", name, count)),
        }
    }

    /// Document lookup by kind and name for deduplication: `None` when the
    /// document does not exist yet.
    pub fn find_document(&self, kind: KindFilter, name: &str) -> Result<Option<EntitySummary>> {
        let mut matches = self
            .store
            .search_entities(&SearchCriteria::by_kind_and_name(kind, name))?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(matches.remove(0))),
            count => Err(Error::ambiguous("document", name, count)),
        }
    }

    /// Exactly-one document lookup by name, used when linking documents.
    pub fn resolve_document(&self, name: &str) -> Result<EntitySummary> {
        self.find_document(KindFilter::major(MajorKind::Document), name)?
            .ok_or_else(|| Error::not_found("document", name))
    }

    /// Fetch a summary by id, tolerating dangling references: `None` when
    /// the edge target no longer resolves.
    fn summary_of(&self, id: &EntityId) -> Result<Option<EntitySummary>> {
        let mut matches = self
            .store
            .search_entities(&SearchCriteria::by_id(id.clone()))?;
        if matches.is_empty() {
            Ok(None)
        } else {
            Ok(Some(matches.remove(0)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, EntityPatch, Kind, TimeBasedName};
    use crate::store::InMemoryStore;

    fn day(raw: &str) -> Timestamp {
        Timestamp::from_day(raw).unwrap()
    }

    fn entity(id: &str, major: MajorKind, minor: MinorKind, name: &str, created: &str) -> Entity {
        Entity {
            id: EntityId::from(id),
            kind: Kind::new(major, minor),
            created: day(created),
            terminated: None,
            name: TimeBasedName::new(name, day(created)),
            relationships: Vec::new(),
        }
    }

    fn link(store: &mut InMemoryStore, source: &str, target: &str, name: RelationName, start: &str) {
        let source = EntityId::from(source);
        let edge = Relationship {
            id: crate::ids::relationship_id(&source, &EntityId::from(target)),
            name,
            related_entity_id: EntityId::from(target),
            start_time: day(start),
            end_time: None,
        };
        store
            .update_entity(&source, EntityPatch::create_relationship(edge))
            .unwrap();
    }

    /// Government -> president (role edge) -> two ministers, one department.
    fn fixture() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        store
            .create_entity(entity(
                "gov_01",
                MajorKind::Organisation,
                MinorKind::Government,
                "Government of Sri Lanka",
                "1978-09-07",
            ))
            .unwrap();
        store
            .create_entity(entity(
                "c1",
                MajorKind::Person,
                MinorKind::Citizen,
                "Ranil Wickremesinghe",
                "2019-12-01",
            ))
            .unwrap();
        store
            .create_entity(entity(
                "m1",
                MajorKind::Organisation,
                MinorKind::Minister,
                "Minister of Defence",
                "2019-12-10",
            ))
            .unwrap();
        store
            .create_entity(entity(
                "m2",
                MajorKind::Organisation,
                MinorKind::Minister,
                "Minister of Finance",
                "2019-12-10",
            ))
            .unwrap();
        store
            .create_entity(entity(
                "d1",
                MajorKind::Organisation,
                MinorKind::Department,
                "Sri Lankan Army",
                "2019-12-10",
            ))
            .unwrap();

        link(&mut store, "gov_01", "c1", RelationName::AsPresident, "2019-12-01");
        link(&mut store, "c1", "m1", RelationName::AsMinister, "2019-12-10");
        link(&mut store, "c1", "m2", RelationName::AsMinister, "2019-12-10");
        link(&mut store, "m1", "d1", RelationName::AsDepartment, "2019-12-10");
        store
    }

    #[test]
    fn test_resolve_president_via_role_edge() {
        let store = fixture();
        let resolver = Resolver::new(&store);
        let president = resolver
            .resolve_president("Ranil Wickremesinghe", day("2020-01-01"))
            .unwrap();
        assert_eq!(president.id, EntityId::from("c1"));

        // before the role edge started, the lookup fails
        assert!(matches!(
            resolver.resolve_president("Ranil Wickremesinghe", day("2019-01-01")),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_minister_scoped_to_president() {
        let store = fixture();
        let resolver = Resolver::new(&store);
        let minister = resolver
            .resolve_minister("Ranil Wickremesinghe", "Minister of Defence", day("2020-01-01"))
            .unwrap();
        assert_eq!(minister.id, EntityId::from("m1"));

        assert!(matches!(
            resolver.resolve_minister("Ranil Wickremesinghe", "Minister of Justice", day("2020-01-01")),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_two_active_ministers_with_same_title_is_an_error() {
        let mut store = fixture();
        store
            .create_entity(entity(
                "m3",
                MajorKind::Organisation,
                MinorKind::Minister,
                "Minister of Defence",
                "2020-06-01",
            ))
            .unwrap();
        link(&mut store, "c1", "m3", RelationName::AsMinister, "2020-06-01");

        let resolver = Resolver::new(&store);
        assert!(matches!(
            resolver.resolve_active_minister(
                "Ranil Wickremesinghe",
                "Minister of Defence",
                day("2021-01-01")
            ),
            Err(Error::MultipleActive { .. })
        ));
    }

    #[test]
    fn test_department_under_minister() {
        let store = fixture();
        let resolver = Resolver::new(&store);
        let department = resolver
            .department_under_minister(&EntityId::from("m1"), "Sri Lankan Army")
            .unwrap();
        assert_eq!(department.id, EntityId::from("d1"));

        assert!(matches!(
            resolver.department_under_minister(&EntityId::from("m2"), "Sri Lankan Army"),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_active_department_holders_sees_every_stale_edge() {
        let mut store = fixture();
        // a second active edge left behind by a prior inconsistent state
        link(&mut store, "m2", "d1", RelationName::AsDepartment, "2020-06-01");

        let resolver = Resolver::new(&store);
        let holders = resolver
            .active_department_holders(&EntityId::from("d1"))
            .unwrap();
        assert_eq!(holders.len(), 2);
    }

    #[test]
    fn test_plain_resolution_ambiguity() {
        let mut store = fixture();
        store
            .create_entity(entity(
                "d2",
                MajorKind::Organisation,
                MinorKind::Department,
                "Sri Lankan Army",
                "2021-01-01",
            ))
            .unwrap();

        let resolver = Resolver::new(&store);
        assert!(matches!(
            resolver.resolve(
                KindFilter::exact(MajorKind::Organisation, MinorKind::Department),
                "Sri Lankan Army"
            ),
            Err(Error::Ambiguous { count: 2, .. })
        ));
    }

    #[test]
    fn test_find_person_deduplication_lookup() {
        let store = fixture();
        let resolver = Resolver::new(&store);
        assert!(resolver.find_person("Ranil Wickremesinghe").unwrap().is_some());
        assert!(resolver.find_person("Anura Kumara Dissanayake").unwrap().is_none());
    }
}
