//! # Store Module
//!
//! The entity-store contract the engine consumes, plus an in-memory
//! implementation of it used by tests and local runs. The store offers no
//! multi-step transactions and no uniqueness guarantees beyond entity-id
//! collision on create; every domain invariant is the caller's job. The
//! remote client in [`crate::remote`] implements the same trait over the
//! store's REST endpoints.

use crate::error::{Error, Result};
use crate::model::{
    Entity, EntityId, EntityPatch, EntitySummary, Relationship, RelationshipFilter,
    RelationshipPatch, SearchCriteria,
};
use hashbrown::HashMap;

/// Contract offered by the entity store.
///
/// `update_entity` has merge semantics: only the fields present in the patch
/// are applied, and only the relationship entries explicitly included are
/// touched. A terminate entry sets `end_time` on the matching edge; a create
/// entry appends a new edge. Omitted fields and edges are left as they are.
pub trait EntityStore {
    /// Create a new entity. Fails if an entity with the same id exists.
    fn create_entity(&mut self, entity: Entity) -> Result<Entity>;

    /// Return the summaries of all entities matching the criteria: zero,
    /// one, or many, with no implicit uniqueness guarantee.
    fn search_entities(&self, criteria: &SearchCriteria) -> Result<Vec<EntitySummary>>;

    /// Apply a partial update to an existing entity and return its new
    /// state.
    fn update_entity(&mut self, id: &EntityId, patch: EntityPatch) -> Result<Entity>;

    /// Enumerate the relationships owned by `id` that pass the filter.
    fn get_related_entities(
        &self,
        id: &EntityId,
        filter: &RelationshipFilter,
    ) -> Result<Vec<Relationship>>;
}

/// In-memory entity store. Reference implementation of the contract,
/// including the merge-update semantics; the engine's integration tests run
/// against it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entities: HashMap<EntityId, Entity>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities held.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Fetch a full entity, mostly for assertions in tests.
    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }
}

impl EntityStore for InMemoryStore {
    fn create_entity(&mut self, entity: Entity) -> Result<Entity> {
        if self.entities.contains_key(&entity.id) {
            return Err(Error::invariant(format!(
                "entity already exists: {}",
                entity.id
            )));
        }
        self.entities.insert(entity.id.clone(), entity.clone());
        Ok(entity)
    }

    fn search_entities(&self, criteria: &SearchCriteria) -> Result<Vec<EntitySummary>> {
        let mut matches: Vec<EntitySummary> = self
            .entities
            .values()
            .filter(|entity| {
                criteria.id.as_ref().map_or(true, |id| entity.id == *id)
                    && criteria
                        .kind
                        .as_ref()
                        .map_or(true, |kind| kind.matches(&entity.kind))
                    && criteria
                        .name
                        .as_ref()
                        .map_or(true, |name| entity.name.value == *name)
            })
            .map(Entity::summary)
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matches)
    }

    fn update_entity(&mut self, id: &EntityId, patch: EntityPatch) -> Result<Entity> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| Error::not_found("entity", id.as_str()))?;

        if let Some(name) = patch.name {
            entity.name = name;
        }
        if let Some(terminated) = patch.terminated {
            entity.terminated = Some(terminated);
        }
        for entry in patch.relationships {
            match entry {
                RelationshipPatch::Create(relationship) => {
                    if entity
                        .relationships
                        .iter()
                        .any(|existing| existing.id == relationship.id)
                    {
                        return Err(Error::invariant(format!(
                            "relationship id already exists: {}",
                            relationship.id
                        )));
                    }
                    entity.relationships.push(relationship);
                }
                RelationshipPatch::Terminate { id: rel_id, end_time } => {
                    let relationship = entity
                        .relationships
                        .iter_mut()
                        .find(|existing| existing.id == rel_id)
                        .ok_or_else(|| Error::not_found("relationship", &rel_id))?;
                    // termination is monotonic: an end time, once set, stays
                    if relationship.end_time.is_none() {
                        relationship.end_time = Some(end_time);
                    }
                }
            }
        }
        Ok(entity.clone())
    }

    fn get_related_entities(
        &self,
        id: &EntityId,
        filter: &RelationshipFilter,
    ) -> Result<Vec<Relationship>> {
        let entity = self
            .entities
            .get(id)
            .ok_or_else(|| Error::not_found("entity", id.as_str()))?;
        Ok(entity
            .relationships
            .iter()
            .filter(|relationship| filter.matches(relationship))
            .cloned()
            .collect())
    }
}
