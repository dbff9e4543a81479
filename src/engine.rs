//! # Transaction Engine
//!
//! The operation handlers that mutate the organizational graph. Each handler
//! reads current state through the resolver, validates the domain invariants
//! and issues store mutations, one outstanding call at a time. Compound
//! operations (move, rename, merge) are built from the primitive handlers
//! and perform no compensating rollback: the first error aborts the
//! operation and the batch, and every completed step has been logged so the
//! partial state can be inspected.

use crate::batch::{
    AddRecord, MergeRecord, MoveDepartmentRecord, MoveMinisterRecord, MovePersonRecord,
    RenameRecord, TerminateRecord, Transaction, TransactionId,
};
use crate::error::{Error, Result};
use crate::ids::{self, CounterKind, EntityCounters};
use crate::model::{
    Entity, EntityId, EntityPatch, Kind, KindFilter, MajorKind, MinorKind, RelationName,
    Relationship, RelationshipFilter, SearchCriteria, TimeBasedName,
};
use crate::resolver::Resolver;
use crate::store::EntityStore;
use crate::temporal::Timestamp;
use tracing::{debug, info, warn};

/// Fixed identity of the government root node.
pub const GOVERNMENT_ID: &str = "gov_01";
pub const GOVERNMENT_NAME: &str = "Government of Sri Lanka";
const GOVERNMENT_EPOCH: &str = "1978-09-07";

/// Policy toggles for rules that were deliberately relaxed in the source
/// behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnginePolicy {
    /// Refuse to terminate a minister that still holds active departments.
    /// Off by default so that rename and merge can retire a minister whose
    /// departments are transferred in the same operation.
    pub forbid_minister_termination_with_departments: bool,
}

/// Which transaction family a replay pass processes. Mirrors the two-pass
/// loading of the source corpus: one pass builds the organisation hierarchy,
/// another attaches people.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayScope {
    Organisation,
    Person,
}

impl ReplayScope {
    fn covers(&self, transaction: &Transaction) -> bool {
        let person_family = match transaction {
            Transaction::Add(record) => record.child_kind == MinorKind::Citizen,
            Transaction::Terminate(record) => record.child_kind == MinorKind::Citizen,
            Transaction::MovePerson(_) => true,
            _ => false,
        };
        match self {
            Self::Person => person_family,
            Self::Organisation => {
                !person_family
                    && match transaction {
                        Transaction::Add(record) => {
                            matches!(record.child_kind, MinorKind::Minister | MinorKind::Department)
                        }
                        Transaction::Terminate(record) => {
                            matches!(record.child_kind, MinorKind::Minister | MinorKind::Department)
                        }
                        _ => true,
                    }
            }
        }
    }
}

/// Outcome of one replay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub processed: usize,
    pub skipped: usize,
}

/// Attach a document to an organisation. Documents are append-only: they
/// are deduplicated by name, never terminated, and related purely by adding
/// new edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddDocumentRecord {
    pub id: TransactionId,
    pub parent: String,
    pub parent_kind: MinorKind,
    pub document: String,
    pub document_kind: MinorKind,
    pub rel: RelationName,
    pub date: Timestamp,
}

/// The transaction engine: orchestrates resolver lookups, identifier
/// allocation, and store mutations for each domain transaction.
pub struct Engine {
    store: Box<dyn EntityStore>,
    policy: EnginePolicy,
}

impl Engine {
    pub fn new(store: Box<dyn EntityStore>) -> Self {
        Self::with_policy(store, EnginePolicy::default())
    }

    pub fn with_policy(store: Box<dyn EntityStore>, policy: EnginePolicy) -> Self {
        Self { store, policy }
    }

    /// Read access to the underlying store, for queries and assertions.
    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    /// Mutable access to the underlying store.
    pub fn store_mut(&mut self) -> &mut dyn EntityStore {
        self.store.as_mut()
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self.store.as_ref())
    }

    /// Seed the graph with the government root node.
    pub fn create_government_node(&mut self) -> Result<Entity> {
        let epoch = Timestamp::from_day(GOVERNMENT_EPOCH)?;
        let government = Entity {
            id: EntityId::new(GOVERNMENT_ID),
            kind: Kind::new(MajorKind::Organisation, MinorKind::Government),
            created: epoch,
            terminated: None,
            name: TimeBasedName::new(GOVERNMENT_NAME, epoch),
            relationships: Vec::new(),
        };
        let created = self.store.create_entity(government)?;
        info!(id = %created.id, "created government root node");
        Ok(created)
    }

    /// Add an organisation entity (minister or department) under its parent
    /// and connect the two with a fresh active edge.
    pub fn add_org(
        &mut self,
        record: &AddRecord,
        counters: &mut EntityCounters,
    ) -> Result<EntityId> {
        let date = record.date;

        let parent_id = match record.child_kind {
            MinorKind::Minister => {
                if record.parent_kind != MinorKind::Citizen {
                    return Err(Error::invariant(format!(
                        "a minister must be added under the sitting president, got parent kind '{}'",
                        record.parent_kind
                    )));
                }
                // the president scope defaults to the parent itself: the
                // parent of a minister is the citizen holding the role
                let president = record.president.as_deref().unwrap_or(&record.parent);
                self.resolver().resolve_president(president, date)?.id
            }
            MinorKind::Department => {
                if record.parent_kind != MinorKind::Minister {
                    return Err(Error::invariant(format!(
                        "a department must be added under a minister, got parent kind '{}'",
                        record.parent_kind
                    )));
                }
                let president = record.president.as_deref().ok_or_else(|| {
                    Error::invariant("president name is required when adding a department")
                })?;
                // department names are globally unique: validated, not assumed
                let existing = self.store.search_entities(&SearchCriteria::by_kind_and_name(
                    KindFilter::exact(MajorKind::Organisation, MinorKind::Department),
                    record.child.clone(),
                ))?;
                if !existing.is_empty() {
                    return Err(Error::invariant(format!(
                        "department already exists: {}",
                        record.child
                    )));
                }
                self.resolver()
                    .resolve_active_minister(president, &record.parent, date)?
                    .id
            }
            _ => {
                let kind =
                    KindFilter::exact(record.parent_kind.default_major(), record.parent_kind.clone());
                self.resolver().resolve(kind, &record.parent)?.id
            }
        };

        let counter_kind = CounterKind::for_minor(&record.child_kind).ok_or_else(|| {
            Error::invariant(format!(
                "no id counter for child kind '{}'",
                record.child_kind
            ))
        })?;
        let counter = counters.allocate(counter_kind);
        let child_id = ids::entity_id(record.id.batch_prefix(), counter_kind, counter);

        let child = Entity {
            id: child_id,
            kind: Kind::new(record.child_kind.default_major(), record.child_kind.clone()),
            created: date,
            terminated: None,
            name: TimeBasedName::new(record.child.clone(), date),
            relationships: Vec::new(),
        };
        let created = self.store.create_entity(child)?;
        self.append_edge(&parent_id, &created.id, record.rel.clone(), date)?;
        info!(transaction = %record.id, child = %created.id, name = %record.child, "added organisation entity");
        Ok(created.id)
    }

    /// Add a person under an organisation. People are deduplicated globally
    /// by name: an existing person is reconnected rather than duplicated.
    pub fn add_person(
        &mut self,
        record: &AddRecord,
        counters: &mut EntityCounters,
    ) -> Result<EntityId> {
        let date = record.date;

        let parent_id = match (&record.parent_kind, &record.president) {
            (MinorKind::Minister, Some(president)) => {
                self.resolver()
                    .resolve_active_minister(president, &record.parent, date)?
                    .id
            }
            _ => {
                let kind =
                    KindFilter::exact(record.parent_kind.default_major(), record.parent_kind.clone());
                self.resolver().resolve(kind, &record.parent)?.id
            }
        };

        let child_id = match self.resolver().find_person(&record.child)? {
            Some(existing) => {
                debug!(person = %existing.id, name = %record.child, "reusing existing person entity");
                existing.id
            }
            None => {
                let counter_kind = CounterKind::for_minor(&record.child_kind).ok_or_else(|| {
                    Error::invariant(format!(
                        "no id counter for child kind '{}'",
                        record.child_kind
                    ))
                })?;
                let counter = counters.allocate(counter_kind);
                let child = Entity {
                    id: ids::entity_id(record.id.batch_prefix(), counter_kind, counter),
                    kind: Kind::new(MajorKind::Person, record.child_kind.clone()),
                    created: date,
                    terminated: None,
                    name: TimeBasedName::new(record.child.clone(), date),
                    relationships: Vec::new(),
                };
                self.store.create_entity(child)?.id
            }
        };

        self.append_edge(&parent_id, &child_id, record.rel.clone(), date)?;
        info!(transaction = %record.id, child = %child_id, name = %record.child, "added person entity");
        Ok(child_id)
    }

    /// Terminate the active relationship between two organisation entities
    /// at the record's date.
    pub fn terminate_org(&mut self, record: &TerminateRecord) -> Result<()> {
        let date = record.date;

        let parent_id = match record.parent_kind {
            MinorKind::Minister => {
                let president = record.president.as_deref().ok_or_else(|| {
                    Error::invariant(
                        "president name is required when terminating minister relationships",
                    )
                })?;
                self.resolver()
                    .resolve_minister(president, &record.parent, date)?
                    .id
            }
            _ => {
                let kind =
                    KindFilter::exact(record.parent_kind.default_major(), record.parent_kind.clone());
                self.resolver().resolve(kind, &record.parent)?.id
            }
        };

        let child_id = match record.child_kind {
            MinorKind::Minister => {
                let president = record.president.as_deref().ok_or_else(|| {
                    Error::invariant(
                        "president name is required when terminating minister relationships",
                    )
                })?;
                self.resolver()
                    .resolve_minister(president, &record.child, date)?
                    .id
            }
            MinorKind::Department => self
                .resolver()
                .department_under_minister(&parent_id, &record.child)?
                .id,
            _ => {
                let kind =
                    KindFilter::exact(record.child_kind.default_major(), record.child_kind.clone());
                self.resolver().resolve(kind, &record.child)?.id
            }
        };

        if record.child_kind == MinorKind::Minister
            && self.policy.forbid_minister_termination_with_departments
        {
            let departments = self.active_edges(&child_id, RelationName::AsDepartment)?;
            if !departments.is_empty() {
                return Err(Error::invariant(format!(
                    "cannot terminate minister '{}' while {} department(s) are still active",
                    record.child,
                    departments.len()
                )));
            }
        }

        self.terminate_active_edge(&parent_id, &child_id, record.rel.clone(), date)?;
        info!(transaction = %record.id, parent = %parent_id, child = %child_id, "terminated relationship");
        Ok(())
    }

    /// Terminate the active relationship between an organisation and a
    /// person.
    pub fn terminate_person(&mut self, record: &TerminateRecord) -> Result<()> {
        let parent_kind =
            KindFilter::exact(record.parent_kind.default_major(), record.parent_kind.clone());
        let parent_id = self.resolver().resolve(parent_kind, &record.parent)?.id;
        let child_kind = KindFilter::exact(MajorKind::Person, record.child_kind.clone());
        let child_id = self.resolver().resolve(child_kind, &record.child)?.id;

        self.terminate_active_edge(&parent_id, &child_id, record.rel.clone(), record.date)?;
        info!(transaction = %record.id, parent = %parent_id, child = %child_id, "terminated person relationship");
        Ok(())
    }

    /// Move a department to a minister active under the new president. All
    /// currently-active assignments of the department are terminated first —
    /// prior inconsistent states can leave more than one, and skipping any
    /// of them would break the single-active-assignment invariant.
    pub fn move_department(&mut self, record: &MoveDepartmentRecord) -> Result<()> {
        let date = record.date;
        let department = self.resolver().resolve(
            KindFilter::exact(MajorKind::Organisation, MinorKind::Department),
            &record.department,
        )?;
        let new_minister = self.resolver().resolve_active_minister(
            &record.new_president,
            &record.new_minister,
            date,
        )?;
        let holders = self.resolver().active_department_holders(&department.id)?;
        if holders.is_empty() {
            warn!(
                department = %department.id,
                old_minister = %record.old_minister,
                "department has no active assignment to terminate"
            );
        }

        for (minister_id, edge) in &holders {
            self.store.update_entity(
                minister_id,
                EntityPatch::terminate_relationship(edge.id.clone(), date),
            )?;
            info!(
                transaction = %record.id,
                minister = %minister_id,
                department = %department.id,
                edge = %edge.id,
                "terminated department assignment"
            );
        }

        self.append_edge(
            &new_minister.id,
            &department.id,
            RelationName::AsDepartment,
            date,
        )?;
        info!(
            transaction = %record.id,
            minister = %new_minister.id,
            department = %department.id,
            "moved department"
        );
        Ok(())
    }

    /// Move an appointed person between ministers serving under the same
    /// president.
    pub fn move_person(&mut self, record: &MovePersonRecord) -> Result<()> {
        let date = record.date;
        let new_minister = self.resolver().resolve_active_minister(
            &record.president,
            &record.new_minister,
            date,
        )?;
        let old_minister = self
            .resolver()
            .resolve_minister(&record.president, &record.old_minister, date)?;
        let person = self.resolver().resolve(
            KindFilter::exact(MajorKind::Person, MinorKind::Citizen),
            &record.person,
        )?;

        self.terminate_active_edge(
            &old_minister.id,
            &person.id,
            RelationName::AsAppointed,
            date,
        )?;
        self.append_edge(&new_minister.id, &person.id, RelationName::AsAppointed, date)?;
        info!(
            transaction = %record.id,
            person = %person.id,
            from = %old_minister.id,
            to = %new_minister.id,
            "moved appointed person"
        );
        Ok(())
    }

    /// Move a minister from one president to another.
    pub fn move_minister(&mut self, record: &MoveMinisterRecord) -> Result<()> {
        let date = record.date;
        let minister = self.resolver().resolve_active_minister(
            &record.old_president,
            &record.minister,
            date,
        )?;
        let old_president = self.resolver().resolve_president(&record.old_president, date)?;
        let new_president = self.resolver().resolve_president(&record.new_president, date)?;

        self.terminate_active_edge(&old_president.id, &minister.id, RelationName::AsMinister, date)?;
        self.append_edge(&new_president.id, &minister.id, RelationName::AsMinister, date)?;
        info!(
            transaction = %record.id,
            minister = %minister.id,
            from = %old_president.id,
            to = %new_president.id,
            "moved minister"
        );
        Ok(())
    }

    /// Rename a minister: create the successor under the same president,
    /// transfer every active department, terminate the president's edge to
    /// the predecessor, and link the two with `RENAMED_TO`.
    pub fn rename_minister(
        &mut self,
        record: &RenameRecord,
        counters: &mut EntityCounters,
    ) -> Result<EntityId> {
        let date = record.date;
        let old = self
            .resolver()
            .resolve_active_minister(&record.president, &record.old, date)?;

        let new_id = self.add_org(
            &AddRecord {
                id: record.id.clone(),
                parent: record.president.clone(),
                parent_kind: MinorKind::Citizen,
                child: record.new.clone(),
                child_kind: MinorKind::Minister,
                rel: RelationName::AsMinister,
                date,
                president: Some(record.president.clone()),
            },
            counters,
        )?;

        for department in self.active_department_names(&old.id)? {
            self.move_department(&MoveDepartmentRecord {
                id: record.id.clone(),
                department,
                old_minister: record.old.clone(),
                new_minister: record.new.clone(),
                old_president: Some(record.president.clone()),
                new_president: record.president.clone(),
                date,
            })?;
        }

        let president = self.resolver().resolve_president(&record.president, date)?;
        self.terminate_active_edge(&president.id, &old.id, RelationName::AsMinister, date)?;
        self.append_edge(&old.id, &new_id, RelationName::RenamedTo, date)?;
        info!(
            transaction = %record.id,
            old = %old.id,
            new = %new_id,
            "renamed minister"
        );
        Ok(new_id)
    }

    /// Rename a department in place under its owning minister.
    pub fn rename_department(
        &mut self,
        record: &RenameRecord,
        counters: &mut EntityCounters,
    ) -> Result<EntityId> {
        let date = record.date;
        let old = self.resolver().resolve(
            KindFilter::exact(MajorKind::Organisation, MinorKind::Department),
            &record.old,
        )?;

        let mut holders = self.resolver().active_department_holders(&old.id)?;
        let (minister_id, edge) = match holders.len() {
            0 => {
                return Err(Error::invariant(format!(
                    "no active minister assignment found for department '{}'",
                    record.old
                )))
            }
            1 => holders.remove(0),
            _ => return Err(Error::multiple_active("department", record.old.clone())),
        };

        let minister_name = self.entity_name(&minister_id)?;
        let under_president = self
            .resolver()
            .resolve_minister(&record.president, &minister_name, date)?;
        if under_president.id != minister_id {
            return Err(Error::invariant(format!(
                "minister '{}' does not serve under president '{}'",
                minister_name, record.president
            )));
        }

        let new_id = self.add_org(
            &AddRecord {
                id: record.id.clone(),
                parent: minister_name,
                parent_kind: MinorKind::Minister,
                child: record.new.clone(),
                child_kind: MinorKind::Department,
                rel: RelationName::AsDepartment,
                date,
                president: Some(record.president.clone()),
            },
            counters,
        )?;

        self.store.update_entity(
            &minister_id,
            EntityPatch::terminate_relationship(edge.id.clone(), date),
        )?;
        self.append_edge(&old.id, &new_id, RelationName::RenamedTo, date)?;
        info!(
            transaction = %record.id,
            old = %old.id,
            new = %new_id,
            "renamed department"
        );
        Ok(new_id)
    }

    /// Merge several ministers into a freshly created one. Each old minister
    /// is processed independently; a failure aborts the merge without
    /// undoing ministers already processed.
    pub fn merge_ministers(
        &mut self,
        record: &MergeRecord,
        counters: &mut EntityCounters,
    ) -> Result<EntityId> {
        let date = record.date;
        let new_id = self.add_org(
            &AddRecord {
                id: record.id.clone(),
                parent: record.president.clone(),
                parent_kind: MinorKind::Citizen,
                child: record.new.clone(),
                child_kind: MinorKind::Minister,
                rel: RelationName::AsMinister,
                date,
                president: Some(record.president.clone()),
            },
            counters,
        )?;

        for old_name in &record.old {
            let old = self
                .resolver()
                .resolve_minister(&record.president, old_name, date)?;

            for department in self.active_department_names(&old.id)? {
                self.move_department(&MoveDepartmentRecord {
                    id: record.id.clone(),
                    department,
                    old_minister: old_name.clone(),
                    new_minister: record.new.clone(),
                    old_president: Some(record.president.clone()),
                    new_president: record.president.clone(),
                    date,
                })?;
            }

            let president = self.resolver().resolve_president(&record.president, date)?;
            self.terminate_active_edge(&president.id, &old.id, RelationName::AsMinister, date)?;
            self.append_edge(&old.id, &new_id, RelationName::MergedInto, date)?;
            info!(
                transaction = %record.id,
                old = %old.id,
                new = %new_id,
                "merged minister"
            );
        }
        Ok(new_id)
    }

    /// Attach a document to an organisation, creating it if a document of
    /// that kind and name does not exist yet. Documents are never
    /// terminated.
    pub fn add_document(
        &mut self,
        record: &AddDocumentRecord,
        counters: &mut EntityCounters,
    ) -> Result<EntityId> {
        let date = record.date;
        let parent_kind =
            KindFilter::exact(record.parent_kind.default_major(), record.parent_kind.clone());
        let parent_id = self.resolver().resolve(parent_kind, &record.parent)?.id;

        let document_kind = KindFilter::exact(MajorKind::Document, record.document_kind.clone());
        let document_id = match self
            .resolver()
            .find_document(document_kind, &record.document)?
        {
            Some(existing) => {
                debug!(document = %existing.id, "reusing existing document entity");
                existing.id
            }
            None => {
                let counter = counters.allocate(CounterKind::Document);
                let document = Entity {
                    id: ids::entity_id(record.id.batch_prefix(), CounterKind::Document, counter),
                    kind: Kind::new(MajorKind::Document, record.document_kind.clone()),
                    created: date,
                    terminated: None,
                    name: TimeBasedName::new(record.document.clone(), date),
                    relationships: Vec::new(),
                };
                self.store.create_entity(document)?.id
            }
        };

        self.append_edge(&parent_id, &document_id, record.rel.clone(), date)?;
        info!(transaction = %record.id, document = %document_id, "attached document");
        Ok(document_id)
    }

    /// Replay an ordered batch, fail-fast: the first failing transaction
    /// stops the run and is reported; transactions outside the scope are
    /// skipped.
    pub fn replay(
        &mut self,
        transactions: &[Transaction],
        scope: ReplayScope,
        counters: &mut EntityCounters,
    ) -> Result<ReplaySummary> {
        let mut summary = ReplaySummary::default();
        for transaction in transactions {
            if !scope.covers(transaction) {
                debug!(id = %transaction.id(), op = transaction.label(), "transaction outside replay scope");
                summary.skipped += 1;
                continue;
            }
            info!(id = %transaction.id(), op = transaction.label(), "processing transaction");

            let result = match transaction {
                Transaction::Add(record) if record.child_kind == MinorKind::Citizen => {
                    self.add_person(record, counters).map(|_| ())
                }
                Transaction::Add(record) => self.add_org(record, counters).map(|_| ()),
                Transaction::Terminate(record) if record.child_kind == MinorKind::Citizen => {
                    self.terminate_person(record)
                }
                Transaction::Terminate(record) => self.terminate_org(record),
                Transaction::MoveDepartment(record) => self.move_department(record),
                Transaction::MovePerson(record) => self.move_person(record),
                Transaction::MoveMinister(record) => self.move_minister(record),
                Transaction::RenameMinister(record) => {
                    self.rename_minister(record, counters).map(|_| ())
                }
                Transaction::RenameDepartment(record) => {
                    self.rename_department(record, counters).map(|_| ())
                }
                Transaction::Merge(record) => self.merge_ministers(record, counters).map(|_| ()),
            };

            if let Err(err) = result {
                warn!(
                    id = %transaction.id(),
                    op = transaction.label(),
                    error = %err,
                    "transaction failed; stopping replay"
                );
                return Err(err);
            }
            summary.processed += 1;
        }
        Ok(summary)
    }

    /// Names of the departments currently assigned to a minister.
    fn active_department_names(&self, minister_id: &EntityId) -> Result<Vec<String>> {
        let edges = self.active_edges(minister_id, RelationName::AsDepartment)?;
        let mut names = Vec::with_capacity(edges.len());
        for edge in &edges {
            names.push(self.entity_name(&edge.related_entity_id)?);
        }
        Ok(names)
    }

    fn active_edges(&self, source: &EntityId, name: RelationName) -> Result<Vec<Relationship>> {
        Ok(self
            .store
            .get_related_entities(source, &RelationshipFilter::named(name))?
            .into_iter()
            .filter(Relationship::is_active)
            .collect())
    }

    fn entity_name(&self, id: &EntityId) -> Result<String> {
        let mut matches = self
            .store
            .search_entities(&SearchCriteria::by_id(id.clone()))?;
        if matches.is_empty() {
            return Err(Error::not_found("entity", id.as_str()));
        }
        Ok(matches.remove(0).name)
    }

    /// Append a fresh active edge from `source` to `target`.
    fn append_edge(
        &mut self,
        source: &EntityId,
        target: &EntityId,
        name: RelationName,
        start: Timestamp,
    ) -> Result<Relationship> {
        let edge = Relationship {
            id: ids::relationship_id(source, target),
            name,
            related_entity_id: target.clone(),
            start_time: start,
            end_time: None,
        };
        self.store
            .update_entity(source, EntityPatch::create_relationship(edge.clone()))?;
        debug!(source = %source, target = %target, rel = %edge.name, "appended relationship");
        Ok(edge)
    }

    /// Terminate the single active `name` edge from `source` to `target`.
    /// No active edge is an invariant violation: there is nothing to
    /// terminate.
    fn terminate_active_edge(
        &mut self,
        source: &EntityId,
        target: &EntityId,
        name: RelationName,
        end: Timestamp,
    ) -> Result<()> {
        let edges = self.store.get_related_entities(
            source,
            &RelationshipFilter::named(name.clone()).related_to(target.clone()),
        )?;
        let active = edges
            .into_iter()
            .find(|edge| edge.is_active())
            .ok_or_else(|| {
                Error::invariant(format!(
                    "no active {} relationship between {} and {}",
                    name, source, target
                ))
            })?;
        self.store.update_entity(
            source,
            EntityPatch::terminate_relationship(active.id.clone(), end),
        )?;
        debug!(source = %source, target = %target, edge = %active.id, "terminated relationship");
        Ok(())
    }
}
