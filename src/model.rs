//! # Data Model
//!
//! Core data structures for the organizational graph: entities, their kinds,
//! and the time-bounded relationships that connect them. Entity names are
//! time-stamped values; relationships are directed edges owned by the source
//! entity's relationship set, active while their end time is unset.

use crate::error::{Error, Result};
use crate::temporal::Timestamp;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Opaque entity identifier. Assigned once at creation and never reused for
/// a different logical entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Major entity category. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MajorKind {
    Organisation,
    Person,
    Document,
}

impl MajorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organisation => "Organisation",
            Self::Person => "Person",
            Self::Document => "Document",
        }
    }
}

impl fmt::Display for MajorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minor entity category: a validated open set. The hierarchy kinds are
/// closed variants; document sub-kinds (e.g. `extgzt:org`) stay open-ended
/// and flow through `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MinorKind {
    Government,
    Minister,
    Department,
    Citizen,
    Custom(String),
}

impl MinorKind {
    /// Parse a minor kind from its wire form. Blank values are rejected;
    /// unknown values become `Custom`.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::invariant("minor kind must not be empty"));
        }
        Ok(match trimmed {
            "government" => Self::Government,
            "minister" => Self::Minister,
            "department" => Self::Department,
            "citizen" => Self::Citizen,
            other => Self::Custom(other.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Government => "government",
            Self::Minister => "minister",
            Self::Department => "department",
            Self::Citizen => "citizen",
            Self::Custom(raw) => raw,
        }
    }

    /// The major category this minor kind belongs to by default. Custom
    /// minors only occur on documents.
    pub fn default_major(&self) -> MajorKind {
        match self {
            Self::Government | Self::Minister | Self::Department => MajorKind::Organisation,
            Self::Citizen => MajorKind::Person,
            Self::Custom(_) => MajorKind::Document,
        }
    }
}

impl fmt::Display for MinorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MinorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MinorKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        MinorKind::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Full entity kind: major category plus qualifying minor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Kind {
    pub major: MajorKind,
    pub minor: MinorKind,
}

impl Kind {
    pub fn new(major: MajorKind, minor: MinorKind) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.major, self.minor)
    }
}

/// Relationship vocabulary. The hierarchy- and supersession-defining names
/// are closed variants; document-link CSVs may carry arbitrary names, which
/// flow through `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationName {
    AsMinister,
    AsDepartment,
    AsPresident,
    AsAppointed,
    RenamedTo,
    MergedInto,
    HasDocument,
    Custom(String),
}

impl RelationName {
    /// Parse a relationship name from its wire form.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::invariant("relationship name must not be empty"));
        }
        Ok(match trimmed {
            "AS_MINISTER" => Self::AsMinister,
            "AS_DEPARTMENT" => Self::AsDepartment,
            "AS_PRESIDENT" => Self::AsPresident,
            "AS_APPOINTED" => Self::AsAppointed,
            "RENAMED_TO" => Self::RenamedTo,
            "MERGED_INTO" => Self::MergedInto,
            "HAS_DOCUMENT" => Self::HasDocument,
            other => Self::Custom(other.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::AsMinister => "AS_MINISTER",
            Self::AsDepartment => "AS_DEPARTMENT",
            Self::AsPresident => "AS_PRESIDENT",
            Self::AsAppointed => "AS_APPOINTED",
            Self::RenamedTo => "RENAMED_TO",
            Self::MergedInto => "MERGED_INTO",
            Self::HasDocument => "HAS_DOCUMENT",
            Self::Custom(raw) => raw,
        }
    }
}

impl fmt::Display for RelationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RelationName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RelationName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RelationName::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A time-stamped name: the value plus the instant it became valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBasedName {
    pub value: String,
    pub start_time: Timestamp,
}

impl TimeBasedName {
    pub fn new(value: impl Into<String>, start_time: Timestamp) -> Self {
        Self {
            value: value.into(),
            start_time,
        }
    }
}

/// A directed, time-bounded edge owned by the source entity's relationship
/// set. Active while `end_time` is unset; terminating an edge sets its end
/// time and is never undone — edges are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub name: RelationName,
    pub related_entity_id: EntityId,
    pub start_time: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Timestamp>,
}

impl Relationship {
    /// Active means no end time has been set.
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Active at instant `at`: started on or before `at`, and either still
    /// open or ending strictly after `at`.
    pub fn is_active_at(&self, at: Timestamp) -> bool {
        self.start_time <= at && self.end_time.map_or(true, |end| end > at)
    }
}

/// A node in the organizational graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: EntityId,
    pub kind: Kind,
    pub created: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminated: Option<Timestamp>,
    pub name: TimeBasedName,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Entity {
    pub fn summary(&self) -> EntitySummary {
        EntitySummary {
            id: self.id.clone(),
            kind: self.kind.clone(),
            name: self.name.value.clone(),
            created: self.created,
            terminated: self.terminated,
        }
    }
}

/// Search-result row: the flat projection the store returns for matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySummary {
    pub id: EntityId,
    pub kind: Kind,
    pub name: String,
    pub created: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminated: Option<Timestamp>,
}

/// Kind filter for searches. The minor is optional so that person and
/// document deduplication can look across every minor of a major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindFilter {
    pub major: MajorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor: Option<MinorKind>,
}

impl KindFilter {
    pub fn major(major: MajorKind) -> Self {
        Self { major, minor: None }
    }

    pub fn exact(major: MajorKind, minor: MinorKind) -> Self {
        Self {
            major,
            minor: Some(minor),
        }
    }

    pub fn matches(&self, kind: &Kind) -> bool {
        self.major == kind.major && self.minor.as_ref().map_or(true, |m| *m == kind.minor)
    }
}

/// Search criteria. Every field is optional; the store returns zero, one,
/// or many matches with no implicit uniqueness guarantee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<KindFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
}

impl SearchCriteria {
    pub fn by_id(id: EntityId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_kind(kind: KindFilter) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn by_kind_and_name(kind: KindFilter, name: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Relationship filter for `get_related_entities`. `active_at` applies the
/// temporal predicate in the store; callers that need "active now" filter on
/// `Relationship::is_active` themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<RelationName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_entity_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_at: Option<Timestamp>,
}

impl RelationshipFilter {
    pub fn named(name: RelationName) -> Self {
        Self {
            name: Some(name),
            ..Self::default()
        }
    }

    pub fn related_to(mut self, id: EntityId) -> Self {
        self.related_entity_id = Some(id);
        self
    }

    pub fn active_at(mut self, at: Timestamp) -> Self {
        self.active_at = Some(at);
        self
    }

    pub fn matches(&self, relationship: &Relationship) -> bool {
        if let Some(name) = &self.name {
            if relationship.name != *name {
                return false;
            }
        }
        if let Some(related) = &self.related_entity_id {
            if relationship.related_entity_id != *related {
                return false;
            }
        }
        if let Some(at) = self.active_at {
            if !relationship.is_active_at(at) {
                return false;
            }
        }
        true
    }
}

/// Partial entity update. Only the fields present are applied; the
/// relationship entries distinguish creating a new edge from terminating an
/// existing one, the two forms the store's merge-update contract supports.
#[derive(Debug, Clone, Default)]
pub struct EntityPatch {
    pub name: Option<TimeBasedName>,
    pub terminated: Option<Timestamp>,
    pub relationships: Vec<RelationshipPatch>,
}

impl EntityPatch {
    pub fn create_relationship(relationship: Relationship) -> Self {
        Self {
            relationships: vec![RelationshipPatch::Create(relationship)],
            ..Self::default()
        }
    }

    pub fn terminate_relationship(id: impl Into<String>, end_time: Timestamp) -> Self {
        Self {
            relationships: vec![RelationshipPatch::Terminate {
                id: id.into(),
                end_time,
            }],
            ..Self::default()
        }
    }
}

/// One relationship entry of a partial update.
#[derive(Debug, Clone)]
pub enum RelationshipPatch {
    /// A new edge with a fresh id and full fields.
    Create(Relationship),
    /// Terminate the existing edge with this id.
    Terminate { id: String, end_time: Timestamp },
}
