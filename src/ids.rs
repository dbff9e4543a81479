//! # Identifier Allocation
//!
//! Collision-free identifiers for new entities and new edges. Entity ids
//! embed the owning transaction's batch prefix and a per-kind running
//! counter, so they can never collide within one counter's lifetime. Edge
//! ids embed both endpoint ids plus a random uniquifier, so repeated
//! operations between the same pair over time (a move out and back in)
//! always mint distinct ids.

use crate::model::{EntityId, MinorKind};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Entity kinds that receive allocator counters. Every document sub-kind
/// shares the single document counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    Minister,
    Department,
    Citizen,
    Document,
}

impl CounterKind {
    /// Abbreviation embedded in entity ids.
    pub fn abbrev(&self) -> &'static str {
        match self {
            Self::Minister => "min",
            Self::Department => "dep",
            Self::Citizen => "cit",
            Self::Document => "doc",
        }
    }

    /// The counter a freshly created entity of `minor` kind draws from.
    /// The government root is seeded once with a fixed id and never
    /// allocated, so it has no counter.
    pub fn for_minor(minor: &MinorKind) -> Option<Self> {
        match minor {
            MinorKind::Minister => Some(Self::Minister),
            MinorKind::Department => Some(Self::Department),
            MinorKind::Citizen => Some(Self::Citizen),
            MinorKind::Custom(_) => Some(Self::Document),
            MinorKind::Government => None,
        }
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

/// Per-kind running counters, scoped to one processing run.
///
/// Threaded through the engine as an explicit mutable context rather than
/// process-global state, so separate runs and tests never interfere.
#[derive(Debug, Clone, Default)]
pub struct EntityCounters {
    counts: HashMap<CounterKind, u64>,
}

impl EntityCounters {
    /// Counters starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one counter to resume an interrupted run.
    pub fn seed(mut self, kind: CounterKind, value: u64) -> Self {
        self.counts.insert(kind, value);
        self
    }

    /// Current value of a counter.
    pub fn get(&self, kind: CounterKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Allocate the next value for `kind`. The counter only increases, which
    /// is what makes id collisions structurally impossible.
    pub fn allocate(&mut self, kind: CounterKind) -> u64 {
        let count = self.counts.entry(kind).or_insert(0);
        *count += 1;
        *count
    }
}

/// Derive a new entity id: `<batchPrefix>_<abbrev>_<counter>`.
pub fn entity_id(batch_prefix: &str, kind: CounterKind, counter: u64) -> EntityId {
    EntityId::new(format!("{}_{}_{}", batch_prefix, kind.abbrev(), counter))
}

/// Derive a unique edge id: `<sourceId>_<targetId>_<uniquifier>`. The
/// uniquifier is random rather than wall-clock-derived, so same-instant
/// edges between one pair cannot collide and no store-hostile characters
/// appear in the key.
pub fn relationship_id(source: &EntityId, target: &EntityId) -> String {
    format!("{}_{}_{}", source, target, Uuid::new_v4().simple())
}
