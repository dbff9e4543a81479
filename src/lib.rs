//! # orgchart-rs
//!
//! A temporal organizational-graph engine: a time-varying hierarchy of
//! entities (government, presidents, ministers, departments, citizens,
//! documents) connected by time-bounded relationships and mutated by an
//! ordered stream of domain transactions — add, terminate, move, rename,
//! merge — replayed one at a time against an entity store that offers no
//! multi-step transactions of its own.
//!
//! The crate provides the temporal relationship rules (when an edge is
//! active, and active *at* a date), scoped name resolution (a minister
//! title is meaningful only relative to a sitting president), collision-free
//! identifier allocation, and the compound operations that must behave as
//! if atomic despite being built from several independent store calls.

pub mod batch;
pub mod config;
pub mod documents;
pub mod engine;
pub mod error;
pub mod ids;
pub mod model;
pub mod remote;
pub mod resolver;
pub mod store;
pub mod temporal;

// Re-export main types for convenience
pub use batch::{Transaction, TransactionId};
pub use engine::{Engine, EnginePolicy, ReplayScope, ReplaySummary};
pub use error::{Error, Result};
pub use ids::{CounterKind, EntityCounters};
pub use model::{
    Entity, EntityId, EntitySummary, Kind, KindFilter, MajorKind, MinorKind, RelationName,
    Relationship,
};
pub use resolver::Resolver;
pub use store::{EntityStore, InMemoryStore};
pub use temporal::Timestamp;
