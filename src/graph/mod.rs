//! Graph data model and in-memory assembly

pub mod assembler;
pub mod cache;
pub mod edge;
pub mod node;
pub mod types;

pub use assembler::{GraphAssembler, TalentGraph};
pub use cache::{CacheEntry, CacheSlot, CacheStatusEntry};
pub use edge::{CoemploymentAttrs, CoemploymentStint, CollaborationAttrs, RelationEdge};
pub use node::{ExternalProfile, PersonNode};
pub use types::{EdgeKind, EmployerId, PairKey, PersonId};
