//! weave_query: read-only query builders and the branch-fork algorithm over
//! branch-scoped entities (§4.1, §6).
//!
//! Uses a boxed-closure filter-builder idiom throughout, applied to the
//! branch-scoped entities of [`weave_core::domain`].

pub mod fork;
pub mod query;

pub use fork::{order_descriptors, CloneDescriptor, EntityKind, ForkContext, ForkError};
pub use query::{SceneQuery, StoryCharacterQuery, StoryFlowQuery};
