//! weave_npc: the non-roster NPC tracking and tiering engine (§4.2).
//!
//! Candidates extracted by the content pipeline are validated, verified
//! against scene text, folded into per-name [`tracking::NpcTracking`] rows
//! via a "get-or-create, then mutate" aggregate update, and periodically
//! classified into active/inactive tiers for context assembly.

pub mod cross_story;
pub mod fork;
pub mod ingest;
pub mod mention;
pub mod scoring;
pub mod snapshot_bridge;
pub mod tiering;
pub mod tracking;
pub mod validation;

pub use cross_story::{augment_with_world_scope, NpcTrackingRef, SiblingStorySource};
pub use fork::{clone_npc_mentions, clone_npc_trackings, NpcMentionDescriptor, NpcTrackingDescriptor};
pub use ingest::{ingest_scene_candidates, IngestionSummary, NpcCandidate};
pub use mention::{verify_candidate_in_scene, NpcMention, VerifiedMention};
pub use scoring::{compute_importance, ImportanceBreakdown};
pub use snapshot_bridge::build_snapshot;
pub use tiering::{classify, compute_tiers, Tier, TieredNpc, TIER_CAP};
pub use tracking::{canonical_form, names_match, NpcProfile, NpcTracking};
pub use validation::{looks_like_proper_noun, overlaps_roster, validate_candidate, EntityType};
