//! Top-level ingestion entry point: candidates -> validated -> verified ->
//! tracker mutation -> recompute (§4.2).
//!
//! §7 propagation policy: ingestion never propagates per-candidate failures.
//! It returns a summary and logs the rest at `warn`.

use std::collections::HashMap;

use tracing::warn;
use weave_core::{NpcTrackingConfig, SceneId, SceneSequence};

use crate::mention::{verify_candidate_in_scene, NpcMention};
use crate::tracking::{canonical_form, names_match, NpcTracking};
use crate::validation::{validate_candidate, EntityType};

/// One LLM-extracted candidate NPC for a scene, before verification.
#[derive(Debug, Clone)]
pub struct NpcCandidate {
    pub name: String,
    pub entity_type: EntityType,
    pub has_relationships: bool,
}

/// Summary of one ingestion call (§7: "NPC tracker ingestion methods return
/// a result summary and log failures rather than propagating").
#[derive(Debug, Clone, Default)]
pub struct IngestionSummary {
    pub accepted: u32,
    pub rejected_validation: u32,
    pub rejected_verification: u32,
    pub crossed_threshold_names: Vec<String>,
}

/// Ingests one batch of LLM-extracted candidates against one scene's text,
/// folding verified mentions into `trackers` (keyed by canonical name) and
/// recomputing scores. `roster_names` gates roster-overlap rejection.
pub fn ingest_scene_candidates(
    trackers: &mut HashMap<String, NpcTracking>,
    candidates: &[NpcCandidate],
    scene_id: SceneId,
    sequence: SceneSequence,
    scene_text: &str,
    roster_names: &[&str],
    total_scenes: u32,
    cfg: &NpcTrackingConfig,
) -> (IngestionSummary, Vec<NpcMention>) {
    let mut summary = IngestionSummary::default();
    let mut mentions = Vec::new();

    for candidate in candidates {
        if !validate_candidate(&candidate.name, candidate.entity_type, roster_names) {
            summary.rejected_validation += 1;
            continue;
        }

        let verified = match verify_candidate_in_scene(&candidate.name, scene_text, scene_id, sequence) {
            Some(v) => v,
            None => {
                summary.rejected_verification += 1;
                warn!(candidate = %candidate.name, scene = %sequence, "candidate failed text verification");
                continue;
            }
        };

        let mention = NpcMention::from_verified(candidate.name.clone(), &verified, candidate.has_relationships);

        let existing_key = trackers.keys().find(|k| names_match(k, &candidate.name)).cloned();
        let key = match existing_key {
            Some(existing) => {
                let canonical = canonical_form(&existing, &candidate.name).to_string();
                if canonical != existing {
                    if let Some(mut tracking) = trackers.remove(&existing) {
                        tracking.name = canonical.clone();
                        trackers.insert(canonical.clone(), tracking);
                    }
                }
                canonical
            }
            None => candidate.name.clone(),
        };

        let tracking = trackers.entry(key).or_insert_with(|| NpcTracking::new(candidate.name.clone()));
        tracking.entity_type = candidate.entity_type;
        tracking.record_mention(verified.sequence, verified.mention_count, verified.has_dialogue, verified.has_actions);

        let just_crossed = tracking.recompute_scores(total_scenes, sequence.0, cfg);
        if just_crossed {
            summary.crossed_threshold_names.push(tracking.name.clone());
        }

        summary.accepted += 1;
        mentions.push(mention);
    }

    (summary, mentions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingests_accepted_candidate_and_rejects_roster_overlap() {
        let mut trackers = HashMap::new();
        let candidates = vec![
            NpcCandidate {
                name: "Mira".into(),
                entity_type: EntityType::Character,
                has_relationships: false,
            },
            NpcCandidate {
                name: "Hero".into(), // matches roster
                entity_type: EntityType::Character,
                has_relationships: false,
            },
        ];
        let cfg = NpcTrackingConfig::default();
        let (summary, mentions) = ingest_scene_candidates(
            &mut trackers,
            &candidates,
            SceneId::new(1),
            SceneSequence::new(1),
            "Mira walked in and said \"hello\" to Hero.",
            &["Hero"],
            10,
            &cfg,
        );
        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.rejected_validation, 1);
        assert_eq!(mentions.len(), 1);
        assert!(trackers.contains_key("Mira"));
    }

    #[test]
    fn deduplicates_surname_against_full_name_across_scenes() {
        let mut trackers = HashMap::new();
        let cfg = NpcTrackingConfig {
            importance_threshold: 1000.0, // never cross, keep test focused on dedup
            ..NpcTrackingConfig::default()
        };
        ingest_scene_candidates(
            &mut trackers,
            &[NpcCandidate { name: "Reynolds".into(), entity_type: EntityType::Character, has_relationships: false }],
            SceneId::new(1),
            SceneSequence::new(1),
            "Reynolds raised his hand and walked away.",
            &[],
            10,
            &cfg,
        );
        ingest_scene_candidates(
            &mut trackers,
            &[NpcCandidate { name: "Sheriff Reynolds".into(), entity_type: EntityType::Character, has_relationships: false }],
            SceneId::new(2),
            SceneSequence::new(2),
            "Sheriff Reynolds nodded at the deputy.",
            &[],
            10,
            &cfg,
        );
        assert_eq!(trackers.len(), 1);
        let (_, tracking) = trackers.iter().next().unwrap();
        assert_eq!(tracking.scene_count, 2);
    }
}
