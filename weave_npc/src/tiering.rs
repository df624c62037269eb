//! Active/Inactive/Dormant tier classification (§4.2).
//!
//! Tier lists are pre-calculated once per scene rather than recomputed per
//! query, narrowing the full tracking set stage by stage: recency filter,
//! then chapter-awareness override, then the per-tier size cap.

use std::collections::HashSet;

use weave_core::NpcTrackingConfig;

use crate::tracking::NpcTracking;
use crate::validation::EntityType;

/// Which of the three tiers (or exclusion) an NPC falls into for a given
/// scene (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Active,
    Inactive,
    Dormant,
}

/// A tiered NPC ready for context-assembly formatting; active entries carry
/// full detail, inactive entries only name + role (§4.2).
#[derive(Debug, Clone, PartialEq)]
pub struct TieredNpc {
    pub name: String,
    pub role: String,
    pub description: String,
    pub personality: Vec<String>,
    pub goals: String,
    pub relationships: String,
    pub importance_score: f32,
    pub from_story_title: Option<String>,
}

impl TieredNpc {
    fn full(tracking: &NpcTracking) -> Self {
        let profile = tracking.extracted_profile.clone().unwrap_or_default();
        TieredNpc {
            name: tracking.name.clone(),
            role: profile.role,
            description: profile.description,
            personality: profile.personality,
            goals: profile.goals,
            relationships: profile.relationships,
            importance_score: tracking.importance_score,
            from_story_title: None,
        }
    }

    fn brief(tracking: &NpcTracking) -> Self {
        let role = tracking.extracted_profile.as_ref().map(|p| p.role.clone()).unwrap_or_default();
        TieredNpc {
            name: tracking.name.clone(),
            role,
            description: String::new(),
            personality: Vec::new(),
            goals: String::new(),
            relationships: String::new(),
            importance_score: tracking.importance_score,
            from_story_title: None,
        }
    }
}

/// Classifies one tracking row for inclusion at `current_scene` within
/// chapter `chapter_scenes` (the set of scene sequences belonging to the
/// current chapter, for the chapter-awareness toggle).
pub fn classify(tracking: &NpcTracking, current_scene: u32, chapter_scenes: &HashSet<u32>, appears_in_chapter: bool, cfg: &NpcTrackingConfig) -> Tier {
    if !tracking.crossed_threshold || tracking.converted_to_character || tracking.entity_type != EntityType::Character {
        return Tier::Dormant;
    }
    let delta = current_scene.saturating_sub(tracking.last_appearance_scene);
    let is_active = delta <= cfg.active_recency_window || (cfg.use_chapter_awareness && appears_in_chapter && !chapter_scenes.is_empty());
    if is_active {
        return Tier::Active;
    }
    if delta <= cfg.inactive_recency_window {
        Tier::Inactive
    } else {
        Tier::Dormant
    }
}

/// Tier cap (§4.2): each tier holds at most this many entries.
pub const TIER_CAP: usize = weave_core::config::TIER_CAP;

/// Computes the active and inactive tier lists for a scene, given every
/// candidate tracking row plus a predicate saying whether each one appears
/// in the current chapter. Capped at [`TIER_CAP`] each, ordered by
/// descending importance; no overlap between the two lists by name (§8).
pub fn compute_tiers<'a>(
    candidates: impl IntoIterator<Item = (&'a NpcTracking, bool)>,
    current_scene: u32,
    chapter_scenes: &HashSet<u32>,
    cfg: &NpcTrackingConfig,
) -> (Vec<TieredNpc>, Vec<TieredNpc>) {
    let mut active: Vec<&NpcTracking> = Vec::new();
    let mut inactive: Vec<&NpcTracking> = Vec::new();

    for (tracking, appears_in_chapter) in candidates {
        match classify(tracking, current_scene, chapter_scenes, appears_in_chapter, cfg) {
            Tier::Active => active.push(tracking),
            Tier::Inactive => inactive.push(tracking),
            Tier::Dormant => {}
        }
    }

    active.sort_by(|a, b| b.importance_score.partial_cmp(&a.importance_score).unwrap_or(std::cmp::Ordering::Equal));
    inactive.sort_by(|a, b| b.importance_score.partial_cmp(&a.importance_score).unwrap_or(std::cmp::Ordering::Equal));

    active.truncate(TIER_CAP);
    inactive.truncate(TIER_CAP);

    (
        active.into_iter().map(TieredNpc::full).collect(),
        inactive.into_iter().map(TieredNpc::brief).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_core::SceneSequence;

    fn crossed(name: &str, last_appearance: u32, importance: f32) -> NpcTracking {
        let mut t = NpcTracking::new(name.into());
        t.record_mention(SceneSequence::new(last_appearance), 1, false, false);
        t.crossed_threshold = true;
        t.importance_score = importance;
        t
    }

    #[test]
    fn active_within_window() {
        let cfg = NpcTrackingConfig::default();
        let t = crossed("Mira", 18, 50.0);
        let empty = HashSet::new();
        assert_eq!(classify(&t, 20, &empty, false, &cfg), Tier::Active);
    }

    #[test]
    fn inactive_beyond_active_within_inactive_window() {
        let cfg = NpcTrackingConfig::default();
        let t = crossed("Mira", 1, 50.0);
        let empty = HashSet::new();
        assert_eq!(classify(&t, 10, &empty, false, &cfg), Tier::Inactive);
    }

    #[test]
    fn dormant_beyond_inactive_window() {
        let cfg = NpcTrackingConfig::default();
        let t = crossed("Mira", 1, 50.0);
        let empty = HashSet::new();
        assert_eq!(classify(&t, 1000, &empty, false, &cfg), Tier::Dormant);
    }

    #[test]
    fn chapter_awareness_keeps_npc_active_despite_stale_last_appearance() {
        let cfg = NpcTrackingConfig::default();
        let t = crossed("Mira", 11, 50.0);
        let chapter_scenes: HashSet<u32> = (10..=20).collect();
        // last_appearance=11 is far behind S=20 relative to a tiny active window,
        // but Mira appeared somewhere in chapter 2 (scenes 10-20).
        assert_eq!(classify(&t, 20, &chapter_scenes, true, &cfg), Tier::Active);
    }

    #[test]
    fn unconverted_and_uncrossed_excluded() {
        let cfg = NpcTrackingConfig::default();
        let mut t = crossed("Mira", 20, 90.0);
        t.converted_to_character = true;
        let empty = HashSet::new();
        assert_eq!(classify(&t, 20, &empty, false, &cfg), Tier::Dormant);
    }

    #[test]
    fn tiers_capped_and_ordered_descending() {
        let cfg = NpcTrackingConfig::default();
        let trackings: Vec<NpcTracking> = (0..15).map(|i| crossed(&format!("Npc{i}"), 20, i as f32)).collect();
        let chapter_scenes = HashSet::new();
        let candidates = trackings.iter().map(|t| (t, false));
        let (active, inactive) = compute_tiers(candidates, 20, &chapter_scenes, &cfg);
        assert_eq!(active.len(), TIER_CAP);
        assert!(inactive.is_empty());
        assert!(active[0].importance_score >= active[1].importance_score);
        let names: std::collections::HashSet<_> = active.iter().map(|n| n.name.clone()).collect();
        let inactive_names: std::collections::HashSet<_> = inactive.iter().map(|n| n.name.clone()).collect();
        assert!(names.is_disjoint(&inactive_names));
    }
}
