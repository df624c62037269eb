//! The `NPCTracking` aggregate: per-(story, branch, name) state, threshold
//! crossing, and the name-deduplication/merge rules (§3, §4.2).
//!
//! Name normalization and dedup follow a "get-or-create, then mutate"
//! aggregate idiom: a mention either extends an existing tracking row or
//! opens a new one, never both.

use std::collections::HashSet;

use weave_core::{NpcTrackingConfig, NpcTrackingId, SceneSequence};

use crate::scoring::compute_importance;
use crate::validation::EntityType;

/// A full NPC profile extracted once the tracking row crosses the
/// importance threshold (§4.2 threshold crossing).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NpcProfile {
    pub role: String,
    pub description: String,
    pub personality: Vec<String>,
    pub background: String,
    pub goals: String,
    pub relationships: String,
    pub appearance: String,
}

impl NpcProfile {
    /// §4.2: "require at least one non-empty field".
    pub fn has_any_field(&self) -> bool {
        !self.role.is_empty()
            || !self.description.is_empty()
            || !self.personality.is_empty()
            || !self.background.is_empty()
            || !self.goals.is_empty()
            || !self.relationships.is_empty()
            || !self.appearance.is_empty()
    }
}

/// Per-(story, branch, name) aggregate (§3).
#[derive(Debug, Clone)]
pub struct NpcTracking {
    pub id: Option<NpcTrackingId>,
    pub name: String,
    pub total_mentions: u32,
    pub scene_count: u32,
    pub first_appearance_scene: u32,
    pub last_appearance_scene: u32,
    pub dialogue_scene_count: u32,
    pub action_scene_count: u32,
    pub entity_type: EntityType,
    pub frequency_score: f32,
    pub significance_score: f32,
    pub importance_score: f32,
    /// Latching: once true, never reset (§3, §8 invariant).
    pub crossed_threshold: bool,
    pub profile_extracted: bool,
    pub converted_to_character: bool,
    pub extracted_profile: Option<NpcProfile>,
    mentioned_scenes: HashSet<u32>,
}

impl NpcTracking {
    pub fn new(name: String) -> Self {
        NpcTracking {
            id: None,
            name,
            total_mentions: 0,
            scene_count: 0,
            first_appearance_scene: 0,
            last_appearance_scene: 0,
            dialogue_scene_count: 0,
            action_scene_count: 0,
            entity_type: EntityType::Character,
            frequency_score: 0.0,
            significance_score: 0.0,
            importance_score: 0.0,
            crossed_threshold: false,
            profile_extracted: false,
            converted_to_character: false,
            extracted_profile: None,
            mentioned_scenes: HashSet::new(),
        }
    }

    /// Folds one verified mention into the aggregate. Safe to call more than
    /// once for the same scene (scene-count-distinct semantics, §3).
    pub fn record_mention(&mut self, sequence: SceneSequence, mention_count: u32, has_dialogue: bool, has_actions: bool) {
        let seq = sequence.0;
        self.total_mentions += mention_count;
        if self.mentioned_scenes.insert(seq) {
            self.scene_count += 1;
        }
        if has_dialogue {
            self.dialogue_scene_count += 1;
        }
        if has_actions {
            self.action_scene_count += 1;
        }
        if self.first_appearance_scene == 0 || seq < self.first_appearance_scene {
            self.first_appearance_scene = seq;
        }
        if seq > self.last_appearance_scene {
            self.last_appearance_scene = seq;
        }
    }

    /// Recomputes the three scores and latches `crossed_threshold` if the
    /// importance score clears `cfg.importance_threshold` (§4.2). Returns
    /// `true` exactly when this call is the one that crosses the threshold
    /// (so the caller knows to trigger profile extraction).
    pub fn recompute_scores(&mut self, total_scenes: u32, current_scene: u32, cfg: &NpcTrackingConfig) -> bool {
        let breakdown = compute_importance(self, total_scenes, current_scene, cfg);
        self.frequency_score = breakdown.frequency_score;
        self.significance_score = breakdown.significance_score;
        self.importance_score = breakdown.importance_score;

        let just_crossed = !self.crossed_threshold && self.importance_score >= cfg.importance_threshold;
        if just_crossed {
            self.crossed_threshold = true;
        }
        just_crossed
    }

    pub fn apply_profile(&mut self, profile: NpcProfile) -> bool {
        if !profile.has_any_field() {
            return false;
        }
        self.extracted_profile = Some(profile);
        self.profile_extracted = true;
        true
    }

    /// Merges `other` into `self` in place, keeping the richer name and the
    /// union of all counters (§4.2 aggregation/dedup).
    pub fn merge_from(&mut self, other: NpcTracking) {
        if other.name.len() > self.name.len() || other.importance_score > self.importance_score {
            self.name = other.name;
        }
        self.total_mentions += other.total_mentions;
        for scene in &other.mentioned_scenes {
            if self.mentioned_scenes.insert(*scene) {
                self.scene_count += 1;
            }
        }
        self.dialogue_scene_count += other.dialogue_scene_count;
        self.action_scene_count += other.action_scene_count;
        if self.first_appearance_scene == 0
            || (other.first_appearance_scene != 0 && other.first_appearance_scene < self.first_appearance_scene)
        {
            self.first_appearance_scene = other.first_appearance_scene;
        }
        if other.last_appearance_scene > self.last_appearance_scene {
            self.last_appearance_scene = other.last_appearance_scene;
        }
        self.crossed_threshold = self.crossed_threshold || other.crossed_threshold;
        self.profile_extracted = self.profile_extracted || other.profile_extracted;
        self.converted_to_character = self.converted_to_character || other.converted_to_character;
        if self.extracted_profile.is_none() {
            self.extracted_profile = other.extracted_profile;
        }
    }
}

fn word_set(name: &str) -> HashSet<String> {
    name.split_whitespace().map(|w| w.to_lowercase()).collect()
}

/// True if `a` and `b` should be treated as the same NPC: exact
/// case-insensitive match, or one name's word set is a subset of the
/// other's (e.g. "Reynolds" vs "Sheriff Reynolds") (§4.2).
pub fn names_match(a: &str, b: &str) -> bool {
    if a.eq_ignore_ascii_case(b) {
        return true;
    }
    let wa = word_set(a);
    let wb = word_set(b);
    if wa.is_empty() || wb.is_empty() {
        return false;
    }
    wa.is_subset(&wb) || wb.is_subset(&wa)
}

/// Picks the canonical capitalized form between two case-insensitively equal
/// names, preferring the one with more uppercase letters, then the longer.
pub fn canonical_form<'a>(a: &'a str, b: &'a str) -> &'a str {
    let caps = |s: &str| s.chars().filter(|c| c.is_uppercase()).count();
    match caps(a).cmp(&caps(b)) {
        std::cmp::Ordering::Greater => a,
        std::cmp::Ordering::Less => b,
        std::cmp::Ordering::Equal => {
            if a.len() >= b.len() {
                a
            } else {
                b
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_mention_counts_distinct_scenes_once() {
        let mut t = NpcTracking::new("Mira".into());
        t.record_mention(SceneSequence::new(5), 2, true, false);
        t.record_mention(SceneSequence::new(5), 1, false, true);
        assert_eq!(t.scene_count, 1);
        assert_eq!(t.total_mentions, 3);
        assert_eq!(t.dialogue_scene_count, 1);
        assert_eq!(t.action_scene_count, 1);
    }

    #[test]
    fn first_and_last_appearance_tracked() {
        let mut t = NpcTracking::new("Mira".into());
        t.record_mention(SceneSequence::new(5), 1, false, false);
        t.record_mention(SceneSequence::new(2), 1, false, false);
        t.record_mention(SceneSequence::new(9), 1, false, false);
        assert_eq!(t.first_appearance_scene, 2);
        assert_eq!(t.last_appearance_scene, 9);
    }

    #[test]
    fn threshold_crossing_latches() {
        let mut t = NpcTracking::new("Mira".into());
        let cfg = NpcTrackingConfig {
            importance_threshold: 5.0,
            use_recency_decay: false,
            ..NpcTrackingConfig::default()
        };
        t.record_mention(SceneSequence::new(1), 5, true, true);
        assert!(t.recompute_scores(10, 1, &cfg));
        assert!(t.crossed_threshold);
        // A later recompute with a lower score must not un-latch.
        t.total_mentions = 0;
        t.dialogue_scene_count = 0;
        t.action_scene_count = 0;
        assert!(!t.recompute_scores(10, 1, &cfg));
        assert!(t.crossed_threshold);
    }

    #[test]
    fn names_match_subset_superset() {
        assert!(names_match("Reynolds", "Sheriff Reynolds"));
        assert!(names_match("mira", "Mira"));
        assert!(!names_match("Mira", "Gareth"));
    }

    #[test]
    fn merge_unions_counters_and_keeps_richer_name() {
        let mut a = NpcTracking::new("Reynolds".into());
        a.record_mention(SceneSequence::new(1), 1, false, false);
        let mut b = NpcTracking::new("Sheriff Reynolds".into());
        b.record_mention(SceneSequence::new(2), 1, true, false);
        a.merge_from(b);
        assert_eq!(a.name, "Sheriff Reynolds");
        assert_eq!(a.scene_count, 2);
        assert_eq!(a.dialogue_scene_count, 1);
    }

    #[test]
    fn profile_requires_non_empty_field() {
        let mut t = NpcTracking::new("Mira".into());
        assert!(!t.apply_profile(NpcProfile::default()));
        assert!(t.apply_profile(NpcProfile {
            role: "innkeeper".into(),
            ..NpcProfile::default()
        }));
        assert!(t.profile_extracted);
    }
}
