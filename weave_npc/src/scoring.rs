//! Importance scoring (§4.2): frequency + significance + optional recency
//! decay, returned as an owned breakdown rather than mutated in place.
//!
//! Each call returns a fresh owned breakdown rather than mutating `tracking`
//! in place, so a caller can compare hypothetical scores before committing.

use weave_core::NpcTrackingConfig;

use crate::tracking::NpcTracking;

/// The three scores §4.2 defines, computed fresh from `tracking`'s current
/// counters — calling this twice with identical inputs yields identical
/// output (§8 idempotence law), since nothing here is mutated in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportanceBreakdown {
    pub frequency_score: f32,
    pub significance_score: f32,
    /// `min(frequency + significance, 100)`, before recency decay.
    pub base_score: f32,
    /// Recency multiplier in `[0.3, 1.0]`; `1.0` when decay is disabled.
    pub recency_factor: f32,
    /// `base_score * recency_factor`.
    pub importance_score: f32,
}

/// `mention_score = min(10 + 20*log10(total_mentions), 50)` for
/// `total_mentions > 0`, else `0`.
fn mention_score(total_mentions: u32) -> f32 {
    if total_mentions == 0 {
        0.0
    } else {
        (10.0 + 20.0 * (total_mentions as f32).log10()).min(50.0)
    }
}

/// `scene_score = 20 * (scene_count / total_scenes_in_branch)`.
fn scene_score(scene_count: u32, total_scenes: u32) -> f32 {
    if total_scenes == 0 {
        0.0
    } else {
        20.0 * (scene_count as f32 / total_scenes as f32)
    }
}

/// Recency decay (§4.2): no decay within `inactive_window`; otherwise linear
/// decay from 1.0 toward a floor of 0.3 over an additional
/// `inactive_window` scenes.
fn recency_factor(current_scene: u32, last_appearance_scene: u32, inactive_window: u32) -> f32 {
    if inactive_window == 0 {
        return 1.0;
    }
    let delta = current_scene.saturating_sub(last_appearance_scene);
    if delta <= inactive_window {
        return 1.0;
    }
    let excess = (delta - inactive_window) as f32;
    let decay_rate = (excess / inactive_window as f32).min(1.0);
    (1.0 - decay_rate * 0.7).max(0.3)
}

/// Computes the full importance breakdown for `tracking` given the current
/// scene position and the branch's total scene count.
pub fn compute_importance(
    tracking: &NpcTracking,
    total_scenes: u32,
    current_scene: u32,
    cfg: &NpcTrackingConfig,
) -> ImportanceBreakdown {
    let freq = (mention_score(tracking.total_mentions) + scene_score(tracking.scene_count, total_scenes)).min(70.0);

    let dialogue_bonus = (3.0 * tracking.dialogue_scene_count as f32).min(15.0);
    let action_bonus = (3.0 * tracking.action_scene_count as f32).min(15.0);
    let significance = (dialogue_bonus + action_bonus).min(30.0);

    let base = (freq + significance).min(100.0);

    let recency = if cfg.use_recency_decay {
        recency_factor(current_scene, tracking.last_appearance_scene, cfg.inactive_recency_window)
    } else {
        1.0
    };

    ImportanceBreakdown {
        frequency_score: freq,
        significance_score: significance,
        base_score: base,
        recency_factor: recency,
        importance_score: base * recency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::NpcTracking;

    fn tracking_with(total_mentions: u32, scene_count: u32, dialogue: u32, actions: u32, last_appearance: u32) -> NpcTracking {
        let mut t = NpcTracking::new("Mira".into());
        t.total_mentions = total_mentions;
        t.scene_count = scene_count;
        t.dialogue_scene_count = dialogue;
        t.action_scene_count = actions;
        t.first_appearance_scene = 1;
        t.last_appearance_scene = last_appearance;
        t
    }

    #[test]
    fn recomputation_is_idempotent() {
        let tracking = tracking_with(40, 10, 5, 3, 20);
        let cfg = NpcTrackingConfig::default();
        let a = compute_importance(&tracking, 50, 22, &cfg);
        let b = compute_importance(&tracking, 50, 22, &cfg);
        assert_eq!(a, b);
    }

    #[test]
    fn frequency_score_capped_at_seventy() {
        let tracking = tracking_with(10_000, 50, 0, 0, 50);
        let cfg = NpcTrackingConfig {
            use_recency_decay: false,
            ..NpcTrackingConfig::default()
        };
        let result = compute_importance(&tracking, 50, 50, &cfg);
        assert!(result.frequency_score <= 70.0);
        assert_eq!(result.base_score, result.frequency_score);
    }

    #[test]
    fn no_decay_within_inactive_window() {
        let tracking = tracking_with(20, 5, 2, 1, 10);
        let cfg = NpcTrackingConfig {
            inactive_recency_window: 15,
            use_recency_decay: true,
            ..NpcTrackingConfig::default()
        };
        let result = compute_importance(&tracking, 30, 20, &cfg);
        assert_eq!(result.recency_factor, 1.0);
    }

    #[test]
    fn decay_floors_at_point_three() {
        let tracking = tracking_with(20, 5, 2, 1, 1);
        let cfg = NpcTrackingConfig {
            inactive_recency_window: 10,
            use_recency_decay: true,
            ..NpcTrackingConfig::default()
        };
        let result = compute_importance(&tracking, 30, 1000, &cfg);
        assert_eq!(result.recency_factor, 0.3);
        assert_eq!(result.importance_score, result.base_score * 0.3);
    }
}
