//! Renders NPC tier lists (§4.2 tiering) into the text block appended to the
//! character-roster message (§4.3 message 3 covers the explicit roster; the
//! tracked-NPC tiers ride along in the same stable-per-session slot since
//! they, too, only mutate when a tracking row crosses or falls out of a
//! tier — not every turn).

use weave_npc::TieredNpc;

/// Formats the active tier with full detail and the inactive tier as a
/// brief name/role list, in that order; returns `None` when both are empty
/// so callers can skip the slot entirely.
pub fn format_npc_tier_block(active: &[TieredNpc], inactive: &[TieredNpc]) -> Option<String> {
    if active.is_empty() && inactive.is_empty() {
        return None;
    }

    let mut out = String::new();
    if !active.is_empty() {
        out.push_str("Active NPCs:\n");
        for npc in active {
            out.push_str(&format_active_entry(npc));
            out.push('\n');
        }
    }
    if !inactive.is_empty() {
        out.push_str("Recently seen NPCs (brief):\n");
        for npc in inactive {
            out.push_str(&format_inactive_entry(npc));
            out.push('\n');
        }
    }
    Some(out.trim_end().to_string())
}

fn format_active_entry(npc: &TieredNpc) -> String {
    let origin = npc.from_story_title.as_deref().map(|t| format!(" [From '{t}']")).unwrap_or_default();
    let personality = if npc.personality.is_empty() { String::new() } else { format!(" ({})", npc.personality.join(", ")) };
    format!(
        "- {name}{origin} — {role}{personality}: {description}{goals}",
        name = npc.name,
        role = npc.role,
        description = npc.description,
        goals = if npc.goals.is_empty() { String::new() } else { format!(" Goals: {}.", npc.goals) },
    )
}

fn format_inactive_entry(npc: &TieredNpc) -> String {
    let origin = npc.from_story_title.as_deref().map(|t| format!(" [From '{t}']")).unwrap_or_default();
    format!("- {name}{origin} — {role}", name = npc.name, role = npc.role)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn npc(name: &str, role: &str, from_story: Option<&str>) -> TieredNpc {
        TieredNpc {
            name: name.into(),
            role: role.into(),
            description: "runs the tavern".into(),
            personality: vec!["blunt".into()],
            goals: "keep the regulars safe".into(),
            relationships: String::new(),
            importance_score: 50.0,
            from_story_title: from_story.map(String::from),
        }
    }

    #[test]
    fn returns_none_when_both_tiers_empty() {
        assert!(format_npc_tier_block(&[], &[]).is_none());
    }

    #[test]
    fn active_entries_carry_full_detail() {
        let active = vec![npc("Mira", "innkeeper", None)];
        let block = format_npc_tier_block(&active, &[]).unwrap();
        assert!(block.contains("runs the tavern"));
        assert!(block.contains("blunt"));
    }

    #[test]
    fn inactive_entries_carry_only_name_and_role() {
        let inactive = vec![npc("Corvin", "smith", None)];
        let block = format_npc_tier_block(&[], &inactive).unwrap();
        assert!(block.contains("Corvin"));
        assert!(block.contains("smith"));
        assert!(!block.contains("tavern"));
    }

    #[test]
    fn cross_story_origin_label_rendered() {
        let inactive = vec![npc("Corvin", "smith", Some("The Other Tale"))];
        let block = format_npc_tier_block(&[], &inactive).unwrap();
        assert!(block.contains("[From 'The Other Tale']"));
    }
}
