//! Turn-mode resolution: who responds this turn (§4.3).
//!
//! `natural` needs a source of per-character probability draws: a seeded
//! roll source for production, swappable for a scripted one in tests.

use regex::Regex;

/// A source of independent draws in `[0, 1)`, one per character considered
/// for natural-mode gating.
pub trait TalkRoll {
    fn roll(&mut self) -> f32;
}

/// Deterministic xorshift64 PRNG, seeded explicitly by the caller (e.g. from
/// a per-turn seed derived from the story id and turn counter) so that
/// re-running the same turn with the same seed reproduces the same
/// responder set.
pub struct Xorshift64Roll {
    state: u64,
}

impl Xorshift64Roll {
    pub fn new(seed: u64) -> Self {
        Xorshift64Roll { state: seed.max(1) }
    }
}

impl TalkRoll for Xorshift64Roll {
    fn roll(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 11) as f32 / (1u64 << 53) as f32
    }
}

/// A fixed, pre-scripted sequence of rolls for tests.
pub struct ScriptedRoll {
    values: std::vec::IntoIter<f32>,
}

impl ScriptedRoll {
    pub fn new(values: Vec<f32>) -> Self {
        ScriptedRoll { values: values.into_iter() }
    }
}

impl TalkRoll for ScriptedRoll {
    fn roll(&mut self) -> f32 {
        self.values.next().unwrap_or(1.0)
    }
}

fn word_boundary_contains(haystack: &str, name: &str) -> Option<usize> {
    let escaped = regex::escape(name);
    let re = Regex::new(&format!(r"(?i)\b{escaped}\b")).ok()?;
    re.find(haystack).map(|m| m.start())
}

/// `natural` turn mode (§4.3): characters whose full or first name appears
/// (word-boundary matched) in `user_message` are always active, ordered by
/// mention position; every other character is included with probability
/// equal to its talkativeness. If nobody would respond, the
/// highest-talkativeness character is forced.
pub fn resolve_natural(user_message: &str, roster: &[(String, f32)], roll: &mut dyn TalkRoll) -> Vec<String> {
    let mut mentioned: Vec<(usize, &str)> = Vec::new();
    for (name, _) in roster {
        let first_name = name.split_whitespace().next().unwrap_or(name.as_str());
        let position = word_boundary_contains(user_message, name).or_else(|| word_boundary_contains(user_message, first_name));
        if let Some(pos) = position {
            mentioned.push((pos, name.as_str()));
        }
    }
    mentioned.sort_by_key(|(pos, _)| *pos);

    let mut responders: Vec<String> = mentioned.into_iter().map(|(_, name)| name.to_string()).collect();
    let already: std::collections::HashSet<&str> = responders.iter().map(|s| s.as_str()).collect();

    for (name, talkativeness) in roster {
        if already.contains(name.as_str()) {
            continue;
        }
        if roll.roll() < *talkativeness {
            responders.push(name.clone());
        }
    }

    if responders.is_empty() {
        if let Some((name, _)) = roster
            .iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        {
            responders.push(name.clone());
        }
    }

    responders
}

/// `round_robin` turn mode (§4.3, §8 boundary scenario 6): the next index
/// after `last_responder_idx` in roster order, wrapping at the end.
pub fn resolve_round_robin(roster_len: usize, last_responder_idx: Option<u32>) -> u32 {
    if roster_len == 0 {
        return 0;
    }
    match last_responder_idx {
        Some(idx) => (idx + 1) % roster_len as u32,
        None => 0,
    }
}

/// `manual` turn mode (§4.3): exactly the caller-supplied set, falling back
/// to every AI character when the selection is empty.
pub fn resolve_manual(selected: &[String], all_ai_characters: &[String]) -> Vec<String> {
    if selected.is_empty() {
        all_ai_characters.to_vec()
    } else {
        selected.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentioned_characters_are_always_active_ordered_by_position() {
        let roster = vec![("Mira".to_string(), 0.0), ("Gareth".to_string(), 0.0)];
        let mut roll = ScriptedRoll::new(vec![1.0, 1.0]);
        let responders = resolve_natural("Gareth walked in before Mira arrived.", &roster, &mut roll);
        assert_eq!(responders, vec!["Gareth".to_string(), "Mira".to_string()]);
    }

    #[test]
    fn unmentioned_characters_gated_by_talkativeness() {
        let roster = vec![("Mira".to_string(), 0.9)];
        let mut roll = ScriptedRoll::new(vec![0.1]); // 0.1 < 0.9 talkativeness => included
        let responders = resolve_natural("The door creaked open.", &roster, &mut roll);
        assert_eq!(responders, vec!["Mira".to_string()]);
    }

    #[test]
    fn forces_highest_talkativeness_when_nobody_would_respond() {
        let roster = vec![("Mira".to_string(), 0.2), ("Gareth".to_string(), 0.8)];
        let mut roll = ScriptedRoll::new(vec![0.9, 0.9]); // both rolls fail their gate
        let responders = resolve_natural("Silence.", &roster, &mut roll);
        assert_eq!(responders, vec!["Gareth".to_string()]);
    }

    #[test]
    fn round_robin_advances_and_wraps() {
        assert_eq!(resolve_round_robin(3, Some(1)), 2);
        assert_eq!(resolve_round_robin(3, Some(2)), 0);
        assert_eq!(resolve_round_robin(3, None), 0);
    }

    #[test]
    fn manual_falls_back_to_all_when_empty() {
        let all = vec!["Mira".to_string(), "Gareth".to_string()];
        assert_eq!(resolve_manual(&[], &all), all);
        assert_eq!(resolve_manual(&["Mira".to_string()], &all), vec!["Mira".to_string()]);
    }

    #[test]
    fn xorshift_roll_is_deterministic_for_same_seed() {
        let mut a = Xorshift64Roll::new(42);
        let mut b = Xorshift64Roll::new(42);
        for _ in 0..5 {
            assert_eq!(a.roll(), b.roll());
        }
    }
}
