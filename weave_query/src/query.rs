//! Boxed-closure filter builders over branch-scoped entities.
//!
//! A `filters: Vec<Box<dyn Fn(&T) -> bool>>` accumulator with `with_*`
//! consuming builder methods and a final `execute` that applies every
//! filter — the §6 persistence-contract queries this crate is allowed to
//! express without a storage backend.

use weave_core::{BranchId, SceneSequence, Scene, StoryCharacter, StoryFlow, StoryId};

/// Filter builder over [`Scene`] rows, covering the §6 range-query contract
/// (`story`, `branch`, `sequence range`) plus the soft-delete flag.
#[derive(Default)]
pub struct SceneQuery {
    filters: Vec<Box<dyn Fn(&Scene) -> bool>>,
}

impl SceneQuery {
    pub fn new() -> Self {
        SceneQuery::default()
    }

    pub fn in_branch(mut self, story_id: StoryId, branch_id: BranchId) -> Self {
        self.filters
            .push(Box::new(move |s| s.story_id == story_id && s.branch_id == branch_id));
        self
    }

    pub fn sequence_at_most(mut self, max: SceneSequence) -> Self {
        self.filters.push(Box::new(move |s| s.sequence <= max));
        self
    }

    pub fn sequence_range(mut self, min: SceneSequence, max: SceneSequence) -> Self {
        self.filters
            .push(Box::new(move |s| s.sequence >= min && s.sequence <= max));
        self
    }

    pub fn excluding_deleted(mut self) -> Self {
        self.filters.push(Box::new(|s| !s.is_deleted));
        self
    }

    pub fn execute<'a>(&self, rows: &'a [Scene]) -> Vec<&'a Scene> {
        rows.iter().filter(|s| self.filters.iter().all(|f| f(s))).collect()
    }
}

/// Filter builder over [`StoryFlow`] rows.
#[derive(Default)]
pub struct StoryFlowQuery {
    filters: Vec<Box<dyn Fn(&StoryFlow) -> bool>>,
}

impl StoryFlowQuery {
    pub fn new() -> Self {
        StoryFlowQuery::default()
    }

    pub fn in_branch(mut self, story_id: StoryId, branch_id: BranchId) -> Self {
        self.filters
            .push(Box::new(move |f| f.story_id == story_id && f.branch_id == branch_id));
        self
    }

    pub fn active_only(mut self) -> Self {
        self.filters.push(Box::new(|f| f.is_active));
        self
    }

    pub fn sequence_at_most(mut self, max: SceneSequence) -> Self {
        self.filters.push(Box::new(move |f| f.sequence <= max));
        self
    }

    pub fn execute<'a>(&self, rows: &'a [StoryFlow]) -> Vec<&'a StoryFlow> {
        rows.iter().filter(|f| self.filters.iter().all(|pred| pred(f))).collect()
    }
}

/// Filter builder over [`StoryCharacter`] rows.
#[derive(Default)]
pub struct StoryCharacterQuery {
    filters: Vec<Box<dyn Fn(&StoryCharacter) -> bool>>,
}

impl StoryCharacterQuery {
    pub fn new() -> Self {
        StoryCharacterQuery::default()
    }

    pub fn in_branch(mut self, story_id: StoryId, branch_id: BranchId) -> Self {
        self.filters
            .push(Box::new(move |c| c.story_id == story_id && c.branch_id == branch_id));
        self
    }

    pub fn active_only(mut self) -> Self {
        self.filters.push(Box::new(|c| c.is_active));
        self
    }

    pub fn non_player(mut self) -> Self {
        self.filters.push(Box::new(|c| !c.is_player_character));
        self
    }

    pub fn execute<'a>(&self, rows: &'a [StoryCharacter]) -> Vec<&'a StoryCharacter> {
        rows.iter().filter(|c| self.filters.iter().all(|f| f(c))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_core::{CharacterId, SceneId, StoryCharacterId};

    fn scene(story: u64, branch: u64, seq: u32, deleted: bool) -> Scene {
        Scene {
            id: SceneId::new(seq as u64),
            story_id: StoryId::new(story),
            branch_id: BranchId::new(branch),
            chapter_id: weave_core::ChapterId::new(1),
            sequence: SceneSequence::new(seq),
            is_deleted: deleted,
        }
    }

    #[test]
    fn scene_query_filters_by_branch_and_sequence() {
        let rows = vec![scene(1, 1, 1, false), scene(1, 1, 2, false), scene(1, 2, 1, false)];
        let result = SceneQuery::new()
            .in_branch(StoryId::new(1), BranchId::new(1))
            .sequence_at_most(SceneSequence::new(1))
            .execute(&rows);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].sequence, SceneSequence::new(1));
    }

    #[test]
    fn scene_query_excludes_soft_deleted() {
        let rows = vec![scene(1, 1, 1, false), scene(1, 1, 2, true)];
        let result = SceneQuery::new().excluding_deleted().execute(&rows);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn story_character_query_non_player_active() {
        let mut sc = StoryCharacter::new(
            StoryCharacterId::new(1),
            StoryId::new(1),
            BranchId::new(1),
            CharacterId::new(1),
            "innkeeper",
            0.5,
        );
        sc.is_player_character = false;
        let mut pc = StoryCharacter::new(
            StoryCharacterId::new(2),
            StoryId::new(1),
            BranchId::new(1),
            CharacterId::new(2),
            "hero",
            0.5,
        );
        pc.is_player_character = true;
        let rows = vec![sc, pc];
        let result = StoryCharacterQuery::new()
            .in_branch(StoryId::new(1), BranchId::new(1))
            .non_player()
            .execute(&rows);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].role.as_str(), "innkeeper");
    }
}
