//! Ordered message assembly (§4.3 invariant: exactly one sequence, no message
//! omitted unless explicitly optional).
//!
//! A plain struct with one field per stage, filled in by dedicated builder
//! methods and read back through a `build()` accessor: each "stage" here
//! appends exactly one message slot rather than narrowing a candidate set,
//! but the intermediate state stays just as inspectable along the way.

use weave_core::errors::CoreError;

/// Chat role of one assembled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One `{role, content}` message destined for the main LLM.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message { role: Role::User, content: content.into() }
    }
}

/// Errors the builder raises if asked to produce a prompt missing a
/// non-optional slot (§4.3: "no message omitted unless explicitly optional").
#[derive(Debug)]
pub enum PipelineError {
    MissingSlot(&'static str),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::MissingSlot(name) => write!(f, "missing required message slot: {name}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<PipelineError> for CoreError {
    fn from(e: PipelineError) -> Self {
        CoreError::InvalidInput(e.to_string())
    }
}

/// The ten ordered message slots of §4.3, numbered as in the spec. Messages
/// 1-6 form the cache-stable prefix; 7 and 9 are optional; 8 and 10 change
/// every turn.
#[derive(Debug, Clone, Default)]
pub struct AssembledPrompt {
    system_prompt: Option<Message>,         // 1
    scenario: Option<Message>,               // 2
    roster: Option<Message>,                 // 3
    dialogue_styles: Option<Message>,        // 4
    relationships: Option<Message>,          // 5
    rules: Option<Message>,                  // 6 -- cache break point after this
    summary: Option<Message>,                // 7, optional
    recent_turns: Option<Message>,           // 8
    relevant_past_turns: Option<Message>,    // 9, optional
    task_message: Option<Message>,           // 10
}

impl AssembledPrompt {
    /// Messages 1-6: the portion required to be byte-identical between two
    /// consecutive turns absent a character/relationship edit (§8 invariant).
    pub fn stable_prefix(&self) -> Vec<&Message> {
        [
            &self.system_prompt,
            &self.scenario,
            &self.roster,
            &self.dialogue_styles,
            &self.relationships,
            &self.rules,
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Flattens every present slot into the final ordered message list.
    pub fn into_messages(self) -> Vec<Message> {
        [
            self.system_prompt,
            self.scenario,
            self.roster,
            self.dialogue_styles,
            self.relationships,
            self.rules,
            self.summary,
            self.recent_turns,
            self.relevant_past_turns,
            self.task_message,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Builds an [`AssembledPrompt`] one ordered stage at a time. Each `add_*`
/// method fills exactly one slot; `build` validates that every non-optional
/// slot was filled before returning (§4.3 invariant).
#[derive(Debug, Clone, Default)]
pub struct MessageAssemblyBuilder {
    prompt: AssembledPrompt,
}

impl MessageAssemblyBuilder {
    pub fn new() -> Self {
        MessageAssemblyBuilder::default()
    }

    pub fn add_system_prompt(mut self, content: impl Into<String>) -> Self {
        self.prompt.system_prompt = Some(Message::system(content));
        self
    }

    pub fn add_scenario(mut self, content: impl Into<String>) -> Self {
        self.prompt.scenario = Some(Message::system(content));
        self
    }

    pub fn add_roster(mut self, content: impl Into<String>) -> Self {
        self.prompt.roster = Some(Message::system(content));
        self
    }

    pub fn add_dialogue_styles(mut self, content: impl Into<String>) -> Self {
        self.prompt.dialogue_styles = Some(Message::system(content));
        self
    }

    pub fn add_relationships(mut self, content: impl Into<String>) -> Self {
        self.prompt.relationships = Some(Message::system(content));
        self
    }

    pub fn add_rules(mut self, content: impl Into<String>) -> Self {
        self.prompt.rules = Some(Message::system(content));
        self
    }

    /// §4.3: present only when the turn count exceeds the summary threshold.
    pub fn add_summary(mut self, content: impl Into<String>) -> Self {
        self.prompt.summary = Some(Message::system(content));
        self
    }

    pub fn add_recent_turns(mut self, content: impl Into<String>) -> Self {
        self.prompt.recent_turns = Some(Message::user(content));
        self
    }

    /// §4.3: present only when semantic recall was triggered and survived
    /// the quality gate.
    pub fn add_relevant_past_turns(mut self, content: impl Into<String>) -> Self {
        self.prompt.relevant_past_turns = Some(Message::system(content));
        self
    }

    pub fn add_task_message(mut self, content: impl Into<String>) -> Self {
        self.prompt.task_message = Some(Message::user(content));
        self
    }

    /// Validates every non-optional slot (1-6, 8, 10) is present and returns
    /// the assembled prompt.
    pub fn build(self) -> Result<AssembledPrompt, PipelineError> {
        let p = &self.prompt;
        if p.system_prompt.is_none() {
            return Err(PipelineError::MissingSlot("system_prompt"));
        }
        if p.scenario.is_none() {
            return Err(PipelineError::MissingSlot("scenario"));
        }
        if p.roster.is_none() {
            return Err(PipelineError::MissingSlot("roster"));
        }
        if p.dialogue_styles.is_none() {
            return Err(PipelineError::MissingSlot("dialogue_styles"));
        }
        if p.relationships.is_none() {
            return Err(PipelineError::MissingSlot("relationships"));
        }
        if p.rules.is_none() {
            return Err(PipelineError::MissingSlot("rules"));
        }
        if p.recent_turns.is_none() {
            return Err(PipelineError::MissingSlot("recent_turns"));
        }
        if p.task_message.is_none() {
            return Err(PipelineError::MissingSlot("task_message"));
        }
        Ok(self.prompt)
    }
}
