//! The ReAct recall agent (§4.4): an alternative to the deterministic
//! [`crate::search`] pipeline for `recall`-intent queries, built from a
//! fixed tool set and a free-text output parser.

pub mod parser;
pub mod runner;
pub mod tools;

pub use parser::{parse_react_output, try_parse_json, FinalAnswer, ReactStep, ToolCall};
pub use runner::{AgentLlm, AgentResult, AgentRunner};
pub use tools::{
    GetNearbyScenesTool, ListChapterScenesTool, ReadScenesTool, ReadSceneTool, RecallTool,
    SceneSource, SearchEventsTool, SearchScenesTool,
};
