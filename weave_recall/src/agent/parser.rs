//! Parses the main LLM's free-text ReAct turns (§4.4 "Agent loop").
//!
//! Labels are matched only at start-of-line (so a stray "Action:" inside a
//! quoted line of dialogue doesn't get mistaken for a real step), markdown
//! bold/heading decoration around the label is stripped, and `Action Input`/
//! `Final Answer` JSON payloads tolerate code fences and trailing prose via a
//! brace-balanced extraction fallback.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// One parsed turn of the agent loop.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReactStep {
    pub thought: Option<String>,
    pub action: Option<ToolCall>,
    pub final_answer: Option<FinalAnswer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub tool_name: String,
    pub action_input: Value,
}

/// The model's terminal answer: either a structured scene list or free text,
/// depending on what `try_parse_json` recovers from the raw content.
#[derive(Debug, Clone, PartialEq)]
pub enum FinalAnswer {
    Scenes(Vec<u32>),
    Text(String),
}

static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:\*{1,2}|#{1,6})?[ \t]*(Thought|Action Input|Action|Final Answer)(?:\*{1,2})?[ \t]*:[ \t]*(?:\*{1,2})?")
        .expect("static ReAct label regex is valid")
});

/// Splits raw agent output into (label, content) pairs in document order,
/// where content runs from the end of one labeled line to the start of the
/// next label (so multi-line `Action Input` blocks are captured whole).
fn split_labeled_sections(text: &str) -> Vec<(&str, &str)> {
    let matches: Vec<_> = LABEL_RE.captures_iter(text).collect();
    let mut sections = Vec::with_capacity(matches.len());
    for (i, caps) in matches.iter().enumerate() {
        let label = caps.get(1).expect("group 1 always matches").as_str();
        let whole = caps.get(0).expect("group 0 always matches");
        let content_start = whole.end();
        let content_end = matches.get(i + 1).map(|next| next.get(0).unwrap().start()).unwrap_or(text.len());
        let content = text[content_start..content_end].trim();
        sections.push((label, content));
    }
    sections
}

/// Parses one agent turn. Later duplicate labels of the same kind (a model
/// that repeats "Thought:" mid-output) overwrite earlier ones, keeping the
/// most recent statement of intent.
pub fn parse_react_output(text: &str) -> ReactStep {
    let mut step = ReactStep::default();
    let mut pending_tool_name: Option<String> = None;

    for (label, content) in split_labeled_sections(text) {
        match label {
            "Thought" => step.thought = Some(content.to_string()),
            "Action" => pending_tool_name = Some(content.trim().to_string()),
            "Action Input" => {
                if let Some(tool_name) = pending_tool_name.take() {
                    let action_input = try_parse_json(content).unwrap_or(Value::String(content.to_string()));
                    step.action = Some(ToolCall { tool_name, action_input });
                }
            }
            "Final Answer" => step.final_answer = Some(parse_final_answer(content)),
            _ => {}
        }
    }
    step
}

fn parse_final_answer(raw: &str) -> FinalAnswer {
    if let Some(json) = try_parse_json(raw) {
        if let Some(scenes) = json.get("relevant_scenes").and_then(Value::as_array) {
            return FinalAnswer::Scenes(scenes.iter().filter_map(Value::as_u64).map(|n| n as u32).collect());
        }
        if let Some(arr) = json.as_array() {
            return FinalAnswer::Scenes(arr.iter().filter_map(Value::as_u64).map(|n| n as u32).collect());
        }
    }
    FinalAnswer::Text(raw.trim().to_string())
}

/// Recovers a JSON value from model output that may be wrapped in markdown
/// code fences or followed by trailing prose.
pub fn try_parse_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(v) = serde_json::from_str(trimmed) {
        return Some(v);
    }
    let unfenced = strip_code_fences(trimmed);
    if let Ok(v) = serde_json::from_str(&unfenced) {
        return Some(v);
    }
    extract_balanced(&unfenced).and_then(|s| serde_json::from_str(&s).ok())
}

fn strip_code_fences(text: &str) -> String {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        s = rest;
        if let Some(newline) = s.find('\n') {
            let (first_line, tail) = s.split_at(newline);
            if first_line.chars().all(|c| c.is_alphanumeric()) {
                s = &tail[1..];
            }
        }
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim().to_string()
}

/// Finds the first `{` or `[` and returns the substring up to its matching
/// close, ignoring braces inside string literals.
fn extract_balanced(text: &str) -> Option<String> {
    let bytes: Vec<char> = text.chars().collect();
    let start = bytes.iter().position(|&c| c == '{' || c == '[')?;
    let open = bytes[start];
    let close = if open == '{' { '}' } else { ']' };
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &c) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(bytes[start..=i].iter().collect());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_thought_action_and_action_input() {
        let text = "Thought: I should look for the kitchen scene.\nAction: search_scenes\nAction Input: {\"query\": \"kitchen fight\", \"top_k\": 5}";
        let step = parse_react_output(text);
        assert_eq!(step.thought.as_deref(), Some("I should look for the kitchen scene."));
        let action = step.action.expect("action parsed");
        assert_eq!(action.tool_name, "search_scenes");
        assert_eq!(action.action_input["query"], "kitchen fight");
        assert_eq!(action.action_input["top_k"], 5);
    }

    #[test]
    fn ignores_action_label_inside_dialogue_not_at_line_start() {
        let text = "Thought: she said \"Action: run!\" and then left.\nFinal Answer: {\"relevant_scenes\": [3]}";
        let step = parse_react_output(text);
        assert!(step.action.is_none());
        assert_eq!(step.final_answer, Some(FinalAnswer::Scenes(vec![3])));
    }

    #[test]
    fn strips_markdown_decoration_around_labels() {
        let text = "**Thought:** checking nearby scenes\n**Action:** get_nearby_scenes\n**Action Input:** {\"sequence\": 4, \"radius\": 1}";
        let step = parse_react_output(text);
        assert_eq!(step.thought.as_deref(), Some("checking nearby scenes"));
        assert_eq!(step.action.unwrap().tool_name, "get_nearby_scenes");
    }

    #[test]
    fn final_answer_tolerates_code_fence_and_trailing_prose() {
        let text = "Final Answer: ```json\n{\"relevant_scenes\": [1, 2]}\n```\nThat should cover it.";
        let step = parse_react_output(text);
        assert_eq!(step.final_answer, Some(FinalAnswer::Scenes(vec![1, 2])));
    }

    #[test]
    fn final_answer_falls_back_to_plain_text() {
        let text = "Final Answer: Mira has never visited the kitchen before.";
        let step = parse_react_output(text);
        assert_eq!(step.final_answer, Some(FinalAnswer::Text("Mira has never visited the kitchen before.".to_string())));
    }

    #[test]
    fn extract_balanced_ignores_braces_inside_strings() {
        let raw = r#"leading noise {"note": "a { b } c", "value": 2} trailing"#;
        let parsed = try_parse_json(raw).expect("balanced extraction recovers the object");
        assert_eq!(parsed["value"], 2);
    }

    #[test]
    fn later_thought_overwrites_earlier_one() {
        let text = "Thought: first guess\nThought: revised guess\nFinal Answer: done";
        let step = parse_react_output(text);
        assert_eq!(step.thought.as_deref(), Some("revised guess"));
    }
}
