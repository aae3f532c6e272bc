//! Turn request construction
//!
//! Pure functions: no I/O, no store access.

use crate::llm::{RetrievalTool, TurnRequest};

/// Label placed between the pre-prompt and the user's message
pub const DEFAULT_QUERY_LABEL: &str = "Query do usuário: ";

/// Everything needed to assemble one turn
#[derive(Debug, Clone)]
pub struct TurnInputs<'a> {
    pub model: &'a str,
    pub message: &'a str,
    pub pre_prompt: Option<&'a str>,
    pub query_label: &'a str,
    pub instructions: &'a str,
    pub temperature: f64,
    /// Absent only on the initialization turn
    pub continuation_token: Option<&'a str>,
    pub retrieval: Option<RetrievalTool>,
    pub max_output_tokens: Option<u32>,
}

/// Final input text: the message alone, or `pre_prompt + "\n\n" + label + message`
/// when a non-blank pre-prompt is given.
pub fn format_input(message: &str, pre_prompt: Option<&str>, query_label: &str) -> String {
    match pre_prompt {
        Some(pre) if !pre.trim().is_empty() => format!("{pre}\n\n{query_label}{message}"),
        _ => message.to_string(),
    }
}

pub fn build_turn_request(inputs: TurnInputs<'_>) -> TurnRequest {
    TurnRequest {
        model: inputs.model.to_string(),
        input: format_input(inputs.message, inputs.pre_prompt, inputs.query_label),
        instructions: inputs.instructions.to_string(),
        temperature: inputs.temperature,
        // Continuity depends on the provider retaining every turn
        store: true,
        previous_response_id: inputs.continuation_token.map(str::to_string),
        tools: inputs.retrieval.map(|tool| vec![tool]),
        max_output_tokens: inputs.max_output_tokens,
    }
}
