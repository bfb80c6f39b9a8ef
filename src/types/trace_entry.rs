use serde::{Deserialize, Serialize};

use crate::types::DispatchResponse;

/// The agent's stated reasoning for one turn.
///
/// Only `conversational_stage` is always present.  The tool and action fields
/// are present exactly when the agent invoked a capability while producing the
/// turn; renderers branch on presence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraceEntry {
    /// Where the agent believes the conversation is.
    pub conversational_stage: String,

    /// The capability the agent invoked, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    /// The input handed to the tool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_input: Option<String>,

    /// The action input the agent reasoned about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_input: Option<String>,

    /// What the action produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_output: Option<String>,
}

impl TraceEntry {
    /// Create a trace entry for a turn that used no tools.
    pub fn new(conversational_stage: impl Into<String>) -> Self {
        Self {
            conversational_stage: conversational_stage.into(),
            ..Self::default()
        }
    }

    /// Set the invoked tool.
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    /// Set the tool input.
    pub fn with_tool_input(mut self, tool_input: impl Into<String>) -> Self {
        self.tool_input = Some(tool_input.into());
        self
    }

    /// Set the action input.
    pub fn with_action_input(mut self, action_input: impl Into<String>) -> Self {
        self.action_input = Some(action_input.into());
        self
    }

    /// Set the action output.
    pub fn with_action_output(mut self, action_output: impl Into<String>) -> Self {
        self.action_output = Some(action_output.into());
        self
    }

    /// Returns true if the agent invoked a tool for this turn.
    pub fn used_tool(&self) -> bool {
        self.tool.is_some()
    }
}

impl From<&DispatchResponse> for TraceEntry {
    fn from(response: &DispatchResponse) -> Self {
        Self {
            conversational_stage: response.conversational_stage.clone(),
            tool: present(&response.tool),
            tool_input: present(&response.tool_input),
            action_input: present(&response.action_input),
            action_output: present(&response.action_output),
        }
    }
}

// The agent service reports "no tool" as an empty string.
fn present(field: &Option<String>) -> Option<String> {
    field.as_ref().filter(|s| !s.is_empty()).cloned()
}
