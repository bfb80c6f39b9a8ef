use serde::{Deserialize, Serialize};

/// The agent's complete, non-streaming answer to one user turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchResponse {
    /// The agent's display name.  Authoritative; it may change between turns.
    pub bot_name: String,

    /// The stage the agent believes the conversation is in.
    pub conversational_stage: String,

    /// The agent's reply text.
    pub response: String,

    /// The capability invoked while answering, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    /// The input handed to the tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_input: Option<String>,

    /// What the action produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_output: Option<String>,

    /// The action input the agent reasoned about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_input: Option<String>,

    /// The language model serving the agent, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl DispatchResponse {
    /// Create a response without any tool usage.
    pub fn new(
        bot_name: impl Into<String>,
        conversational_stage: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            bot_name: bot_name.into(),
            conversational_stage: conversational_stage.into(),
            response: response.into(),
            tool: None,
            tool_input: None,
            action_output: None,
            action_input: None,
            model_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_may_be_missing() {
        let response: DispatchResponse = serde_json::from_str(
            r#"{"bot_name":"Max","conversational_stage":"Introduction","response":"Hello! How can I help?"}"#,
        )
        .unwrap();
        assert_eq!(
            response,
            DispatchResponse::new("Max", "Introduction", "Hello! How can I help?")
        );
    }

    #[test]
    fn missing_reply_is_rejected() {
        let parsed = serde_json::from_str::<DispatchResponse>(
            r#"["BOT", "In case you'll have any questions - just text me one more time!"]"#,
        );
        assert!(parsed.is_err());
        let parsed =
            serde_json::from_str::<DispatchResponse>(r#"{"bot_name":"Max","response":"hi"}"#);
        assert!(parsed.is_err());
    }
}
