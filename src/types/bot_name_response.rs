use serde::{Deserialize, Serialize};

/// The body returned by the agent's bot-name endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BotNameResponse {
    /// The agent's display name.
    pub name: String,

    /// The language model serving the agent, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl BotNameResponse {
    /// Create a new bot-name response.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: None,
        }
    }

    /// Set the reported model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}
