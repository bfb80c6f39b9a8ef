use serde::{Deserialize, Serialize};

use crate::identity::SessionId;

/// The body POSTed to the agent's chat endpoint for one user turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchRequest {
    /// The session this turn belongs to.
    pub session_id: SessionId,

    /// What the user said, already trimmed.
    pub human_say: String,

    /// Whether the client asks for an incremental response.
    pub stream: bool,
}

impl DispatchRequest {
    /// Create a new dispatch request.
    pub fn new(session_id: SessionId, human_say: impl Into<String>, stream: bool) -> Self {
        Self {
            session_id,
            human_say: human_say.into(),
            stream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shape() {
        let session_id = SessionId::create();
        let request = DispatchRequest::new(session_id, "Hi there", false);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "session_id": session_id.to_string(),
                "human_say": "Hi there",
                "stream": false,
            })
        );
    }
}
