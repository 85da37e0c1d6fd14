//! Conversation transcript for a single orchestration run.
//!
//! A [`Transcript`] is append-only: turns are indexed by their position and
//! nothing removes or reorders them. It exists for the model (which receives
//! it on every turn) and for callers auditing the tool-use path; it is never
//! replayed.

use super::tools::ToolCall;
use serde::{Deserialize, Serialize};

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Caller input
    User,
    /// Model output
    Assistant,
    /// Synthetic turn carrying a tool result
    Tool,
}

impl Role {
    /// Lowercase role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content of a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TurnContent {
    /// Plain text
    Text {
        /// The text
        text: String,
    },
    /// Binary payload such as an image
    Binary {
        /// Raw bytes
        data: Vec<u8>,
        /// Mime type of the payload
        mime_type: String,
    },
}

impl TurnContent {
    /// Text content, if this is a text turn.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TurnContent::Text { text } => Some(text),
            TurnContent::Binary { .. } => None,
        }
    }

    /// One-line rendering used for intermediate steps and logs.
    pub fn summary(&self) -> String {
        match self {
            TurnContent::Text { text } => text.clone(),
            TurnContent::Binary { data, mime_type } => {
                format!("<binary {} bytes, {}>", data.len(), mime_type)
            }
        }
    }
}

/// One message exchanged in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who produced the turn
    pub role: Role,
    /// What was said
    pub content: TurnContent,
    /// Position in the transcript, starting at 0
    pub turn_index: usize,
    /// For tool turns, the call this turn answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCall>,
}

/// Ordered sequence of turns owned by one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transcript seeded with one user text turn.
    pub fn from_user(input: impl Into<String>) -> Self {
        let mut transcript = Self::new();
        transcript.push_user(input);
        transcript
    }

    fn push(&mut self, role: Role, content: TurnContent, tool_call: Option<ToolCall>) -> &ConversationTurn {
        let turn_index = self.turns.len();
        self.turns.push(ConversationTurn {
            role,
            content,
            turn_index,
            tool_call,
        });
        &self.turns[turn_index]
    }

    /// Append a user text turn.
    pub fn push_user(&mut self, text: impl Into<String>) -> &ConversationTurn {
        self.push(Role::User, TurnContent::Text { text: text.into() }, None)
    }

    /// Append a user binary turn (an uploaded image, for instance).
    pub fn push_user_binary(&mut self, data: Vec<u8>, mime_type: impl Into<String>) -> &ConversationTurn {
        self.push(
            Role::User,
            TurnContent::Binary {
                data,
                mime_type: mime_type.into(),
            },
            None,
        )
    }

    /// Append an assistant text turn.
    pub fn push_assistant(&mut self, text: impl Into<String>) -> &ConversationTurn {
        self.push(Role::Assistant, TurnContent::Text { text: text.into() }, None)
    }

    /// Append an assistant binary turn.
    pub fn push_assistant_binary(&mut self, data: Vec<u8>, mime_type: impl Into<String>) -> &ConversationTurn {
        self.push(
            Role::Assistant,
            TurnContent::Binary {
                data,
                mime_type: mime_type.into(),
            },
            None,
        )
    }

    /// Append a synthetic tool turn answering `call`.
    pub fn push_tool(&mut self, call: ToolCall, rendered_result: impl Into<String>) -> &ConversationTurn {
        self.push(
            Role::Tool,
            TurnContent::Text {
                text: rendered_result.into(),
            },
            Some(call),
        )
    }

    /// All turns in order.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Iterate over turns in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ConversationTurn> {
        self.turns.iter()
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the transcript has no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Last turn, if any.
    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    /// Number of turns produced in response to a model invocation
    /// (assistant answers and the tool turns the model requested).
    pub fn model_turns(&self) -> usize {
        self.turns.iter().filter(|t| t.role != Role::User).count()
    }

    /// Number of tool turns.
    pub fn tool_turns(&self) -> usize {
        self.turns.iter().filter(|t| t.role == Role::Tool).count()
    }

    /// Stringified intermediate steps: one entry per tool turn, pairing the
    /// call with the result the model saw.
    pub fn intermediate_steps(&self) -> Vec<String> {
        self.turns
            .iter()
            .filter(|t| t.role == Role::Tool)
            .map(|t| match &t.tool_call {
                Some(call) => format!("{} -> {}", call, t.content.summary()),
                None => t.content.summary(),
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a ConversationTurn;
    type IntoIter = std::slice::Iter<'a, ConversationTurn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_turn_indices_follow_insertion_order() {
        let mut transcript = Transcript::from_user("hello");
        transcript.push_tool(
            ToolCall::from_json("c1", "seo_analysis", json!({"url": "u"})),
            "ok",
        );
        transcript.push_assistant("done");

        let roles: Vec<Role> = transcript.iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Tool, Role::Assistant]);
        for (i, turn) in transcript.iter().enumerate() {
            assert_eq!(turn.turn_index, i);
        }
        assert_eq!(transcript.model_turns(), 2);
        assert_eq!(transcript.tool_turns(), 1);
    }

    #[test]
    fn test_intermediate_steps_pair_call_and_result() {
        let mut transcript = Transcript::from_user("analyze");
        transcript.push_tool(
            ToolCall::from_json("c1", "seo_analysis", json!({"url": "http://x/img.jpg"})),
            r#"{"title":"Red Shoe"}"#,
        );
        let steps = transcript.intermediate_steps();
        assert_eq!(steps.len(), 1);
        assert!(steps[0].contains("seo_analysis"));
        assert!(steps[0].contains("Red Shoe"));
    }

    #[test]
    fn test_binary_summary() {
        let mut transcript = Transcript::new();
        transcript.push_user_binary(vec![0u8; 16], "image/png");
        assert_eq!(
            transcript.turns()[0].content.summary(),
            "<binary 16 bytes, image/png>"
        );
        assert!(transcript.turns()[0].content.as_text().is_none());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Tool).unwrap(), "\"tool\"");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }
}
