use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

/// Append-only conversation history owned by a single session.
///
/// Sessions are keyed by a caller-supplied identifier; two sessions never
/// share turns. History lives for the process lifetime unless explicitly
/// cleared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionContext {
    session_id: String,
    turns: Vec<ConversationTurn>,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), turns: Vec::new() }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Append one (user, assistant) turn pair.
    pub fn record_exchange(&mut self, user_text: &str, assistant_text: &str) {
        self.turns.push(ConversationTurn { role: Role::User, content: user_text.to_string() });
        self.turns
            .push(ConversationTurn { role: Role::Assistant, content: assistant_text.to_string() });
    }

    /// Reset to empty, unconditionally.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
