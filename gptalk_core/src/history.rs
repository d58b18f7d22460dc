//! Conversation history storage.
//!
//! The stored log is authoritative: request assembly trims a borrowed copy
//! and never writes back here.

use crate::{HistoryError, Role, Turn};

/// Ordered log of prior user/assistant turns, oldest first.
///
/// Never holds a `system` turn; the system prompt is injected per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Record one completed exchange: the user turn, then the assistant turn.
    pub fn append(&mut self, user_text: impl Into<String>, assistant_text: impl Into<String>) {
        self.turns.reserve(2);
        self.turns.push(Turn::user(user_text));
        self.turns.push(Turn::assistant(assistant_text));
    }

    /// Replace the whole log. Fails without touching the log if any turn is
    /// a system turn.
    pub fn replace(&mut self, turns: Vec<Turn>) -> Result<(), HistoryError> {
        if let Some(index) = turns.iter().position(|t| t.role() == Role::System) {
            return Err(HistoryError::SystemTurn { index });
        }
        self.turns = turns;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            total_turns: self.turns.len(),
            user_turns: self.count_role(Role::User),
            assistant_turns: self.count_role(Role::Assistant),
            total_characters: self.turns.iter().map(|t| t.content().chars().count()).sum(),
        }
    }

    fn count_role(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role() == role).count()
    }
}

/// Statistics about a conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStats {
    pub total_turns: usize,
    pub user_turns: usize,
    pub assistant_turns: usize,
    pub total_characters: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_adds_user_then_assistant() {
        let mut history = ConversationHistory::new();
        history.append("first question", "first answer");
        let before = history.snapshot();

        history.append("hello", "hi there");

        let after = history.snapshot();
        assert_eq!(after.len(), before.len() + 2);
        assert_eq!(&after[..before.len()], before.as_slice());
        assert_eq!(after[before.len()], Turn::user("hello"));
        assert_eq!(after[before.len() + 1], Turn::assistant("hi there"));
    }

    #[test]
    fn replace_rejects_system_turns() {
        let mut history = ConversationHistory::new();
        history.append("keep", "me");

        let err = history
            .replace(vec![Turn::user("a"), Turn::system("nope"), Turn::assistant("b")])
            .unwrap_err();

        assert_eq!(err, HistoryError::SystemTurn { index: 1 });
        assert_eq!(history.snapshot(), vec![Turn::user("keep"), Turn::assistant("me")]);
    }

    #[test]
    fn replace_and_clear() {
        let mut history = ConversationHistory::new();
        history
            .replace(vec![Turn::user("u"), Turn::assistant("a")])
            .unwrap();
        assert_eq!(history.len(), 2);

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn snapshot_is_detached() {
        let mut history = ConversationHistory::new();
        history.append("u", "a");
        let snapshot = history.snapshot();

        history.clear();
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn stats_counts_roles() {
        let mut history = ConversationHistory::new();
        history.append("hello", "hi");
        history.append("how are you?", "fine");

        let stats = history.stats();
        assert_eq!(stats.total_turns, 4);
        assert_eq!(stats.user_turns, 2);
        assert_eq!(stats.assistant_turns, 2);
        assert_eq!(stats.total_characters, 5 + 2 + 12 + 4);
    }
}
