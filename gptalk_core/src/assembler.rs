//! Token-bounded request assembly.
//!
//! Builds `[system] ++ history ++ [user]` and evicts the oldest history
//! turns until the sequence fits the token budget.

use std::iter;

use tracing::{debug, warn};

use crate::util::DEFAULT_TOKEN_BUDGET;
use crate::{MessageContent, RequestMessage, TokenBudgetEstimator, Turn};

/// The message sequence sent for one exchange. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledRequest {
    pub system: Turn,
    pub history: Vec<Turn>,
    pub new_turn: Turn,
    dropped: usize,
}

impl AssembledRequest {
    /// All turns in send order.
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        iter::once(&self.system)
            .chain(&self.history)
            .chain(iter::once(&self.new_turn))
    }

    /// Number of history turns evicted to fit the budget.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// Wire messages with every turn as plain text.
    #[must_use]
    pub fn to_messages(&self) -> Vec<RequestMessage> {
        self.turns().map(RequestMessage::from).collect()
    }

    /// Wire messages with the new turn's content replaced by `content`
    /// (used for multi-part user input).
    #[must_use]
    pub fn to_messages_with(&self, content: MessageContent) -> Vec<RequestMessage> {
        iter::once(&self.system)
            .chain(&self.history)
            .map(RequestMessage::from)
            .chain(iter::once(RequestMessage::new(self.new_turn.role(), content)))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct MessageAssembler {
    estimator: TokenBudgetEstimator,
    budget: usize,
}

impl MessageAssembler {
    #[must_use]
    pub const fn new(estimator: TokenBudgetEstimator, budget: usize) -> Self {
        Self { estimator, budget }
    }

    #[must_use]
    pub const fn budget(&self) -> usize {
        self.budget
    }

    /// Assemble the request for `new_user_text`.
    ///
    /// Oldest history turns are dropped one at a time while the cost is
    /// strictly greater than the budget. The system prompt and the new turn
    /// are never shortened, so the result can still exceed the budget once
    /// the history is exhausted.
    #[must_use]
    pub fn assemble(
        &self,
        new_user_text: &str,
        system_text: &str,
        history: &[Turn],
    ) -> AssembledRequest {
        let system = Turn::system(system_text);
        let new_turn = Turn::user(new_user_text);

        let cost_from = |start: usize| {
            self.estimator.cost(
                iter::once(&system)
                    .chain(&history[start..])
                    .chain(iter::once(&new_turn)),
            )
        };

        let mut start = 0;
        let mut cost = cost_from(start);
        while cost > self.budget && start < history.len() {
            start += 1;
            cost = cost_from(start);
        }

        if cost > self.budget {
            warn!(
                "Request exceeds token budget even without history: {cost} > {}",
                self.budget
            );
        } else if start > 0 {
            debug!(
                "Dropped {start} oldest turns to fit token budget ({cost}/{})",
                self.budget
            );
        }

        AssembledRequest {
            system,
            history: history[start..].to_vec(),
            new_turn,
            dropped: start,
        }
    }
}

impl Default for MessageAssembler {
    fn default() -> Self {
        Self::new(TokenBudgetEstimator::default(), DEFAULT_TOKEN_BUDGET)
    }
}
