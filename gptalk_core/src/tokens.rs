//! Token accounting for assembled requests.

use std::sync::{Arc, OnceLock};

use tiktoken_rs::CoreBPE;
use tracing::warn;

use crate::Turn;

/// Opaque tokenizer: maps text to a token count.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> usize + Send + Sync,
{
    fn count(&self, text: &str) -> usize {
        self(text)
    }
}

/// `None` when the BPE tables could not be loaded.
static CL100K_BASE: OnceLock<Option<CoreBPE>> = OnceLock::new();

fn cl100k_base() -> Option<&'static CoreBPE> {
    CL100K_BASE
        .get_or_init(|| match tiktoken_rs::cl100k_base() {
            Ok(bpe) => Some(bpe),
            Err(e) => {
                warn!("Failed to load cl100k_base, falling back to estimated counts: {e}");
                None
            }
        })
        .as_ref()
}

/// GPT-4 / GPT-3.5 tokenizer (`cl100k_base`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Cl100kCounter;

impl TokenCounter for Cl100kCounter {
    fn count(&self, text: &str) -> usize {
        cl100k_base().map_or_else(
            || text.len().div_ceil(4),
            |bpe| bpe.encode_with_special_tokens(text).len(),
        )
    }
}

/// Computes the token cost of a candidate message sequence.
#[derive(Clone)]
pub struct TokenBudgetEstimator {
    counter: Arc<dyn TokenCounter>,
}

impl TokenBudgetEstimator {
    #[must_use]
    pub fn new(counter: Arc<dyn TokenCounter>) -> Self {
        Self { counter }
    }

    /// Cost of `turns`: the contents are concatenated in order (role labels
    /// excluded) and tokenized once.
    pub fn cost<'a, I>(&self, turns: I) -> usize
    where
        I: IntoIterator<Item = &'a Turn>,
    {
        let text: String = turns.into_iter().map(Turn::content).collect();
        self.counter.count(&text)
    }
}

impl Default for TokenBudgetEstimator {
    fn default() -> Self {
        Self::new(Arc::new(Cl100kCounter))
    }
}

impl std::fmt::Debug for TokenBudgetEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBudgetEstimator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_estimator() -> TokenBudgetEstimator {
        TokenBudgetEstimator::new(Arc::new(|text: &str| text.chars().count()))
    }

    #[test]
    fn cost_ignores_role_labels() {
        let estimator = char_estimator();
        let turns = [Turn::system("ab"), Turn::user("cde"), Turn::assistant("f")];
        assert_eq!(estimator.cost(&turns), 6);
    }

    #[test]
    fn cost_of_nothing_is_zero() {
        let estimator = char_estimator();
        assert_eq!(estimator.cost(std::iter::empty()), 0);
    }

    #[test]
    fn appending_never_decreases_cost() {
        let estimator = TokenBudgetEstimator::default();
        let mut turns = vec![Turn::system("You're a helpful assistant")];
        let mut previous = estimator.cost(&turns);

        for text in ["Hello there", "General Kenobi!", "How are you today?"] {
            turns.push(Turn::user(text));
            let current = estimator.cost(&turns);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn cl100k_counts_plain_text() {
        let count = Cl100kCounter.count("hello world");
        assert!(count > 0);
        assert!(count <= "hello world".len());
        assert_eq!(Cl100kCounter.count(""), 0);
    }
}
