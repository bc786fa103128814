use std::collections::BTreeMap;

use rand::Rng;

use super::markov_chain::STATE_SIZE;

/// A token of the chain.
///
/// `Start` and `End` frame every sample so that generation knows where a
/// sentence may begin and can stop on its own.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Token {
	Start,
	Word(String),
	End,
}

/// The `STATE_SIZE` tokens preceding a transition.
pub type Window = [Token; STATE_SIZE];

/// Represents a state of the Markov chain.
///
/// A `State` corresponds to a fixed window of preceding tokens (`key`) and
/// stores every observed transition from this window to the next token.
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
///
/// Transitions are kept ordered so that sampling with a seeded generator is
/// reproducible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct State {
	key: Window,
	/// Example: { Word("there") => 4, End => 1 }
	transitions: BTreeMap<Token, usize>,
}

impl State {
	/// Creates a new empty state for the given window.
	pub fn new(key: Window) -> Self {
		Self {
			key,
			transitions: BTreeMap::new(),
		}
	}

	/// Records an occurrence of a transition toward `next`.
	pub fn add_transition(&mut self, next: Token) {
		*self.transitions.entry(next).or_insert(0) += 1;
	}

	/// Picks the next token using weighted random sampling.
	///
	/// The probability of selecting a token is proportional to its
	/// occurrence count. Returns `None` if the state has no transitions.
	pub fn predict<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Token> {
		let total: usize = self.transitions.values().sum();
		if total == 0 {
			return None;
		}

		let mut r = rng.random_range(0..total);
		for (next, occurrence) in &self.transitions {
			if r < *occurrence {
				return Some(next);
			}
			r -= occurrence;
		}

		// Unreachable while counts sum to `total`
		self.transitions.keys().next_back()
	}

	/// Merges another state with the same key into this one.
	///
	/// Transition occurrence counts are summed.
	pub fn merge(&mut self, other: State) {
		debug_assert_eq!(self.key, other.key, "merging states with different keys");

		for (next, occurrence) in other.transitions {
			*self.transitions.entry(next).or_insert(0) += occurrence;
		}
	}
}
