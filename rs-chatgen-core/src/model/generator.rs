use log::debug;
use rand::Rng;

use crate::error::{Error, Result};
use crate::model::constraints::Constraints;
use crate::model::markov_chain::MarkovChain;
use crate::model::state::Token;

/// Samples text from a [`MarkovChain`].
///
/// # Responsibilities
/// - Walk the chain from a random start window until an end marker
/// - Retry until a candidate passes the filter or the budget runs out
#[derive(Debug, Clone, Copy)]
pub struct Generator<'a> {
	chain: &'a MarkovChain,
}

impl<'a> Generator<'a> {
	pub fn new(chain: &'a MarkovChain) -> Self {
		Self { chain }
	}

	/// Generates a text accepted by `constraints`, using the thread-local RNG.
	///
	/// # Errors
	/// Returns [`Error::GenerationExhausted`] if `max_tries` candidates were
	/// rejected, or if the chain has no start window at all.
	pub fn generate(&self, constraints: &Constraints) -> Result<String> {
		self.generate_with_rng(constraints, &mut rand::rng())
	}

	/// Same as [`Generator::generate`] with a caller-provided RNG.
	pub fn generate_with_rng<R: Rng + ?Sized>(&self, constraints: &Constraints, rng: &mut R) -> Result<String> {
		for attempt in 1..=constraints.max_tries() {
			let Some(candidate) = self.walk(constraints.max_steps(), rng) else {
				continue;
			};
			if constraints.accepts(&candidate) {
				debug!("Candidate accepted after {} tries", attempt);
				return Ok(candidate);
			}
		}

		debug!("No candidate accepted after {} tries", constraints.max_tries());
		Err(Error::GenerationExhausted { tries: constraints.max_tries() })
	}

	/// Produces one candidate: a random walk of at most `max_steps` words.
	///
	/// Returns `None` if the chain has no start window.
	fn walk<R: Rng + ?Sized>(&self, max_steps: usize, rng: &mut R) -> Option<String> {
		let mut window = self.chain.random_start(rng)?;
		let mut words: Vec<String> = window
			.iter()
			.filter_map(|token| match token {
				Token::Word(w) => Some(w.clone()),
				_ => None,
			})
			.collect();

		while words.len() < max_steps {
			let next = match self.chain.predict(&window, rng) {
				Some(Token::Word(w)) => w.clone(),
				_ => break,
			};
			window.rotate_left(1);
			if let Some(last) = window.last_mut() {
				*last = Token::Word(next.clone());
			}
			words.push(next);
		}

		Some(words.join(" "))
	}
}
