use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::iter;
use std::sync::mpsc;
use std::thread;

use log::debug;
use rand::Rng;

use super::state::{State, Token, Window};

/// Number of preceding tokens a transition depends on.
pub const STATE_SIZE: usize = 2;

/// Corpora with at least this many samples are built on worker threads.
pub const PARALLEL_THRESHOLD: usize = 4096;

/// Chunks per CPU when building in parallel.
const CHUNK_FACTOR: usize = 8;

/// Word-level Markov chain of order [`STATE_SIZE`].
///
/// Each sample is split on whitespace and framed as
/// `[Start, Start, w1, .., wn, End]`. Every window of `STATE_SIZE` tokens is
/// a state counting the tokens that follow it. The all-`Start` window is
/// the root: its transitions are the words samples begin with.
///
/// # Invariants
/// - The chain is a pure function of the samples it was built from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkovChain {
	states: HashMap<Window, State>,
}

impl MarkovChain {
	fn empty() -> Self {
		Self { states: HashMap::new() }
	}

	/// Builds a chain from every sample of `corpus`.
	///
	/// Returns `None` only for an empty corpus. Blank samples contribute no
	/// states, so a corpus made only of blank samples gives an empty chain.
	///
	/// # Notes
	/// - Large corpora are split into chunks, learned on worker threads and
	///   merged; the result is identical to a sequential build.
	pub fn build(corpus: &[String]) -> Option<Self> {
		if corpus.is_empty() {
			return None;
		}

		let chain = if corpus.len() >= PARALLEL_THRESHOLD {
			Self::build_parallel(corpus, num_cpus::get() * CHUNK_FACTOR)
		} else {
			Self::build_sequential(corpus)
		};

		debug!("Built Markov chain from {} samples ({} states)", corpus.len(), chain.len());
		Some(chain)
	}

	fn build_sequential(corpus: &[String]) -> Self {
		let mut chain = Self::empty();
		for sample in corpus {
			chain.add_sample(sample);
		}
		chain
	}

	/// Learns `chunks` partial chains concurrently and merges them.
	///
	/// Uses an MPSC channel to collect the partial chains.
	fn build_parallel(corpus: &[String], chunks: usize) -> Self {
		let chunk_size = corpus.len().div_ceil(chunks.max(1));

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			for chunk in corpus.chunks(chunk_size) {
				let tx = tx.clone();
				scope.spawn(move || {
					// The receiver outlives the scope, sending cannot fail
					let _ = tx.send(Self::build_sequential(chunk));
				});
			}
		});
		drop(tx);

		let mut chain = Self::empty();
		for partial in rx.iter() {
			chain.merge(partial);
		}
		chain
	}

	/// Adds one sample to the chain.
	///
	/// Blank samples are ignored.
	fn add_sample(&mut self, sample: &str) {
		let mut words = sample.split_whitespace().peekable();
		if words.peek().is_none() {
			return;
		}

		let tokens: Vec<Token> = iter::repeat_n(Token::Start, STATE_SIZE)
			.chain(words.map(|w| Token::Word(w.to_owned())))
			.chain(iter::once(Token::End))
			.collect();

		for ngram in tokens.windows(STATE_SIZE + 1) {
			let key: Window = std::array::from_fn(|i| ngram[i].clone());
			let next = ngram[STATE_SIZE].clone();
			self.states
				.entry(key.clone())
				.or_insert_with(|| State::new(key))
				.add_transition(next);
		}
	}

	/// Merges another chain into this one, summing matching counts.
	fn merge(&mut self, other: Self) {
		for (key, state) in other.states {
			match self.states.entry(key) {
				Entry::Occupied(mut existing) => existing.get_mut().merge(state),
				Entry::Vacant(slot) => {
					slot.insert(state);
				}
			}
		}
	}

	/// Number of states (distinct windows).
	pub fn len(&self) -> usize {
		self.states.len()
	}

	/// Whether the chain has no states.
	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Picks a start window, weighted by how often samples begin with each word.
	///
	/// Returns `None` if the chain is empty.
	pub(crate) fn random_start<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Window> {
		let root: Window = std::array::from_fn(|_| Token::Start);
		match self.states.get(&root)?.predict(rng)? {
			Token::Word(w) => {
				let mut window = root;
				window[STATE_SIZE - 1] = Token::Word(w.clone());
				Some(window)
			}
			_ => None,
		}
	}

	/// Picks the token following `window`.
	///
	/// Returns `None` if the window is unknown.
	pub(crate) fn predict<R: Rng + ?Sized>(&self, window: &Window, rng: &mut R) -> Option<&Token> {
		self.states.get(window)?.predict(rng)
	}
}
