use std::path::Path;

use log::debug;

use crate::corpus::CorpusStore;
use crate::error::{Error, Result};
use crate::ingestion::IngestionPolicy;
use crate::io;
use crate::model::{Constraints, Generator, MarkovChain};

/// Minimum length (in characters) of an explicitly learned text.
pub const MIN_LEARN_LENGTH: usize = 6;

/// Result of an explicit learn request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LearnOutcome {
	/// The text was added; the corpus now holds `corpus_size` samples.
	Learned { corpus_size: usize },
	/// No text was given.
	Empty,
	/// The text is shorter than [`MIN_LEARN_LENGTH`].
	TooShort,
}

/// Entry point for command frontends.
///
/// Bundles the corpus store, the model builder, the generator and the
/// ingestion policy. Every call reloads the corpus, so a `Learner` can be
/// shared freely and never serves stale data.
#[derive(Debug)]
pub struct Learner {
	store: CorpusStore,
	policy: IngestionPolicy,
}

impl Learner {
	/// Creates a learner storing its corpus under `data_dir`.
	pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
		Self {
			store: CorpusStore::new(data_dir),
			policy: IngestionPolicy::default(),
		}
	}

	/// Creates a learner in the platform data directory (see [`io::default_data_dir`]).
	pub fn open_default() -> Self {
		Self::new(io::default_data_dir())
	}

	/// Replaces the ingestion policy.
	pub fn with_policy(mut self, policy: IngestionPolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn store(&self) -> &CorpusStore {
		&self.store
	}

	/// Adds a sample. Absent or empty text is refused with `Ok(false)`.
	pub fn add_sample(&self, text: Option<&str>) -> Result<bool> {
		match text {
			Some(text) => self.store.add_sample(text),
			None => Ok(false),
		}
	}

	/// Explicit learn request, with the [`MIN_LEARN_LENGTH`] check.
	pub fn learn(&self, text: &str) -> Result<LearnOutcome> {
		if text.is_empty() {
			return Ok(LearnOutcome::Empty);
		}
		if text.chars().count() < MIN_LEARN_LENGTH {
			return Ok(LearnOutcome::TooShort);
		}
		self.store.add_sample(text)?;
		Ok(LearnOutcome::Learned { corpus_size: self.corpus_size() })
	}

	/// Passively observed message.
	///
	/// Learned only when auto-learn is on and the ingestion policy accepts
	/// it. Returns whether the text was added.
	pub fn observe(&self, text: &str, prefix: &str) -> Result<bool> {
		if !self.auto_learn() {
			return Ok(false);
		}
		if !self.evaluate_ingestion(text, prefix) {
			debug!("Observed message rejected by the ingestion policy");
			return Ok(false);
		}
		self.store.add_sample(text)
	}

	pub fn corpus_size(&self) -> usize {
		self.store.corpus_size()
	}

	/// Builds a fresh model from the current corpus.
	///
	/// Returns `None` if there is not enough data.
	pub fn build_model(&self) -> Option<MarkovChain> {
		MarkovChain::build(&self.store.load().samples)
	}

	/// Generates a text from an already built model.
	///
	/// # Errors
	/// Returns [`Error::GenerationExhausted`] if no candidate passes the filter.
	pub fn generate_text(&self, model: &MarkovChain, constraints: &Constraints) -> Result<String> {
		Generator::new(model).generate(constraints)
	}

	/// Builds a model and generates from it.
	///
	/// # Errors
	/// - [`Error::InsufficientData`] if the corpus is empty
	/// - [`Error::GenerationExhausted`] if no candidate passes the filter
	pub fn generate(&self, constraints: &Constraints) -> Result<String> {
		let model = self.build_model().ok_or(Error::InsufficientData)?;
		self.generate_text(&model, constraints)
	}

	pub fn set_auto_learn(&self, enabled: bool) -> Result<bool> {
		self.store.set_auto_learn(enabled)
	}

	pub fn auto_learn(&self) -> bool {
		self.store.auto_learn()
	}

	/// Applies the ingestion policy. Pure, nothing is stored.
	pub fn evaluate_ingestion(&self, text: &str, prefix: &str) -> bool {
		self.policy.should_ingest(text, prefix)
	}
}
