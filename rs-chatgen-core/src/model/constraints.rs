use std::fmt;

use crate::error::{Error, Result};

/// Default number of candidates tried before giving up.
pub const DEFAULT_MAX_TRIES: usize = 100;

/// Default minimum length (in characters) of an accepted candidate.
pub const DEFAULT_MIN_LENGTH: usize = 10;

/// Default maximum length (in characters) of an accepted candidate.
pub const DEFAULT_MAX_LENGTH: usize = 1000;

/// Default cap on the number of words emitted by a single walk.
pub const DEFAULT_MAX_STEPS: usize = 1000;

/// Predicate deciding whether a candidate is acceptable.
pub type Filter = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Parameters of a generation request.
///
/// # Responsibilities
/// - Bound the work of the generator (`max_tries` candidates of at most
///   `max_steps` words each)
/// - Hold the filter every returned text must satisfy
///
/// # Invariants
/// - `max_tries` and `max_steps` are always > 0
pub struct Constraints {
	max_tries: usize,
	max_steps: usize,
	filter: Filter,
}

impl Default for Constraints {
	/// 100 tries, candidates between 10 and 1000 characters.
	fn default() -> Self {
		Self {
			max_tries: DEFAULT_MAX_TRIES,
			max_steps: DEFAULT_MAX_STEPS,
			filter: Self::length_filter(DEFAULT_MIN_LENGTH, DEFAULT_MAX_LENGTH),
		}
	}
}

impl Constraints {
	/// Creates constraints with a custom filter.
	///
	/// # Errors
	/// Returns an error if `max_tries` is 0.
	pub fn new<F>(max_tries: usize, filter: F) -> Result<Self>
	where
		F: Fn(&str) -> bool + Send + Sync + 'static,
	{
		let mut constraints = Self::default();
		constraints.set_max_tries(max_tries)?;
		constraints.filter = Box::new(filter);
		Ok(constraints)
	}

	/// Creates constraints accepting candidates whose character count is in
	/// `min_len..=max_len`.
	///
	/// # Errors
	/// Returns an error if `max_tries` is 0 or `min_len > max_len`.
	pub fn with_length_bounds(max_tries: usize, min_len: usize, max_len: usize) -> Result<Self> {
		if min_len > max_len {
			return Err(Error::InvalidConstraint(format!(
				"min length ({}) is greater than max length ({})",
				min_len, max_len
			)));
		}
		let mut constraints = Self::default();
		constraints.set_max_tries(max_tries)?;
		constraints.filter = Self::length_filter(min_len, max_len);
		Ok(constraints)
	}

	fn length_filter(min_len: usize, max_len: usize) -> Filter {
		Box::new(move |candidate: &str| (min_len..=max_len).contains(&candidate.chars().count()))
	}

	/// Maximum number of candidates to try.
	pub fn max_tries(&self) -> usize {
		self.max_tries
	}

	/// Maximum number of words in a single candidate.
	pub fn max_steps(&self) -> usize {
		self.max_steps
	}

	/// Sets the retry budget.
	///
	/// # Errors
	/// Returns an error if `max_tries` is 0.
	pub fn set_max_tries(&mut self, max_tries: usize) -> Result<()> {
		if max_tries == 0 {
			return Err(Error::InvalidConstraint("max_tries must be > 0".to_owned()));
		}
		self.max_tries = max_tries;
		Ok(())
	}

	/// Sets the per-walk word cap.
	///
	/// # Errors
	/// Returns an error if `max_steps` is 0.
	pub fn set_max_steps(&mut self, max_steps: usize) -> Result<()> {
		if max_steps == 0 {
			return Err(Error::InvalidConstraint("max_steps must be > 0".to_owned()));
		}
		self.max_steps = max_steps;
		Ok(())
	}

	/// Replaces the filter.
	pub fn set_filter<F>(&mut self, filter: F)
	where
		F: Fn(&str) -> bool + Send + Sync + 'static,
	{
		self.filter = Box::new(filter);
	}

	/// Whether `candidate` passes the filter.
	pub fn accepts(&self, candidate: &str) -> bool {
		(self.filter)(candidate)
	}
}

impl fmt::Debug for Constraints {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Constraints")
			.field("max_tries", &self.max_tries)
			.field("max_steps", &self.max_steps)
			.finish_non_exhaustive()
	}
}
