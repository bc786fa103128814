/// Minimum length (in characters) of a passively learned message.
pub const DEFAULT_MIN_INGEST_LENGTH: usize = 12;

/// Maximum length (in characters) of a passively learned message.
pub const DEFAULT_MAX_INGEST_LENGTH: usize = 1000;

/// Decides whether a passively observed message may join the corpus.
///
/// A message is rejected when:
/// - its character count is outside `min_len..=max_len`
/// - it contains `http` in any case (links are not worth learning)
/// - it starts with the command prefix in any case
///
/// Explicit learn requests bypass this policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IngestionPolicy {
	pub min_len: usize,
	pub max_len: usize,
}

impl Default for IngestionPolicy {
	fn default() -> Self {
		Self {
			min_len: DEFAULT_MIN_INGEST_LENGTH,
			max_len: DEFAULT_MAX_INGEST_LENGTH,
		}
	}
}

impl IngestionPolicy {
	/// Whether `text` should be learned, given the active command `prefix`.
	///
	/// An empty prefix disables the command check.
	pub fn should_ingest(&self, text: &str, prefix: &str) -> bool {
		let len = text.chars().count();
		if len < self.min_len || len > self.max_len {
			return false;
		}

		let lower = text.to_lowercase();
		if lower.contains("http") {
			return false;
		}

		prefix.is_empty() || !lower.starts_with(&prefix.to_lowercase())
	}
}
