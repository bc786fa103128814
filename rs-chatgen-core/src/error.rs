use thiserror::Error;

/// Errors raised by the corpus store, the model and the generator.
///
/// Read failures and malformed records never leave the store (it falls back
/// to an empty record), so callers only ever see `Io` from writes.
#[derive(Debug, Error)]
pub enum Error {
	#[error("corpus storage error: {0}")]
	Io(#[from] std::io::Error),

	#[error("malformed corpus record: {0}")]
	MalformedRecord(#[from] serde_json::Error),

	#[error("not enough data to build a model")]
	InsufficientData,

	#[error("failed to generate a sentence accepted by the filter after {tries} tries")]
	GenerationExhausted { tries: usize },

	#[error("invalid constraint: {0}")]
	InvalidConstraint(String),
}

pub type Result<T> = std::result::Result<T, Error>;
