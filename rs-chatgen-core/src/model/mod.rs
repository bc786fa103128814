//! Markov chain text model.
//!
//! - Order-2, word-level chains built from a corpus (`MarkovChain`)
//! - Internal state and token representation (`State`, `Token`)
//! - Generation parameters (`Constraints`)
//! - Filtered, bounded generation (`Generator`)

/// Filtered generation with a bounded retry budget.
pub mod generator;

/// Word-level Markov chain of order 2.
///
/// Built from a corpus snapshot, sequentially or on worker threads for
/// large corpora.
pub mod markov_chain;

/// Generation parameters: retry budget, walk cap and candidate filter.
pub mod constraints;

/// Internal representation of a chain state (window of preceding tokens).
///
/// Tracks outgoing transitions and supports weighted random sampling.
/// This module is not exposed publicly.
mod state;

pub use constraints::Constraints;
pub use generator::Generator;
pub use markov_chain::MarkovChain;
