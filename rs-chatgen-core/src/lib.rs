//! Corpus-backed Markov text generation for chat agents.
//!
//! This crate provides everything an agent needs to learn from the messages
//! it sees and talk back later:
//! - A durable corpus store (one JSON record file plus an auto-learn flag)
//! - An order-2, word-level Markov chain rebuilt from the corpus on demand
//! - Filtered generation with a bounded retry budget
//! - An ingestion policy for passively observed messages
//!
//! Most callers only need [`learner::Learner`], which bundles all of the
//! above behind the entry points a command frontend uses.

/// Error taxonomy shared by every component.
pub mod error;

/// Durable corpus record and its store.
pub mod corpus;

/// Markov chain model, sampling constraints and generator.
pub mod model;

/// Eligibility rules for passively observed text.
pub mod ingestion;

/// High-level facade over store, model and policy.
pub mod learner;

/// I/O utilities (record file access, data directory helpers).
pub mod io;

pub use error::{Error, Result};
