use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::io;

/// Folder, relative to the application data directory, holding the record.
pub const DATA_FOLDER: &str = "mydata";

/// File name of the corpus record.
pub const CORPUS_FILE: &str = "ml_corpus.json";

/// The persisted state: every learned sample and the auto-learn flag.
///
/// Serialized as a pretty-printed JSON object with the keys `corpus` and
/// `autolearn`. `samples` and `autoLearn` are accepted as aliases when
/// reading. Missing keys take their default, non-string samples are dropped
/// and a non-boolean flag is coerced by truthiness.
///
/// # Invariants
/// - `samples` keeps learning order; duplicates are kept
/// - Nothing removes a sample once it has been saved
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CorpusRecord {
	#[serde(rename = "corpus", alias = "samples", default, deserialize_with = "lenient_samples")]
	pub samples: Vec<String>,

	#[serde(rename = "autolearn", alias = "autoLearn", default, deserialize_with = "truthy")]
	pub auto_learn: bool,
}

impl CorpusRecord {
	/// Parses a record from its JSON text.
	///
	/// # Errors
	/// Returns an error if the text is not JSON or not a JSON object.
	pub fn from_json(raw: &str) -> Result<Self> {
		Ok(serde_json::from_str(raw)?)
	}

	/// Serializes the record as pretty-printed JSON.
	///
	/// A serialization failure is reported as [`Error::Io`], like any other
	/// failure to write the record.
	pub fn to_json(&self) -> Result<String> {
		serde_json::to_string_pretty(self).map_err(write_error)
	}
}

fn write_error(e: serde_json::Error) -> Error {
	Error::Io(std::io::Error::other(e))
}

/// Keeps the string entries of an array, anything else becomes empty.
fn lenient_samples<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<String>, D::Error> {
	let samples = match Value::deserialize(deserializer)? {
		Value::Array(values) => values
			.into_iter()
			.filter_map(|value| match value {
				Value::String(s) => Some(s),
				_ => None,
			})
			.collect(),
		_ => Vec::new(),
	};
	Ok(samples)
}

fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
	let value = match Value::deserialize(deserializer)? {
		Value::Null => false,
		Value::Bool(b) => b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
		Value::String(s) => !s.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	};
	Ok(value)
}

/// File-backed store for the [`CorpusRecord`].
///
/// Every operation reloads the record from disk, and every mutation rewrites
/// it entirely. Load-modify-save sequences of one store are serialized by an
/// internal mutex, so concurrent callers in the same process cannot lose an
/// update. Several processes sharing the same file are still last-writer-wins.
#[derive(Debug)]
pub struct CorpusStore {
	path: PathBuf,
	lock: Mutex<()>,
}

impl CorpusStore {
	/// Creates a store for the application data directory `data_dir`.
	///
	/// The record lives at `<data_dir>/mydata/ml_corpus.json`. Nothing is
	/// touched on disk until the first operation.
	pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
		Self {
			path: data_dir.as_ref().join(DATA_FOLDER).join(CORPUS_FILE),
			lock: Mutex::new(()),
		}
	}

	/// Path of the backing record file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Loads the record.
	///
	/// Never fails:
	/// - a missing file is created with defaults (a failure to create it is logged)
	/// - an unreadable or malformed file yields the defaults and is left untouched
	pub fn load(&self) -> CorpusRecord {
		let _guard = self.guard();
		self.load_unlocked()
	}

	/// Fully overwrites the backing file with `record`.
	///
	/// # Errors
	/// Returns [`Error::Io`] if the file or its directory cannot be written.
	pub fn save(&self, record: &CorpusRecord) -> Result<()> {
		let _guard = self.guard();
		self.save_unlocked(record)
	}

	/// Appends `text` to the corpus.
	///
	/// Returns `Ok(false)` without touching the file if `text` is empty.
	/// No length validation happens here.
	pub fn add_sample(&self, text: &str) -> Result<bool> {
		if text.is_empty() {
			return Ok(false);
		}

		let size = self.update(|record| {
			record.samples.push(text.to_owned());
			record.samples.len()
		})?;
		info!("Learned a new sample (corpus size: {})", size);
		Ok(true)
	}

	/// Sets the auto-learn flag and returns its new value.
	pub fn set_auto_learn(&self, enabled: bool) -> Result<bool> {
		let value = self.update(|record| {
			record.auto_learn = enabled;
			record.auto_learn
		})?;
		info!("Auto-learn is {}", if value { "ON" } else { "OFF" });
		Ok(value)
	}

	/// Current auto-learn flag.
	pub fn auto_learn(&self) -> bool {
		self.load().auto_learn
	}

	/// Number of learned samples.
	pub fn corpus_size(&self) -> usize {
		self.load().samples.len()
	}

	/// Runs one load-modify-save cycle under the store lock.
	fn update<T, F>(&self, f: F) -> Result<T>
	where
		F: FnOnce(&mut CorpusRecord) -> T,
	{
		let _guard = self.guard();
		let mut record = self.load_unlocked();
		let out = f(&mut record);
		self.save_unlocked(&record)?;
		Ok(out)
	}

	/// The mutex guards no data, so a poisoned lock is still usable.
	fn guard(&self) -> MutexGuard<'_, ()> {
		self.lock.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn load_unlocked(&self) -> CorpusRecord {
		if !self.path.exists() {
			let record = CorpusRecord::default();
			match self.save_unlocked(&record) {
				Ok(()) => debug!("Created corpus record at {}", self.path.display()),
				Err(e) => warn!("Could not create corpus record at {}: {}", self.path.display(), e),
			}
			return record;
		}

		let raw = match io::read_file(&self.path) {
			Ok(raw) => raw,
			Err(e) => {
				warn!("{}, using an empty corpus", Error::from(e));
				return CorpusRecord::default();
			}
		};

		match CorpusRecord::from_json(&raw) {
			Ok(record) => record,
			Err(e) => {
				warn!("{} ({}), using an empty corpus", e, self.path.display());
				CorpusRecord::default()
			}
		}
	}

	fn save_unlocked(&self, record: &CorpusRecord) -> Result<()> {
		let json = record.to_json()?;
		io::write_file(&self.path, json.as_bytes())?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use std::sync::Arc;
	use std::thread;

	fn store() -> (tempfile::TempDir, CorpusStore) {
		let dir = tempfile::tempdir().unwrap();
		let store = CorpusStore::new(dir.path());
		(dir, store)
	}

	#[test]
	fn test_load_creates_missing_file_with_defaults() {
		let (_dir, store) = store();
		assert!(!store.path().exists());

		let record = store.load();
		assert_eq!(record, CorpusRecord::default());
		assert!(store.path().exists());

		let raw = fs::read_to_string(store.path()).unwrap();
		assert_eq!(raw, "{\n  \"corpus\": [],\n  \"autolearn\": false\n}");
	}

	#[test]
	fn test_corrupt_file_loads_defaults_and_is_kept() {
		let (_dir, store) = store();
		fs::create_dir_all(store.path().parent().unwrap()).unwrap();
		fs::write(store.path(), "{ not json").unwrap();

		assert_eq!(store.load(), CorpusRecord::default());
		assert_eq!(store.corpus_size(), 0);
		assert!(!store.auto_learn());
		assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
	}

	#[test]
	fn test_non_object_record_loads_defaults() {
		let (_dir, store) = store();
		fs::create_dir_all(store.path().parent().unwrap()).unwrap();
		fs::write(store.path(), "[\"a\", \"b\"]").unwrap();

		assert_eq!(store.load(), CorpusRecord::default());
	}

	#[test]
	fn test_add_sample_appends_and_persists() {
		let (_dir, store) = store();
		assert!(store.add_sample("first sample").unwrap());
		assert!(store.add_sample("second sample").unwrap());
		assert!(store.add_sample("first sample").unwrap());

		let record = store.load();
		assert_eq!(record.samples, vec!["first sample", "second sample", "first sample"]);
		assert_eq!(store.corpus_size(), 3);
	}

	#[test]
	fn test_add_empty_sample_is_rejected() {
		let (_dir, store) = store();
		store.add_sample("something").unwrap();

		assert!(!store.add_sample("").unwrap());
		assert_eq!(store.corpus_size(), 1);
	}

	#[test]
	fn test_auto_learn_flag_persists() {
		let (dir, store) = store();
		assert!(!store.auto_learn());
		assert!(store.set_auto_learn(true).unwrap());
		assert!(store.auto_learn());

		let reopened = CorpusStore::new(dir.path());
		assert!(reopened.load().auto_learn);

		assert!(!reopened.set_auto_learn(false).unwrap());
		assert!(!store.auto_learn());
	}

	#[test]
	fn test_save_load_round_trip_is_stable() {
		let (_dir, store) = store();
		store.add_sample("one two three").unwrap();
		store.set_auto_learn(true).unwrap();

		let before = fs::read_to_string(store.path()).unwrap();
		let record = store.load();
		store.save(&record).unwrap();

		assert_eq!(store.load(), record);
		assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
	}

	#[test]
	fn test_record_accepts_aliases_and_coerces_shapes() {
		let record = CorpusRecord::from_json(r#"{"samples": ["a", 3, null, "b"], "autoLearn": 1}"#).unwrap();
		assert_eq!(record.samples, vec!["a", "b"]);
		assert!(record.auto_learn);

		let record = CorpusRecord::from_json(r#"{"corpus": "oops", "autolearn": ""}"#).unwrap();
		assert!(record.samples.is_empty());
		assert!(!record.auto_learn);

		let record = CorpusRecord::from_json(r#"{"extra": true}"#).unwrap();
		assert_eq!(record, CorpusRecord::default());
	}

	#[test]
	fn test_serialization_failure_is_a_write_error() {
		let json_error = serde_json::from_str::<CorpusRecord>("{").unwrap_err();
		let e = write_error(json_error);
		assert!(matches!(e, Error::Io(_)));
		assert!(e.to_string().starts_with("corpus storage error:"));
	}

	#[test]
	fn test_save_to_unwritable_location_fails() {
		let dir = tempfile::tempdir().unwrap();
		// A regular file where the data folder should be
		fs::write(dir.path().join(DATA_FOLDER), "blocker").unwrap();
		let store = CorpusStore::new(dir.path());

		assert!(matches!(store.save(&CorpusRecord::default()), Err(Error::Io(_))));
		assert!(matches!(store.add_sample("hello"), Err(Error::Io(_))));
		// Reads still degrade gracefully
		assert_eq!(store.corpus_size(), 0);
	}

	#[test]
	fn test_concurrent_adds_are_not_lost() {
		let (_dir, store) = store();
		let store = Arc::new(store);

		let handles: Vec<_> = (0..8)
			.map(|t| {
				let store = Arc::clone(&store);
				thread::spawn(move || {
					for i in 0..10 {
						store.add_sample(&format!("thread {} sample {}", t, i)).unwrap();
					}
				})
			})
			.collect();
		for handle in handles {
			handle.join().unwrap();
		}

		assert_eq!(store.corpus_size(), 80);
	}
}
