use std::fs;

use rs_chatgen_core::Error;
use rs_chatgen_core::corpus::{CORPUS_FILE, CorpusStore, DATA_FOLDER};
use rs_chatgen_core::learner::Learner;
use rs_chatgen_core::model::Constraints;

fn learner() -> (tempfile::TempDir, Learner) {
	let dir = tempfile::tempdir().unwrap();
	let learner = Learner::new(dir.path());
	(dir, learner)
}

#[test]
fn add_sample_grows_corpus_by_one_and_appends_last() {
	let (_dir, learner) = learner();
	learner.add_sample(Some("first thing said")).unwrap();

	for text in ["hello", "hello", "a much longer sentence with several words", "é ü ß"] {
		let before = learner.corpus_size();
		assert!(learner.add_sample(Some(text)).unwrap());
		assert_eq!(learner.corpus_size(), before + 1);
		assert_eq!(learner.store().load().samples.last().map(String::as_str), Some(text));
	}
}

#[test]
fn empty_or_missing_sample_is_refused() {
	let (_dir, learner) = learner();
	learner.add_sample(Some("already here")).unwrap();

	assert!(!learner.add_sample(Some("")).unwrap());
	assert!(!learner.add_sample(None).unwrap());
	assert_eq!(learner.corpus_size(), 1);
}

#[test]
fn build_model_needs_data() {
	let (_dir, learner) = learner();
	assert!(learner.build_model().is_none());

	learner.add_sample(Some("x")).unwrap();
	assert!(learner.build_model().is_some());
}

#[test]
fn blank_corpus_still_builds_a_model() {
	let (_dir, learner) = learner();
	assert!(learner.add_sample(Some("       ")).unwrap());
	assert_eq!(learner.corpus_size(), 1);

	let model = learner.build_model().expect("a non-empty corpus builds a model");
	let err = learner.generate_text(&model, &Constraints::default()).unwrap_err();
	assert!(matches!(err, Error::GenerationExhausted { tries: 100 }));
}

#[test]
fn auto_learn_persists_across_instances() {
	let (dir, learner) = learner();
	assert!(learner.set_auto_learn(true).unwrap());
	assert!(learner.auto_learn());

	let reopened = Learner::new(dir.path());
	assert!(reopened.store().load().auto_learn);
}

#[test]
fn reads_are_idempotent() {
	let (_dir, learner) = learner();
	learner.add_sample(Some("some sample text")).unwrap();
	learner.set_auto_learn(true).unwrap();

	for _ in 0..5 {
		assert_eq!(learner.corpus_size(), 1);
		assert!(learner.auto_learn());
	}
}

#[test]
fn ingestion_policy_examples() {
	let (_dir, learner) = learner();
	assert!(!learner.evaluate_ingestion("short", "."));
	assert!(learner.evaluate_ingestion("a perfectly fine passive message here", "."));
	assert!(!learner.evaluate_ingestion(".learn something", "."));
	assert!(!learner.evaluate_ingestion("check http://x.com", "."));
}

#[test]
fn unsatisfiable_filter_exhausts() {
	let (_dir, learner) = learner();
	learner.add_sample(Some("hello there friend")).unwrap();

	let model = learner.build_model().unwrap();
	let constraints = Constraints::new(5, |s| s.chars().count() >= 10000).unwrap();

	let err = learner.generate_text(&model, &constraints).unwrap_err();
	assert!(matches!(err, Error::GenerationExhausted { tries: 5 }));
	assert!(err.to_string().contains("5 tries"));
}

#[test]
fn generate_from_learned_corpus() {
	let (_dir, learner) = learner();
	for text in [
		"the weather is lovely today in the park",
		"the park is full of people today",
		"people love the weather in spring",
	] {
		learner.add_sample(Some(text)).unwrap();
	}

	let text = learner.generate(&Constraints::default()).unwrap();
	assert!((10..=1000).contains(&text.chars().count()));
}

#[test]
fn built_model_ignores_later_samples() {
	let (_dir, learner) = learner();
	learner.add_sample(Some("only this sentence exists")).unwrap();
	let model = learner.build_model().unwrap();

	learner.add_sample(Some("something entirely different appears later")).unwrap();

	let constraints = Constraints::with_length_bounds(10, 1, 1000).unwrap();
	for _ in 0..10 {
		assert_eq!(learner.generate_text(&model, &constraints).unwrap(), "only this sentence exists");
	}
}

#[test]
fn save_of_load_is_a_no_op() {
	let (_dir, learner) = learner();
	learner.add_sample(Some("round trip me")).unwrap();
	let store = learner.store();

	let record = store.load();
	store.save(&record).unwrap();
	assert_eq!(store.load(), record);
}

#[test]
fn record_lives_under_the_data_folder() {
	let dir = tempfile::tempdir().unwrap();
	let store = CorpusStore::new(dir.path());
	store.load();

	let path = dir.path().join(DATA_FOLDER).join(CORPUS_FILE);
	assert_eq!(store.path(), path);
	assert!(path.is_file());
}

#[test]
fn legacy_record_is_read() {
	let dir = tempfile::tempdir().unwrap();
	let folder = dir.path().join(DATA_FOLDER);
	fs::create_dir_all(&folder).unwrap();
	fs::write(
		folder.join(CORPUS_FILE),
		"{\n  \"corpus\": [\n    \"hi there all\",\n    \"good morning everyone\"\n  ],\n  \"autolearn\": true\n}",
	)
	.unwrap();

	let learner = Learner::new(dir.path());
	assert_eq!(learner.corpus_size(), 2);
	assert!(learner.auto_learn());
}
