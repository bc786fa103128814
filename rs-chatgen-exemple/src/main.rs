use rs_chatgen_core::Error;
use rs_chatgen_core::ingestion::IngestionPolicy;
use rs_chatgen_core::learner::{LearnOutcome, Learner};
use rs_chatgen_core::model::{Constraints, Generator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // The corpus is stored in "./data/mydata/ml_corpus.json"
    // The file is created on first access if missing
    let learner = Learner::new("./data");

    // Explicit learning: anything of at least 6 characters is accepted
    for text in [
        "the sun is shining over the old harbour",
        "the old harbour is quiet in the morning",
        "in the morning the fishermen mend their nets",
        "their nets are drying under the sun",
    ] {
        match learner.learn(text)? {
            LearnOutcome::Learned { corpus_size } => println!("Learned (corpus size: {})", corpus_size),
            LearnOutcome::TooShort => println!("Too short to learn: {}", text),
            LearnOutcome::Empty => println!("Nothing to learn"),
        }
    }

    // Too short, refused
    println!("Learning \"hey\": {:?}", learner.learn("hey")?);

    // Passive learning only happens when auto-learn is ON
    // and the message passes the ingestion policy
    learner.set_auto_learn(true)?;
    let prefix = ".";
    for message in [
        "a quiet afternoon by the harbour again",
        ".gen please",
        "look at this http://example.com",
        "too short",
    ] {
        let learned = learner.observe(message, prefix)?;
        println!("Observed {:?}: learned = {}", message, learned);
    }
    learner.set_auto_learn(false)?;

    // The policy can be evaluated without storing anything
    let policy = IngestionPolicy::default();
    println!("Would ingest? {}", policy.should_ingest("a perfectly fine passive message here", prefix));

    // The model is rebuilt from the whole corpus on every call
    let model = match learner.build_model() {
        Some(model) => model,
        None => return Err(Error::InsufficientData.into()),
    };
    println!("Model has {} states", model.len());

    // Default constraints: 100 tries, between 10 and 1000 characters
    let constraints = Constraints::default();
    for i in 0..5 {
        println!("Generated sentence {}: {}", i + 1, learner.generate_text(&model, &constraints)?);
    }

    // Custom filter, here an impossible one
    let impossible = Constraints::new(5, |s| s.chars().count() >= 10000)?;
    match Generator::new(&model).generate(&impossible) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{}", e),
    }

    println!("Corpus size: {}, auto-learn: {}", learner.corpus_size(), learner.auto_learn());

    Ok(())
}
