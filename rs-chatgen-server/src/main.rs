use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, post, put, web};
use clap::Parser;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use rs_chatgen_core::Error;
use rs_chatgen_core::io::{default_data_dir, normalize_folder};
use rs_chatgen_core::learner::{LearnOutcome, Learner, MIN_LEARN_LENGTH};
use rs_chatgen_core::model::Constraints;
use rs_chatgen_core::model::constraints::{DEFAULT_MAX_LENGTH, DEFAULT_MAX_TRIES, DEFAULT_MIN_LENGTH};

/// HTTP command surface for the chat generator.
#[derive(Parser, Debug)]
#[command(name = "rs-chatgen-server", version, about)]
struct Config {
	/// Address to bind
	#[arg(long, env = "CHATGEN_HOST", default_value = "127.0.0.1")]
	host: String,

	/// Port to listen on
	#[arg(long, env = "CHATGEN_PORT", default_value_t = 5000)]
	port: u16,

	/// Application data directory ("." for the current directory)
	#[arg(long, env = "CHATGEN_DATA_DIR")]
	data_dir: Option<String>,

	/// Command prefix; observed messages starting with it are never learned
	#[arg(long, env = "CHATGEN_PREFIX", default_value = ".")]
	prefix: String,
}

impl Config {
	fn data_dir(&self) -> PathBuf {
		match &self.data_dir {
			Some(dir) => normalize_folder(dir),
			None => default_data_dir(),
		}
	}
}

/// Shared state of every worker.
struct SharedData {
	learner: Learner,
	prefix: String,
}

/// Body of `/v1/learn` and `/v1/observe`.
#[derive(Deserialize)]
struct TextBody {
	text: Option<String>,
}

/// Query parameters of `/v1/generate`.
#[derive(Deserialize)]
struct GenerateParams {
	max_tries: Option<usize>,
	min_len: Option<usize>,
	max_len: Option<usize>,
}

#[derive(Deserialize)]
struct AutoLearnQuery {
	state: Option<String>,
}

#[derive(Serialize)]
struct Info {
	corpus_size: usize,
	auto_learn: bool,
}

impl GenerateParams {
	fn constraints(&self) -> Result<Constraints, Error> {
		Constraints::with_length_bounds(
			self.max_tries.unwrap_or(DEFAULT_MAX_TRIES),
			self.min_len.unwrap_or(DEFAULT_MIN_LENGTH),
			self.max_len.unwrap_or(DEFAULT_MAX_LENGTH),
		)
	}
}

fn storage_error(e: &Error) -> HttpResponse {
	error!("{}", e);
	HttpResponse::InternalServerError().body(format!("Failed to update the corpus: {e}"))
}

fn blocking_error() -> HttpResponse {
	HttpResponse::InternalServerError().body("Worker failed")
}

/// HTTP POST endpoint `/v1/learn`
///
/// Adds the given text to the corpus and replies with the new corpus size.
#[post("/v1/learn")]
async fn post_learn(data: web::Data<SharedData>, body: web::Json<TextBody>) -> impl Responder {
	let text = body.into_inner().text.unwrap_or_default();
	let usage = format!("Usage: {}learn <text>", data.prefix);

	let shared = data.clone();
	match web::block(move || shared.learner.learn(&text)).await {
		Ok(Ok(LearnOutcome::Learned { corpus_size })) => {
			HttpResponse::Ok().body(format!("Learned (corpus size: {corpus_size})"))
		}
		Ok(Ok(LearnOutcome::Empty)) => HttpResponse::BadRequest().body(usage),
		Ok(Ok(LearnOutcome::TooShort)) => HttpResponse::UnprocessableEntity()
			.body(format!("Text too short to learn (min {MIN_LEARN_LENGTH} chars).")),
		Ok(Err(e)) => storage_error(&e),
		Err(_) => blocking_error(),
	}
}

/// HTTP POST endpoint `/v1/train`
///
/// Builds a model to check that there is enough data.
#[post("/v1/train")]
async fn post_train(data: web::Data<SharedData>) -> impl Responder {
	let shared = data.clone();
	let built = web::block(move || shared.learner.build_model().map(|_| shared.learner.corpus_size())).await;

	match built {
		Ok(Some(size)) => HttpResponse::Ok().body(format!("Model trained. Corpus size: {size}")),
		Ok(None) => HttpResponse::Conflict()
			.body(format!("Not enough data to train. Use {}learn to add samples.", data.prefix)),
		Err(_) => blocking_error(),
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Builds a fresh model and replies with a generated text.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateParams>) -> impl Responder {
	let constraints = match query.constraints() {
		Ok(c) => c,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};

	let shared = data.clone();
	match web::block(move || shared.learner.generate(&constraints)).await {
		Ok(Ok(text)) => HttpResponse::Ok().body(text),
		Ok(Err(Error::InsufficientData)) => HttpResponse::Conflict()
			.body(format!("Not enough data to generate. Add some samples first with {}learn.", data.prefix)),
		Ok(Err(e)) => HttpResponse::UnprocessableEntity().body(format!("Failed to generate text: {e}")),
		Err(_) => blocking_error(),
	}
}

/// HTTP PUT endpoint `/v1/autolearn`
///
/// Turns auto-learn on or off (`?state=on|off`).
#[put("/v1/autolearn")]
async fn put_autolearn(data: web::Data<SharedData>, query: web::Query<AutoLearnQuery>) -> impl Responder {
	let enabled = match query.state.as_deref().map(str::to_lowercase).as_deref() {
		Some("on") => true,
		Some("off") => false,
		_ => {
			return HttpResponse::BadRequest()
				.body(format!("Usage: {}autolearn <on|off> (default is off)", data.prefix));
		}
	};

	let shared = data.clone();
	match web::block(move || shared.learner.set_auto_learn(enabled)).await {
		Ok(Ok(true)) => HttpResponse::Ok().body("Auto-learn is ON"),
		Ok(Ok(false)) => HttpResponse::Ok().body("Auto-learn is OFF"),
		Ok(Err(e)) => storage_error(&e),
		Err(_) => blocking_error(),
	}
}

/// HTTP GET endpoint `/v1/autolearn`
///
/// Current auto-learn flag as a JSON boolean.
#[get("/v1/autolearn")]
async fn get_autolearn(data: web::Data<SharedData>) -> impl Responder {
	let shared = data.clone();
	match web::block(move || shared.learner.auto_learn()).await {
		Ok(enabled) => HttpResponse::Ok().json(enabled),
		Err(_) => blocking_error(),
	}
}

/// HTTP GET endpoint `/v1/info`
///
/// Corpus size and auto-learn flag.
#[get("/v1/info")]
async fn get_info(data: web::Data<SharedData>) -> impl Responder {
	let shared = data.clone();
	let info = web::block(move || {
		let record = shared.learner.store().load();
		Info { corpus_size: record.samples.len(), auto_learn: record.auto_learn }
	})
	.await;

	match info {
		Ok(info) => HttpResponse::Ok().json(info),
		Err(_) => blocking_error(),
	}
}

/// HTTP POST endpoint `/v1/observe`
///
/// A message seen in passing. Learned only when auto-learn is on and the
/// message passes the ingestion policy. Storage failures are logged and
/// never reported to the sender.
#[post("/v1/observe")]
async fn post_observe(data: web::Data<SharedData>, body: web::Json<TextBody>) -> impl Responder {
	let text = body.into_inner().text.unwrap_or_default();

	let shared = data.clone();
	let learned = match web::block(move || shared.learner.observe(&text, &shared.prefix)).await {
		Ok(Ok(learned)) => learned,
		Ok(Err(e)) => {
			warn!("Auto-learn failed: {}", e);
			false
		}
		Err(e) => {
			warn!("Auto-learn worker failed: {}", e);
			false
		}
	};

	HttpResponse::Ok().json(learned)
}

fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(post_learn)
		.service(post_train)
		.service(get_generated)
		.service(put_autolearn)
		.service(get_autolearn)
		.service(get_info)
		.service(post_observe);
}

/// Main entry point for the server.
///
/// Opens the corpus in the configured data directory, shares one `Learner`
/// between workers and starts an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = Config::parse();
	let data_dir = config.data_dir();
	info!("Using data directory {}", data_dir.display());

	let shared_data = web::Data::new(SharedData {
		learner: Learner::new(&data_dir),
		prefix: config.prefix.clone(),
	});

	info!("Listening on {}:{}", config.host, config.port);
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.configure(routes)
	})
		.bind((config.host.as_str(), config.port))?
		.run()
		.await
}
