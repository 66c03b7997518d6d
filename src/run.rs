//! Run modes that talk to the model: logger init, generate, revise.

use std::error::Error;
use std::io::{self, Write};

use tokio_util::sync::CancellationToken;

use crate::cli::Args;
use crate::core;
use crate::core::config::Config;
use crate::core::formality;
use crate::core::llm::OpenRouterGenerator;

/// Initialize env_logger on stderr so stdout stays clean for proof text.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .target(env_logger::Target::Stderr)
        .try_init();
}

/// Options shared by `generate` and `revise`.
pub struct GenerateArgs<'a> {
    pub theorem: &'a str,
    pub formality: &'a str,
    pub model: Option<&'a str>,
    pub no_stream: bool,
}

/// Generate a fresh proof and store it as the newest version.
pub async fn run_generate(args: GenerateArgs<'_>) -> Result<(), Box<dyn Error>> {
    let key = core::cli::resolve_key(args.theorem, args.formality)?;
    let level = formality::find(&key.formality)?;
    let config = core::config::load()?;
    let mut cache = core::cli::open_cache()?;

    let messages = core::prompt::generation_messages(&key.theorem, level);
    let generator = build_generator(&config, &args);
    let outcome = cache.generate(&generator, &key, &messages).await?;
    finish(&args, &outcome.version.content);
    core::cli::report_saved(&key, &outcome);
    Ok(())
}

/// Rewrite the stored proof following `request` and store the result.
pub async fn run_revise(args: GenerateArgs<'_>, request: &str) -> Result<(), Box<dyn Error>> {
    let request = request.trim();
    if request.is_empty() {
        return Err("Revision request cannot be empty".into());
    }
    let key = core::cli::resolve_key(args.theorem, args.formality)?;
    let level = formality::find(&key.formality)?;
    let config = core::config::load()?;
    let mut cache = core::cli::open_cache()?;

    let current = cache
        .current(&key)?
        .map(|v| v.content.clone())
        .ok_or_else(|| format!("No proof stored for {}; run `generate` first", key))?;
    let messages = core::prompt::revision_messages(&key.theorem, level, &current, request);
    let generator = build_generator(&config, &args);
    let outcome = cache.generate(&generator, &key, &messages).await?;
    finish(&args, &outcome.version.content);
    core::cli::report_saved(&key, &outcome);
    Ok(())
}

/// Generator for `args`: streams chunks to stdout unless `--no-stream`, and
/// cancels on Ctrl-C.
fn build_generator(config: &Config, args: &GenerateArgs<'_>) -> OpenRouterGenerator {
    let model = args.model.unwrap_or(&config.model_id);
    let cancel_token = CancellationToken::new();
    let ctrl_c_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let generator = OpenRouterGenerator::new(config, model).cancel_token(cancel_token);
    if args.no_stream {
        return generator;
    }
    generator.on_content_chunk(Box::new(|s| {
        let _ = io::stdout().write_all(s.as_bytes());
        let _ = io::stdout().flush();
    }))
}

/// In streaming mode the raw reply was already printed; end the line. Otherwise
/// print the stored (normalized) proof.
fn finish(args: &GenerateArgs<'_>, stored: &str) {
    if args.no_stream {
        println!("{}", stored);
    } else {
        println!();
    }
}
