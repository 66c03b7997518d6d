//! # proof-pager
//!
//! Generate step-by-step proofs with an LLM, keep every version on disk, and
//! read them one step page at a time.
//!
//! ## Features
//! - `$$` block math normalization and step-anchor paging, usable on any file
//! - Versioned proof history per (theorem, formality) with rollback
//! - Streaming generation through OpenRouter with Ctrl-C cancellation

mod cli;
mod core;
mod run;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;

use cli::{Args, Commands, HistorySubcommand};
use run::GenerateArgs;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let args = Args::parse();
    run::init_logger(&args);

    // Exit with Display, not Debug, so users see a readable message.
    if let Err(e) = dispatch(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn dispatch(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        Commands::Normalize { input } => core::cli::run_normalize(input.as_deref()),
        Commands::Segment { input, page, count } => {
            core::cli::run_segment(input.as_deref(), page, count)
        }
        Commands::Generate {
            theorem,
            formality,
            model,
            no_stream,
        } => {
            run::run_generate(GenerateArgs {
                theorem: &theorem,
                formality: &formality,
                model: model.as_deref(),
                no_stream,
            })
            .await
        }
        Commands::Revise {
            theorem,
            request,
            formality,
            model,
            no_stream,
        } => {
            let args = GenerateArgs {
                theorem: &theorem,
                formality: &formality,
                model: model.as_deref(),
                no_stream,
            };
            run::run_revise(args, &request).await
        }
        Commands::Show {
            theorem,
            formality,
            page,
            at,
            all,
        } => core::cli::run_show(&theorem, &formality, page, at.as_deref(), all),
        Commands::Edit {
            theorem,
            input,
            formality,
        } => core::cli::run_edit(&theorem, &formality, input.as_deref()),
        Commands::History { subcommand } => match subcommand {
            HistorySubcommand::List { limit, query } => {
                core::cli::run_history_list(limit, query.as_deref())
            }
            HistorySubcommand::Versions { theorem, formality } => {
                core::cli::run_history_versions(&theorem, &formality)
            }
            HistorySubcommand::Rollback {
                theorem,
                version_id,
                formality,
            } => core::cli::run_history_rollback(&theorem, &formality, &version_id),
            HistorySubcommand::Delete { theorem, formality } => {
                core::cli::run_history_delete(&theorem, &formality)
            }
        },
        Commands::Formalities => core::cli::run_formalities(),
        Commands::Config => core::cli::run_config(),
        Commands::Completions { shell } => {
            let mut cmd = Args::command();
            cli::generate(shell, &mut cmd, core::app::NAME, &mut std::io::stdout());
            Ok(())
        }
    }
}
