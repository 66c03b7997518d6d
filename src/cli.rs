//! CLI definitions: argument parsing, subcommands, and help text.

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

use crate::core::formality;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  proof-pager generate \"Infinitude of primes\"           Generate and store a proof
  proof-pager show \"Infinitude of primes\" --page 2      Print step page 2
  proof-pager show \"Infinitude of primes\" -f rigorous   Same theorem, other formality
  proof-pager revise \"Infinitude of primes\" \"shorter\"   Rewrite the stored proof
  proof-pager normalize draft.md                        Normalize $$ blocks in a file
  proof-pager segment draft.md --count                  Count step pages
  proof-pager history versions \"Infinitude of primes\"   List stored versions
  proof-pager completions bash                          Generate bash completions
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Generate, store and page through step-by-step proofs",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize $$ block math in a Markdown file (or stdin) and print the result
    Normalize {
        /// Input file; omit or use '-' to read stdin
        input: Option<String>,
    },
    /// Split a proof document (file or stdin) into step pages
    Segment {
        /// Input file; omit or use '-' to read stdin
        input: Option<String>,
        /// Print only this page (1-indexed)
        #[arg(short, long)]
        page: Option<usize>,
        /// Print only the number of pages
        #[arg(long, conflicts_with = "page")]
        count: bool,
    },
    /// Generate a proof with the model and store it as a new version
    Generate {
        /// Theorem to prove
        theorem: String,
        #[arg(short, long, default_value = formality::DEFAULT)]
        formality: String,
        /// Model ID (e.g. anthropic/claude-haiku-4.5)
        #[arg(short, long)]
        model: Option<String>,
        /// Wait for the full response instead of streaming it
        #[arg(long)]
        no_stream: bool,
    },
    /// Ask the model to rewrite the stored proof and store the result
    Revise {
        /// Theorem whose stored proof is rewritten
        theorem: String,
        /// What to change
        request: String,
        #[arg(short, long, default_value = formality::DEFAULT)]
        formality: String,
        /// Model ID (e.g. anthropic/claude-haiku-4.5)
        #[arg(short, long)]
        model: Option<String>,
        /// Wait for the full response instead of streaming it
        #[arg(long)]
        no_stream: bool,
    },
    /// Print one step page of a stored proof
    Show {
        theorem: String,
        #[arg(short, long, default_value = formality::DEFAULT)]
        formality: String,
        /// Page to print (1-indexed)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Show this version (id or unique id prefix) instead of the newest
        #[arg(long, value_name = "VERSION")]
        at: Option<String>,
        /// Print every page with separators
        #[arg(long, conflicts_with = "page")]
        all: bool,
    },
    /// Store a hand-edited proof (file or stdin) as a new version
    Edit {
        theorem: String,
        /// Input file; omit or use '-' to read stdin
        input: Option<String>,
        #[arg(short, long, default_value = formality::DEFAULT)]
        formality: String,
    },
    /// Manage stored proofs and their versions
    History {
        #[command(subcommand)]
        subcommand: HistorySubcommand,
    },
    /// List formality levels
    Formalities,
    /// Show config paths, model, and API key status
    Config,
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum HistorySubcommand {
    /// List stored proofs, most recently updated first
    List {
        /// Maximum number of proofs to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Filter by theorem or formality
        #[arg(long)]
        query: Option<String>,
    },
    /// List the versions of one proof, oldest first
    Versions {
        theorem: String,
        #[arg(short, long, default_value = formality::DEFAULT)]
        formality: String,
    },
    /// Restore an earlier version as the newest one
    Rollback {
        theorem: String,
        /// Version id or unique id prefix
        #[arg(value_name = "VERSION")]
        version_id: String,
        #[arg(short, long, default_value = formality::DEFAULT)]
        formality: String,
    },
    /// Delete a proof and all its versions
    Delete {
        theorem: String,
        #[arg(short, long, default_value = formality::DEFAULT)]
        formality: String,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}
