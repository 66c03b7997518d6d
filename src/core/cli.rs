//! CLI commands that need no model: normalization, paging, editing, history.
//!
//! Page text goes to stdout; navigation hints and notices go to stderr so
//! output can be piped into a Markdown renderer.

use std::error::Error;
use std::fs;
use std::io::{self, Read};

use crate::core::app;
use crate::core::cache::{ProofCache, SaveOutcome};
use crate::core::config::{self, ConfigError};
use crate::core::formality;
use crate::core::history::{FileStore, HistoryKey, HistoryStore, VersionSource};
use crate::core::paths;
use crate::core::proof;

pub type CliResult = Result<(), Box<dyn Error>>;

/// Read a whole file, or stdin when `input` is `None` or `-`.
pub fn read_input(input: Option<&str>) -> io::Result<String> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => fs::read_to_string(path)
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", path, e))),
    }
}

/// Cache over the default file store, pruning to `PROOF_PAGER_MAX_VERSIONS`.
pub fn open_cache() -> Result<ProofCache<FileStore>, Box<dyn Error>> {
    let max_versions = config::max_versions()?;
    let store = FileStore::open_default()?;
    Ok(ProofCache::new(store, max_versions as usize))
}

/// Build a history key, rejecting blank theorems and unknown formality levels.
pub fn resolve_key(theorem: &str, formality_name: &str) -> Result<HistoryKey, Box<dyn Error>> {
    if theorem.trim().is_empty() {
        return Err("Theorem cannot be empty".into());
    }
    let level = formality::find(formality_name)?;
    Ok(HistoryKey::new(theorem, &level.name))
}

/// Print where a new version landed, plus any diagnostics.
pub fn report_saved(key: &HistoryKey, outcome: &SaveOutcome) {
    eprintln!(
        "Saved version {} of {}: {} page(s)",
        short_id(&outcome.version.id),
        key,
        outcome.pages
    );
    if outcome.unterminated_block {
        eprintln!("Warning: the proof opens a $$ block that is never closed");
    }
    if outcome.pruned > 0 {
        eprintln!("Dropped {} old version(s)", outcome.pruned);
    }
}

/// Run the `normalize` command.
pub fn run_normalize(input: Option<&str>) -> CliResult {
    let text = read_input(input)?;
    if proof::has_unterminated_block(&text) {
        eprintln!(
            "Warning: odd number of $$ delimiters ({}); the last block is left open",
            proof::delimiter_count(&text)
        );
    }
    println!("{}", proof::normalize(&text));
    Ok(())
}

/// Run the `segment` command: all pages, one page, or the page count.
pub fn run_segment(input: Option<&str>, page: Option<usize>, count: bool) -> CliResult {
    let text = read_input(input)?;
    let pages = proof::segment(&text);
    if count {
        println!("{}", pages.len());
        return Ok(());
    }
    match page {
        Some(n) => println!("{}", page_or_err(&pages, n)?),
        None => print_all_pages(&pages),
    }
    Ok(())
}

/// Run the `show` command: one page (or all) of the newest or a given version.
pub fn run_show(
    theorem: &str,
    formality_name: &str,
    page: usize,
    at: Option<&str>,
    all: bool,
) -> CliResult {
    let key = resolve_key(theorem, formality_name)?;
    let mut cache = open_cache()?;
    let pages = match at {
        Some(id) => cache
            .version_pages(&key, id)?
            .ok_or_else(|| format!("No version '{}' for {}", id, key))?,
        None => cache.pages(&key)?,
    };
    if pages.is_empty() {
        return Err(format!("No proof stored for {}; run `generate` first", key).into());
    }
    if all {
        print_all_pages(&pages);
        return Ok(());
    }
    println!("{}", page_or_err(&pages, page)?);
    eprintln!("{}", page_footer(&pages, page));
    Ok(())
}

/// Run the `edit` command: store file/stdin content as an edited version.
pub fn run_edit(theorem: &str, formality_name: &str, input: Option<&str>) -> CliResult {
    let key = resolve_key(theorem, formality_name)?;
    let text = read_input(input)?;
    let mut cache = open_cache()?;
    let outcome = cache.record(&key, &text, VersionSource::Edited)?;
    report_saved(&key, &outcome);
    Ok(())
}

/// Run the `history list` command.
pub fn run_history_list(limit: Option<usize>, query: Option<&str>) -> CliResult {
    let store = FileStore::open_default()?;
    let proofs = store.list()?;
    let matching: Vec<_> = proofs
        .iter()
        .filter(|m| m.matches(query.unwrap_or("")))
        .collect();
    if matching.is_empty() {
        println!("No stored proofs.");
        return Ok(());
    }
    let take = limit.unwrap_or(matching.len());
    for m in matching.into_iter().take(take) {
        println!(
            "{}\t{}\t{} version(s)\t{}",
            m.theorem,
            m.formality,
            m.versions,
            format_timestamp(m.updated_at)
        );
    }
    Ok(())
}

/// Run the `history versions` command. The newest version is marked with `*`.
pub fn run_history_versions(theorem: &str, formality_name: &str) -> CliResult {
    let key = resolve_key(theorem, formality_name)?;
    let mut cache = open_cache()?;
    let history = cache.history(&key)?;
    if history.is_empty() {
        println!("No versions stored for {}.", key);
        return Ok(());
    }
    let newest = history.len() - 1;
    for (i, v) in history.iter().enumerate() {
        println!(
            "{}\t{}\t{}\t{} page(s)\t{}",
            if i == newest { "*" } else { " " },
            short_id(&v.id),
            format_timestamp(v.created_at),
            proof::segment(&v.content).len(),
            v.source
        );
    }
    Ok(())
}

/// Run the `history rollback` command.
pub fn run_history_rollback(theorem: &str, formality_name: &str, version_id: &str) -> CliResult {
    let key = resolve_key(theorem, formality_name)?;
    let mut cache = open_cache()?;
    let outcome = cache.rollback(&key, version_id)?;
    report_saved(&key, &outcome);
    Ok(())
}

/// Run the `history delete` command.
pub fn run_history_delete(theorem: &str, formality_name: &str) -> CliResult {
    let key = resolve_key(theorem, formality_name)?;
    let mut cache = open_cache()?;
    cache.delete(&key)?;
    println!("Deleted {}", key);
    Ok(())
}

/// Run the `formalities` command.
pub fn run_formalities() -> CliResult {
    for f in formality::all() {
        let marker = if f.name == formality::DEFAULT {
            " (default)"
        } else {
            ""
        };
        println!("{:<12} {}{}", f.name, f.label, marker);
    }
    Ok(())
}

/// Run the `config` command: display paths, model, limits, and API key status.
pub fn run_config() -> CliResult {
    let config_dir = paths::config_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(unavailable)".to_string());
    let data_dir = paths::data_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(unavailable)".to_string());

    let api_key_status = match config::load() {
        Ok(_) => "set ✓",
        Err(ConfigError::MissingApiKey) => "not set",
        Err(e) => return Err(e.into()),
    };
    let model_source = if config::model_from_env() {
        "from OPENROUTER_MODEL"
    } else {
        "default"
    };
    let max_versions = match config::max_versions()? {
        0 => "unlimited".to_string(),
        n => n.to_string(),
    };

    println!("{} {}", app::NAME, app::VERSION);
    println!("Config:       {}", config_dir);
    println!("Proofs:       {}", data_dir);
    println!("Model:        {} ({})", config::model_id(), model_source);
    println!("Max versions: {}", max_versions);
    println!("API key:      {}", api_key_status);
    Ok(())
}

fn page_or_err(pages: &[String], number: usize) -> Result<&str, Box<dyn Error>> {
    proof::page_at(pages, number).ok_or_else(|| {
        format!(
            "Page {} out of range (the proof has {} page(s))",
            number,
            pages.len()
        )
        .into()
    })
}

fn print_all_pages(pages: &[String]) {
    for (i, page) in pages.iter().enumerate() {
        println!("{}", page_header(pages, i + 1));
        println!("{}", page.trim_end());
    }
}

/// Separator line naming the page and, when the page starts with an anchor, its step.
fn page_header(pages: &[String], number: usize) -> String {
    let step = proof::page_at(pages, number)
        .and_then(proof::step_number)
        .map(|n| format!(" (step {})", n))
        .unwrap_or_default();
    format!("--- page {}/{}{} ---", number, pages.len(), step)
}

fn page_footer(pages: &[String], number: usize) -> String {
    let mut footer = format!("Page {} of {}", number, pages.len());
    if number < pages.len() {
        footer.push_str(&format!(" (next: --page {})", number + 1));
    }
    footer
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn format_timestamp(secs: u64) -> String {
    use chrono::{TimeZone, Utc};
    let dt = Utc.timestamp_opt(secs as i64, 0).single();
    dt.map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| secs.to_string())
}
