//! Random and search commands over the current catalog.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use cinerank_core::catalog::CatalogItem;
use cinerank_core::query::{pick_random, text_search};
use cinerank_core::{Config, SnapshotStore};

/// Results printed before the remainder is summarized.
const SEARCH_PREVIEW: usize = 10;

/// Arguments for the search command.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Text matched against title, director, country and year.
    pub query: String,
}

fn load_items(config: &Config) -> Option<Vec<Arc<CatalogItem>>> {
    SnapshotStore::new(&config.data.dir)
        .load_latest()
        .filter(|items| !items.is_empty())
        .map(|items| items.into_iter().map(Arc::new).collect())
}

pub fn random(config: &Config) -> Result<()> {
    let Some(items) = load_items(config) else {
        println!("No movie data found. Please run 'cinerank import' first.");
        return Ok(());
    };

    let item = pick_random(&items, &mut rand::thread_rng())?;
    println!("Random movie: #{} {}", item.rank, item.title);
    Ok(())
}

pub fn search(args: &SearchArgs, config: &Config) -> Result<()> {
    let items = load_items(config).unwrap_or_default();
    let found = text_search(items, &args.query)?;
    print!("{}", render_results(&args.query, &found));
    Ok(())
}

fn render_results(query: &str, found: &[Arc<CatalogItem>]) -> String {
    if found.is_empty() {
        return "No movies found.\n".to_string();
    }

    let mut out = format!("Found {} movies matching '{}':\n", found.len(), query);
    for item in found.iter().take(SEARCH_PREVIEW) {
        out.push_str(&format!("  #{} {}\n", item.rank, item.title));
    }
    if found.len() > SEARCH_PREVIEW {
        out.push_str(&format!("  ... and {} more\n", found.len() - SEARCH_PREVIEW));
    }
    out
}
