// src/fetch/mod.rs
pub mod providers;
pub mod types;

use std::collections::HashSet;

use crate::error::PipelineError;
use crate::fetch::types::{ResearchItem, SearchProvider};

/// Normalize feed text: decode HTML entities, strip tags, collapse whitespace.
pub fn normalize_summary(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap: 2500 chars (abstracts can run long; the prompt is bounded)
    if out.chars().count() > 2500 {
        out = out.chars().take(2500).collect();
    }

    out
}

/// Deduplicate by source link (first occurrence wins), order most-recent
/// first (stable), cap the combined list.
pub fn dedup_sort_cap(items: Vec<ResearchItem>, max_items: usize) -> Vec<ResearchItem> {
    let mut seen_links: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        if !seen_links.insert(item.source_link.clone()) {
            continue;
        }
        unique.push(item);
    }

    unique.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    unique.truncate(max_items);
    unique
}

/// Run the fetch stage once. A single feed's failure is logged and skipped;
/// an empty union across all feeds fails the run.
pub async fn run_fetch(
    providers: &[Box<dyn SearchProvider>],
    max_items: usize,
) -> Result<Vec<ResearchItem>, PipelineError> {
    let mut raw = Vec::new();
    for p in providers {
        match p.fetch_latest().await {
            Ok(mut v) => {
                tracing::debug!(provider = p.name(), items = v.len(), "feed fetched");
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "feed fetch failed");
            }
        }
    }

    let items = dedup_sort_cap(raw, max_items);
    if items.is_empty() {
        return Err(PipelineError::NoContent);
    }
    tracing::info!(items = items.len(), "research items selected");
    Ok(items)
}
