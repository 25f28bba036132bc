// src/fetch/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// One normalized research record. Produced by the fetch stage, consumed by
/// the scripting stage, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchItem {
    pub title: String,
    pub summary: String,
    /// Canonical article URL; dedup key across feeds.
    pub source_link: String,
    pub published_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<ResearchItem>>;
    fn name(&self) -> &'static str;
}
