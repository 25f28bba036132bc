// tests/pipeline_no_content.rs
// Empty-input scenario: zero items from all feeds terminates the run with
// NoContent and leaves the persisted feed byte-for-byte unchanged.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::fs;
use std::path::Path;

use research_digest::audio::tts::SpeechSynthesizer;
use research_digest::config::{ChannelConfig, PodcastConfig};
use research_digest::feed::document::{FeedDocument, FeedEntry};
use research_digest::fetch::types::{ResearchItem, SearchProvider};
use research_digest::pipeline;
use research_digest::script::model::ScriptModel;
use research_digest::PipelineError;

struct EmptyFeed;

#[async_trait]
impl SearchProvider for EmptyFeed {
    async fn fetch_latest(&self) -> Result<Vec<ResearchItem>> {
        Ok(Vec::new())
    }
    fn name(&self) -> &'static str {
        "empty"
    }
}

struct DownFeed;

#[async_trait]
impl SearchProvider for DownFeed {
    async fn fetch_latest(&self) -> Result<Vec<ResearchItem>> {
        anyhow::bail!("connect timeout")
    }
    fn name(&self) -> &'static str {
        "down"
    }
}

/// Panics if any later stage runs after a NoContent fetch.
struct UnreachableModel;

#[async_trait]
impl ScriptModel for UnreachableModel {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        panic!("script model must not be called")
    }
    fn name(&self) -> &'static str {
        "unreachable"
    }
}

struct UnreachableTts;

#[async_trait]
impl SpeechSynthesizer for UnreachableTts {
    async fn synthesize(&self, _voice_id: &str, _text: &str) -> Result<Vec<u8>> {
        panic!("tts must not be called")
    }
    fn name(&self) -> &'static str {
        "unreachable"
    }
}

fn config_in(dir: &Path) -> PodcastConfig {
    let mut cfg = PodcastConfig::default();
    cfg.storage.feed_path = dir.join("feed.xml").to_string_lossy().into_owned();
    cfg.storage.episodes_dir = dir.join("episodes").to_string_lossy().into_owned();
    cfg.storage.transcript_path = dir.join("latest_script.txt").to_string_lossy().into_owned();
    cfg
}

fn seed_feed(path: &Path) -> String {
    let mut doc = FeedDocument::new(ChannelConfig::default());
    doc.push_entry(FeedEntry {
        episode_id: "glp1-digest-20260731090000".to_string(),
        title: "The GLP-1 Research Digest - 2026-07-31".to_string(),
        description: "Prior episode".to_string(),
        pub_date: Utc.with_ymd_and_hms(2026, 7, 31, 9, 0, 0).unwrap(),
        audio_url: "https://example.test/episodes/glp1-digest-2026-07-31.mp3".to_string(),
        byte_size: 100,
        duration_seconds: 60,
    });
    doc.write_atomic(path, Utc.with_ymd_and_hms(2026, 7, 31, 9, 0, 0).unwrap())
        .unwrap();
    fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn no_content_leaves_existing_feed_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_in(dir.path());
    let before = seed_feed(Path::new(&cfg.storage.feed_path));

    let providers: Vec<Box<dyn SearchProvider>> =
        vec![Box::new(EmptyFeed), Box::new(DownFeed)];
    let err = pipeline::run(&cfg, &providers, &UnreachableModel, &UnreachableTts, Utc::now())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::NoContent));
    let after = fs::read_to_string(&cfg.storage.feed_path).unwrap();
    assert_eq!(before, after, "feed must be byte-for-byte unchanged");
    assert!(!Path::new(&cfg.storage.episodes_dir).exists());
    assert!(!Path::new(&cfg.storage.transcript_path).exists());
}

#[tokio::test]
async fn no_content_on_first_run_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_in(dir.path());

    let providers: Vec<Box<dyn SearchProvider>> = vec![Box::new(EmptyFeed)];
    let err = pipeline::run(&cfg, &providers, &UnreachableModel, &UnreachableTts, Utc::now())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::NoContent));
    assert!(!Path::new(&cfg.storage.feed_path).exists());
    assert!(!Path::new(&cfg.storage.episodes_dir).exists());
}
