// tests/pipeline_atomicity.rs
// Failure-atomicity: a synthesis failure partway through the transcript must
// leave the feed untouched and publish no audio file.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use research_digest::audio::tts::SpeechSynthesizer;
use research_digest::config::{ChannelConfig, PodcastConfig};
use research_digest::feed::document::{parse_entries, FeedDocument, FeedEntry};
use research_digest::fetch::types::{ResearchItem, SearchProvider};
use research_digest::pipeline::{self, Stage};
use research_digest::script::model::ScriptModel;
use research_digest::PipelineError;

struct OneItem;

#[async_trait]
impl SearchProvider for OneItem {
    async fn fetch_latest(&self) -> Result<Vec<ResearchItem>> {
        Ok(vec![ResearchItem {
            title: "Study".to_string(),
            summary: "Abstract".to_string(),
            source_link: "https://pubmed.ncbi.nlm.nih.gov/1/".to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap(),
        }])
    }
    fn name(&self) -> &'static str {
        "one-item"
    }
}

struct SixTurnModel;

#[async_trait]
impl ScriptModel for SixTurnModel {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Ok("Dan: a\nAlex: b\nDan: c\nAlex: d\nDan: e\nAlex: f\n".to_string())
    }
    fn name(&self) -> &'static str {
        "six-turns"
    }
}

/// Succeeds for the first `ok_calls` segments, then fails.
struct FlakyTts {
    ok_calls: usize,
    seen: Mutex<usize>,
}

#[async_trait]
impl SpeechSynthesizer for FlakyTts {
    async fn synthesize(&self, _voice_id: &str, _text: &str) -> Result<Vec<u8>> {
        let mut seen = self.seen.lock().unwrap();
        *seen += 1;
        if *seen > self.ok_calls {
            anyhow::bail!("voice quota exhausted")
        }
        Ok(vec![0u8; 16_000])
    }
    fn name(&self) -> &'static str {
        "flaky"
    }
}

fn config_in(dir: &Path) -> PodcastConfig {
    let mut cfg = PodcastConfig::default();
    cfg.storage.feed_path = dir.join("feed.xml").to_string_lossy().into_owned();
    cfg.storage.episodes_dir = dir.join("episodes").to_string_lossy().into_owned();
    cfg.storage.transcript_path = dir.join("latest_script.txt").to_string_lossy().into_owned();
    cfg
}

#[tokio::test]
async fn synthesis_failure_publishes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_in(dir.path());

    // one prior episode in the feed
    let mut doc = FeedDocument::new(ChannelConfig::default());
    doc.push_entry(FeedEntry {
        episode_id: "glp1-digest-20260731090000".to_string(),
        title: "Prior".to_string(),
        description: "Prior episode".to_string(),
        pub_date: Utc.with_ymd_and_hms(2026, 7, 31, 9, 0, 0).unwrap(),
        audio_url: "https://example.test/episodes/prior.mp3".to_string(),
        byte_size: 100,
        duration_seconds: 60,
    });
    let feed_path = Path::new(&cfg.storage.feed_path).to_path_buf();
    doc.write_atomic(&feed_path, Utc.with_ymd_and_hms(2026, 7, 31, 9, 0, 0).unwrap())
        .unwrap();
    let before = fs::read_to_string(&feed_path).unwrap();

    let providers: Vec<Box<dyn SearchProvider>> = vec![Box::new(OneItem)];
    let tts = FlakyTts {
        ok_calls: 3,
        seen: Mutex::new(0),
    };
    let err = pipeline::run(&cfg, &providers, &SixTurnModel, &tts, Utc::now())
        .await
        .unwrap_err();

    match err {
        PipelineError::Upstream { stage, .. } => assert_eq!(stage, Stage::Synthesizing),
        other => panic!("unexpected error: {other}"),
    }

    // feed unchanged, prior entry intact, no new audio published
    let after = fs::read_to_string(&feed_path).unwrap();
    assert_eq!(before, after);
    let entries = parse_entries(&after).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].episode_id, "glp1-digest-20260731090000");
    assert!(!Path::new(&cfg.storage.episodes_dir).exists());

    // the debug artifact from the scripting stage is expected to remain
    assert!(Path::new(&cfg.storage.transcript_path).exists());
}
