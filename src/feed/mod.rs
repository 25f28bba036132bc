// src/feed/mod.rs
pub mod document;
pub mod store;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::audio::EpisodeAudio;
use crate::config::{ChannelConfig, StorageConfig};
use crate::error::PipelineError;
use crate::fetch::types::ResearchItem;
use document::{FeedDocument, FeedEntry};
use store::EpisodeStore;

/// Covered-study titles are clipped to keep the episode description short.
const DESCRIPTION_TITLE_CAP: usize = 100;

#[derive(Debug)]
pub struct PublishedEpisode {
    pub entry: FeedEntry,
    pub audio_path: PathBuf,
    pub entries_total: usize,
}

/// Publish one episode: load prior history, persist the audio under a stable
/// name, append the new entry, and atomically rewrite the feed. The feed on
/// disk is only touched by the final rename; any earlier failure leaves it
/// byte-for-byte unchanged.
pub fn publish(
    storage: &StorageConfig,
    channel: &ChannelConfig,
    audio: &EpisodeAudio,
    items: &[ResearchItem],
    now: DateTime<Utc>,
) -> Result<PublishedEpisode, PipelineError> {
    let feed_path = Path::new(&storage.feed_path);
    let mut doc = FeedDocument::load(feed_path, channel.clone())?;

    let store = EpisodeStore::new(&storage.episodes_dir);
    let file_name = EpisodeStore::episode_file_name(&storage.episode_slug, now.date_naive());
    let audio_path = store
        .write(&file_name, &audio.bytes)
        .map_err(|e| PipelineError::Persistence(format!("{e:#}")))?;

    let entry = FeedEntry {
        episode_id: format!("{}-{}", storage.episode_slug, now.format("%Y%m%d%H%M%S")),
        title: format!("{} - {}", channel.title, now.format("%Y-%m-%d")),
        description: describe_items(items),
        pub_date: now,
        audio_url: format!(
            "{}/{file_name}",
            storage.media_url.trim_end_matches('/')
        ),
        byte_size: audio.bytes.len() as u64,
        duration_seconds: audio.duration_seconds.round() as u64,
    };

    doc.push_entry(entry.clone());
    doc.write_atomic(feed_path, now)?;

    tracing::info!(
        episode = %entry.episode_id,
        feed = %feed_path.display(),
        entries = doc.entries.len(),
        "feed updated"
    );

    Ok(PublishedEpisode {
        entry,
        audio_path,
        entries_total: doc.entries.len(),
    })
}

/// Episode description built from the covered study titles.
pub fn describe_items(items: &[ResearchItem]) -> String {
    let titles: Vec<String> = items
        .iter()
        .map(|i| i.title.chars().take(DESCRIPTION_TITLE_CAP).collect())
        .collect();
    format!(
        "This week's research roundup covers: {}",
        titles.join("; ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;

    fn storage_in(dir: &Path) -> StorageConfig {
        StorageConfig {
            feed_path: dir.join("feed.xml").to_string_lossy().into_owned(),
            episodes_dir: dir.join("episodes").to_string_lossy().into_owned(),
            transcript_path: dir.join("latest_script.txt").to_string_lossy().into_owned(),
            episode_slug: "glp1-digest".to_string(),
            media_url: "https://example.test/episodes/".to_string(),
        }
    }

    fn item(title: &str) -> ResearchItem {
        ResearchItem {
            title: title.to_string(),
            summary: "s".to_string(),
            source_link: format!("https://pubmed.ncbi.nlm.nih.gov/{title}/"),
            published_at: Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn description_joins_clipped_titles() {
        let long = "x".repeat(150);
        let desc = describe_items(&[item("Short title"), item(&long)]);
        assert!(desc.starts_with("This week's research roundup covers: Short title; "));
        assert!(desc.len() < 160 + 50);
    }

    #[test]
    fn publish_writes_audio_and_appends_entry() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());
        let channel = ChannelConfig::default();
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 9, 30, 0).unwrap();

        let audio = EpisodeAudio {
            bytes: vec![1u8; 32_000],
            duration_seconds: 2.0,
        };
        let published = publish(&storage, &channel, &audio, &[item("a")], now).unwrap();

        assert_eq!(published.entries_total, 1);
        assert!(published.audio_path.ends_with("glp1-digest-2026-08-07.mp3"));
        assert_eq!(fs::read(&published.audio_path).unwrap().len(), 32_000);
        assert_eq!(published.entry.duration_seconds, 2);
        assert_eq!(
            published.entry.audio_url,
            "https://example.test/episodes/glp1-digest-2026-08-07.mp3"
        );

        let doc = FeedDocument::load(Path::new(&storage.feed_path), channel).unwrap();
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.entries[0], published.entry);
    }

    #[test]
    fn publish_preserves_prior_entries() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());
        let channel = ChannelConfig::default();

        let audio = EpisodeAudio {
            bytes: vec![0u8; 16_000],
            duration_seconds: 1.0,
        };
        let first = Utc.with_ymd_and_hms(2026, 7, 31, 9, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2026, 8, 7, 9, 0, 0).unwrap();

        publish(&storage, &channel, &audio, &[item("a")], first).unwrap();
        let published = publish(&storage, &channel, &audio, &[item("b")], second).unwrap();

        assert_eq!(published.entries_total, 2);
        let doc = FeedDocument::load(Path::new(&storage.feed_path), channel).unwrap();
        assert_eq!(doc.entries.len(), 2);
    }

    #[test]
    fn corrupt_prior_feed_aborts_before_any_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());
        fs::write(&storage.feed_path, "not xml at all").unwrap();

        let audio = EpisodeAudio {
            bytes: vec![0u8; 100],
            duration_seconds: 0.1,
        };
        let err = publish(
            &storage,
            &ChannelConfig::default(),
            &audio,
            &[item("a")],
            Utc::now(),
        )
        .unwrap_err();

        assert!(matches!(err, PipelineError::Persistence(_)));
        // feed untouched, no episode dir created
        assert_eq!(fs::read_to_string(&storage.feed_path).unwrap(), "not xml at all");
        assert!(!Path::new(&storage.episodes_dir).exists());
    }
}
