// src/pipeline.rs
// Single-shot driver: Fetching → Scripting → Synthesizing → Publishing.
// The first failure aborts the remaining stages; nothing persisted mutates
// before the Publishing stage. Retries are the scheduler's job.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::audio::{self, VoiceMap};
use crate::config::PodcastConfig;
use crate::error::PipelineError;
use crate::feed;
use crate::fetch::{self, types::SearchProvider};
use crate::script::{self, model::ScriptModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Scripting,
    Synthesizing,
    Publishing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetching => "fetching",
            Stage::Scripting => "scripting",
            Stage::Synthesizing => "synthesizing",
            Stage::Publishing => "publishing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a successful run produced.
#[derive(Debug)]
pub struct RunReport {
    pub items_covered: usize,
    pub segments: usize,
    pub episode_id: String,
    pub audio_path: PathBuf,
    pub duration_seconds: u64,
    pub entries_total: usize,
}

pub async fn run(
    cfg: &PodcastConfig,
    providers: &[Box<dyn SearchProvider>],
    model: &dyn ScriptModel,
    tts: &dyn audio::tts::SpeechSynthesizer,
    now: DateTime<Utc>,
) -> Result<RunReport, PipelineError> {
    tracing::info!(stage = %Stage::Fetching, feeds = providers.len(), "run started");
    let items = fetch::run_fetch(providers, cfg.fetch.max_items).await?;

    tracing::info!(stage = %Stage::Scripting, items = items.len(), "generating script");
    let transcript = script::generate(
        model,
        &cfg.script,
        &cfg.channel.title,
        &items,
        Path::new(&cfg.storage.transcript_path),
    )
    .await?;

    tracing::info!(stage = %Stage::Synthesizing, turns = transcript.len(), "synthesizing audio");
    let voices = VoiceMap {
        dan: cfg.audio.voice_dan.clone(),
        alex: cfg.audio.voice_alex.clone(),
    };
    let episode = audio::synthesize_episode(tts, &voices, &transcript).await?;

    tracing::info!(stage = %Stage::Publishing, bytes = episode.bytes.len(), "publishing episode");
    let published = feed::publish(&cfg.storage, &cfg.channel, &episode, &items, now)?;

    Ok(RunReport {
        items_covered: items.len(),
        segments: transcript.len(),
        episode_id: published.entry.episode_id,
        audio_path: published.audio_path,
        duration_seconds: published.entry.duration_seconds,
        entries_total: published.entries_total,
    })
}
