// src/audio/mod.rs
pub mod tts;

use crate::error::PipelineError;
use crate::pipeline::Stage;
use crate::transcript::{Speaker, Transcript};
use tts::SpeechSynthesizer;

/// Bitrate of the fixed `mp3_44100_128` output format. Durations are
/// estimated from byte length at this rate; the synthesis response carries
/// no timing metadata, and one method must hold across all episodes so feed
/// durations stay comparable.
pub const MP3_BITRATE_BITS_PER_SEC: u64 = 128_000;

pub const AUDIO_MIME_TYPE: &str = "audio/mpeg";

/// One finished episode: concatenated segments, write-once.
#[derive(Debug, Clone)]
pub struct EpisodeAudio {
    pub bytes: Vec<u8>,
    pub duration_seconds: f64,
}

/// Voice identifier per persona, fixed for the whole episode.
#[derive(Debug, Clone)]
pub struct VoiceMap {
    pub dan: String,
    pub alex: String,
}

impl VoiceMap {
    pub fn voice_for(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::Dan => &self.dan,
            Speaker::Alex => &self.alex,
        }
    }
}

pub fn estimate_duration_secs(byte_len: usize) -> f64 {
    (byte_len as f64 * 8.0) / MP3_BITRATE_BITS_PER_SEC as f64
}

/// Synthesize every transcript line in order and concatenate the raw
/// segments. Any segment failure aborts the episode; skipping a line would
/// corrupt narrative continuity.
pub async fn synthesize_episode(
    tts: &dyn SpeechSynthesizer,
    voices: &VoiceMap,
    transcript: &Transcript,
) -> Result<EpisodeAudio, PipelineError> {
    let total = transcript.len();
    let mut bytes = Vec::new();
    let mut duration_seconds = 0.0_f64;

    for (idx, line) in transcript.lines.iter().enumerate() {
        tracing::debug!(
            segment = idx + 1,
            total,
            speaker = line.speaker.label(),
            "synthesizing segment"
        );
        let segment = tts
            .synthesize(voices.voice_for(line.speaker), &line.text)
            .await
            .map_err(|e| {
                PipelineError::upstream(
                    Stage::Synthesizing,
                    e.context(format!(
                        "segment {}/{} ({})",
                        idx + 1,
                        total,
                        line.speaker.label()
                    )),
                )
            })?;

        duration_seconds += estimate_duration_secs(segment.len());
        bytes.extend_from_slice(&segment);
    }

    tracing::info!(
        segments = total,
        bytes = bytes.len(),
        duration_secs = duration_seconds,
        "episode audio assembled"
    );
    Ok(EpisodeAudio {
        bytes,
        duration_seconds,
    })
}
