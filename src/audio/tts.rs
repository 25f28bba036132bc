// src/audio/tts.rs
// Speech-synthesis client: one call per transcript line, fixed output
// encoding across all segments.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize one line of speech with the given voice; returns raw audio
    /// bytes in the client's fixed encoding.
    async fn synthesize(&self, voice_id: &str, text: &str) -> Result<Vec<u8>>;
    fn name(&self) -> &'static str;
}

const TTS_URL_PREFIX: &str = "https://api.elevenlabs.io/v1/text-to-speech/";

#[derive(Debug, Clone, Copy, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    style: f32,
    use_speaker_boost: bool,
}

const VOICE_SETTINGS: VoiceSettings = VoiceSettings {
    stability: 0.5,
    similarity_boost: 0.75,
    style: 0.0,
    use_speaker_boost: true,
};

pub struct ElevenLabsClient {
    http: reqwest::Client,
    api_key: String,
    model_id: String,
    output_format: String,
}

impl ElevenLabsClient {
    pub fn new(
        api_key: impl Into<String>,
        model_id: impl Into<String>,
        output_format: impl Into<String>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("research-digest/0.1 (+github.com/lumlich/research-digest)")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(120))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key: api_key.into(),
            model_id: model_id.into(),
            output_format: output_format.into(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, voice_id: &str, text: &str) -> Result<Vec<u8>> {
        #[derive(Serialize)]
        struct Req<'a> {
            text: &'a str,
            model_id: &'a str,
            voice_settings: VoiceSettings,
        }

        let url = format!("{TTS_URL_PREFIX}{voice_id}");
        let req = Req {
            text,
            model_id: &self.model_id,
            voice_settings: VOICE_SETTINGS,
        };

        let resp = self
            .http
            .post(&url)
            .query(&[("output_format", self.output_format.as_str())])
            .header("xi-api-key", &self.api_key)
            .json(&req)
            .send()
            .await
            .context("text-to-speech post")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("text-to-speech returned {status}: {body}"));
        }

        let bytes = resp.bytes().await.context("text-to-speech body")?;
        if bytes.is_empty() {
            return Err(anyhow!("text-to-speech returned an empty segment"));
        }
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &'static str {
        "elevenlabs"
    }
}
