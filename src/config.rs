// src/config.rs
// Run configuration: one typed object, built once at the entrypoint and
// passed down. No other module reads the process environment.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/podcast.toml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PodcastConfig {
    pub channel: ChannelConfig,
    pub fetch: FetchConfig,
    pub script: ScriptConfig,
    pub audio: AudioConfig,
    pub storage: StorageConfig,
}

impl PodcastConfig {
    /// Load from a TOML file; a missing file yields the built-in defaults,
    /// an unreadable or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("parsing config from {}", path.display()))
    }
}

/// Channel-level feed metadata (RSS `<channel>` plus iTunes tags).
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChannelConfig {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: String,
    pub author: String,
    pub summary: String,
    pub explicit: String,
    pub category: String,
    pub subcategory: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            title: "The GLP-1 Research Digest".to_string(),
            link: "https://dc1616dc.github.io/glp1-research-podcast".to_string(),
            description: "Weekly analysis of the latest GLP-1 and obesity medication \
                          research. Hosted by Dan (registered dietitian) and Alex \
                          (science journalist)."
                .to_string(),
            language: "en-us".to_string(),
            author: "GLP-1 Research Digest".to_string(),
            summary: "Weekly analysis of the latest GLP-1 and obesity medication \
                      research for healthcare professionals and informed patients."
                .to_string(),
            explicit: "no".to_string(),
            category: "Health & Fitness".to_string(),
            subcategory: "Nutrition".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    /// PubMed search expressions, one provider per query.
    pub queries: Vec<String>,
    /// Most-recent results requested per query.
    pub per_query_limit: u32,
    /// Cap on the combined item list (bounds downstream prompt size).
    pub max_items: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            queries: vec![
                r#""GLP-1 agonist" AND ("muscle mass" OR "protein intake")"#.to_string(),
                r#"("semaglutide" OR "tirzepatide") AND nutrition"#.to_string(),
                r#""GLP-1" AND ("side effects" OR "nausea")"#.to_string(),
                r#""Anti Obesity Medications" AND protein"#.to_string(),
            ],
            per_query_limit: 10,
            max_items: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScriptConfig {
    pub model: String,
    pub max_tokens: u32,
    /// Target script length range, in words (proxy for spoken duration).
    pub min_words: u32,
    pub max_words: u32,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4096,
            min_words: 2000,
            max_words: 2500,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub tts_model: String,
    /// Fixed output encoding; every segment must use the same one so
    /// byte-level concatenation is sound.
    pub output_format: String,
    pub voice_dan: String,
    pub voice_alex: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            tts_model: "eleven_monolingual_v1".to_string(),
            output_format: "mp3_44100_128".to_string(),
            // Adam
            voice_dan: "pNInz6obpgDQGcFmaJgB".to_string(),
            // Rachel
            voice_alex: "21m00Tcm4TlvDq8ikWAM".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Persisted feed document; the sole state carried across runs.
    pub feed_path: String,
    pub episodes_dir: String,
    /// Debug transcript artifact, overwritten each run.
    pub transcript_path: String,
    /// Prefix for episode file names (`<slug>-YYYY-MM-DD.mp3`).
    pub episode_slug: String,
    /// Externally resolvable prefix for episode enclosure URLs.
    pub media_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            feed_path: "feed.xml".to_string(),
            episodes_dir: "episodes".to_string(),
            transcript_path: "latest_script.txt".to_string(),
            episode_slug: "glp1-digest".to_string(),
            media_url: "https://raw.githubusercontent.com/dc1616dc/glp1-research-podcast/main/episodes".to_string(),
        }
    }
}

/// API credentials for the two paid services. Read from the environment at
/// the invocation surface only.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub anthropic_api_key: String,
    pub elevenlabs_api_key: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            elevenlabs_api_key: require_env("ELEVENLABS_API_KEY")?,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    let v = std::env::var(name).map_err(|_| anyhow!("missing {name} env var"))?;
    if v.trim().is_empty() {
        return Err(anyhow!("{name} env var is empty"));
    }
    Ok(v)
}
