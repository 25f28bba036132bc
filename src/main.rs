//! Research-Digest Podcast Generator — Binary Entrypoint
//! One invocation produces one episode: fetch recent studies, write the
//! two-host script, synthesize audio, update the published feed.
//!
//! Triggered by an external scheduler; exits non-zero on any fatal failure
//! so the scheduler can retry the run wholesale.

use std::path::Path;

use research_digest::audio::tts::ElevenLabsClient;
use research_digest::config::{Credentials, PodcastConfig, DEFAULT_CONFIG_PATH};
use research_digest::fetch::providers::pubmed::PubMedProvider;
use research_digest::fetch::types::SearchProvider;
use research_digest::pipeline;
use research_digest::script::model::AnthropicClient;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("research_digest=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env in local/dev; no-op in scheduled environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("research-digest: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config_path = std::env::var("PODCAST_CONFIG_PATH")
        .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = PodcastConfig::load(Path::new(&config_path))?;
    let creds = Credentials::from_env()?;

    let providers: Vec<Box<dyn SearchProvider>> = cfg
        .fetch
        .queries
        .iter()
        .map(|q| {
            Box::new(PubMedProvider::new(q.clone(), cfg.fetch.per_query_limit))
                as Box<dyn SearchProvider>
        })
        .collect();
    let model = AnthropicClient::new(
        creds.anthropic_api_key,
        cfg.script.model.clone(),
        cfg.script.max_tokens,
    );
    let tts = ElevenLabsClient::new(
        creds.elevenlabs_api_key,
        cfg.audio.tts_model.clone(),
        cfg.audio.output_format.clone(),
    );

    let report = pipeline::run(&cfg, &providers, &model, &tts, chrono::Utc::now()).await?;

    tracing::info!(
        episode = %report.episode_id,
        items = report.items_covered,
        segments = report.segments,
        duration_secs = report.duration_seconds,
        entries = report.entries_total,
        "episode published"
    );
    println!(
        "published {} ({} segments, {}s) -> {}",
        report.episode_id,
        report.segments,
        report.duration_seconds,
        report.audio_path.display()
    );
    Ok(())
}
