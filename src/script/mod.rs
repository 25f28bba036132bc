// src/script/mod.rs
pub mod model;
pub mod parser;
pub mod prompt;

use std::fs;
use std::path::Path;

use crate::config::ScriptConfig;
use crate::error::PipelineError;
use crate::fetch::types::ResearchItem;
use crate::pipeline::Stage;
use crate::transcript::Transcript;
use model::ScriptModel;

/// Run the scripting stage: build the prompt, call the model once, dump the
/// raw response to the debug artifact, then parse it into speaker turns.
///
/// The artifact is written before parsing so a malformed response can still
/// be inspected after a failed run.
pub async fn generate(
    model: &dyn ScriptModel,
    cfg: &ScriptConfig,
    show_title: &str,
    items: &[ResearchItem],
    artifact_path: &Path,
) -> Result<Transcript, PipelineError> {
    let prompt = prompt::build_prompt(show_title, items, cfg.min_words, cfg.max_words);
    tracing::debug!(model = model.name(), prompt_chars = prompt.len(), "calling script model");

    let raw = model
        .complete(&prompt)
        .await
        .map_err(|e| PipelineError::upstream(Stage::Scripting, e))?;

    write_debug_artifact(artifact_path, &raw);

    let transcript = parser::parse(&raw)?;
    if !transcript.has_both_speakers() {
        tracing::warn!("script uses a single voice; the prompt asks for both hosts");
    }
    tracing::info!(
        turns = transcript.len(),
        chars = raw.len(),
        "script generated"
    );
    Ok(transcript)
}

/// Best-effort: a failed artifact write is logged, never fatal.
fn write_debug_artifact(path: &Path, raw: &str) {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let _ = fs::create_dir_all(parent);
        }
    }
    if let Err(e) = fs::write(path, raw) {
        tracing::warn!(error = ?e, path = %path.display(), "transcript artifact write failed");
    }
}
