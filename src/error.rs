// src/error.rs
// Typed pipeline failures. All four kinds are fatal to the current run and
// propagate to the entrypoint, which exits non-zero.

use thiserror::Error;

use crate::pipeline::Stage;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Every configured search feed came back empty or failed.
    #[error("fetch produced no research items (all feeds empty or failed)")]
    NoContent,

    /// The model response could not be decomposed into speaker turns.
    #[error("script parse failed: {0}")]
    Parse(String),

    /// An external service call failed or timed out.
    // field is deliberately not named `source`: anyhow::Error is not a
    // std::error::Error, so it cannot back `Error::source()`
    #[error("{stage} stage: upstream call failed: {cause:#}")]
    Upstream { stage: Stage, cause: anyhow::Error },

    /// The persisted feed or episode store could not be read or written.
    #[error("feed persistence failed: {0}")]
    Persistence(String),
}

impl PipelineError {
    pub fn upstream(stage: Stage, cause: anyhow::Error) -> Self {
        Self::Upstream { stage, cause }
    }

    /// Stage the failure is attributed to in the terminal message.
    pub fn stage(&self) -> Stage {
        match self {
            Self::NoContent => Stage::Fetching,
            Self::Parse(_) => Stage::Scripting,
            Self::Upstream { stage, .. } => *stage,
            Self::Persistence(_) => Stage::Publishing,
        }
    }
}
