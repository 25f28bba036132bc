// src/transcript.rs
// Two-host dialogue produced by the scripting stage and consumed by the
// audio stage. Dan is the clinical voice, Alex asks the listener questions.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speaker {
    /// Registered dietitian; evidence-focused, appropriately skeptical.
    Dan,
    /// Science journalist; draws out practical implications.
    Alex,
}

impl Speaker {
    pub const ALL: [Speaker; 2] = [Speaker::Dan, Speaker::Alex];

    /// Turn label as it appears in the script text (`Dan:` / `Alex:`).
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Dan => "Dan",
            Speaker::Alex => "Alex",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub speaker: Speaker,
    pub text: String,
}

/// Ordered speaker turns. A successfully parsed transcript is never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub lines: Vec<TranscriptLine>,
}

impl Transcript {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn has_both_speakers(&self) -> bool {
        Speaker::ALL
            .iter()
            .all(|s| self.lines.iter().any(|l| l.speaker == *s))
    }
}
