// src/script/parser.rs
// Turn grammar for model output: a turn starts at a line `<Name>: text`
// (markdown bold around the label is tolerated); label-less lines continue
// the current turn; text before the first label is preamble and dropped.

use crate::error::PipelineError;
use crate::transcript::{Speaker, Transcript, TranscriptLine};

pub fn parse(raw: &str) -> Result<Transcript, PipelineError> {
    let mut lines: Vec<TranscriptLine> = Vec::new();

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match split_turn(trimmed) {
            Some((speaker, rest)) => lines.push(TranscriptLine {
                speaker,
                text: rest.to_string(),
            }),
            None => {
                if let Some(last) = lines.last_mut() {
                    if !last.text.is_empty() {
                        last.text.push(' ');
                    }
                    last.text.push_str(trimmed);
                }
            }
        }
    }

    lines.retain(|l| !l.text.is_empty());
    if lines.is_empty() {
        return Err(PipelineError::Parse(
            "no recognizable speaker turns in model output".to_string(),
        ));
    }
    Ok(Transcript { lines })
}

fn split_turn(line: &str) -> Option<(Speaker, &str)> {
    let s = line.trim_start_matches('*');
    for speaker in Speaker::ALL {
        if let Some(rest) = s.strip_prefix(speaker.label()) {
            let rest = rest.trim_start_matches('*');
            if let Some(rest) = rest.strip_prefix(':') {
                return Some((speaker, rest.trim_start_matches('*').trim()));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternating_turns_parse_in_order() {
        let raw = "Dan: Welcome back to the show.\nAlex: Thanks Dan, what's on deck?\nDan: Three studies this week.";
        let t = parse(raw).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.lines[0].speaker, Speaker::Dan);
        assert_eq!(t.lines[1].speaker, Speaker::Alex);
        assert_eq!(t.lines[1].text, "Thanks Dan, what's on deck?");
        assert!(t.has_both_speakers());
    }

    #[test]
    fn label_less_lines_continue_the_current_turn() {
        let raw = "Dan: The trial enrolled 120 adults\nover 26 weeks.\nAlex: And the endpoint?";
        let t = parse(raw).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.lines[0].text, "The trial enrolled 120 adults over 26 weeks.");
    }

    #[test]
    fn preamble_before_first_label_is_dropped() {
        let raw = "Here is your script:\n\nDan: Hello everyone.";
        let t = parse(raw).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.lines[0].text, "Hello everyone.");
    }

    #[test]
    fn markdown_bold_labels_are_tolerated() {
        for raw in ["**Dan:** Hello.", "**Dan**: Hello.", "Dan: Hello."] {
            let t = parse(raw).unwrap();
            assert_eq!(t.lines[0].speaker, Speaker::Dan, "input: {raw}");
            assert_eq!(t.lines[0].text, "Hello.", "input: {raw}");
        }
    }

    #[test]
    fn similar_names_do_not_match() {
        // "Danny:" must not be read as a Dan turn
        let raw = "Danny: not a host\nAlex: real turn";
        let t = parse(raw).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.lines[0].speaker, Speaker::Alex);
    }

    #[test]
    fn empty_turns_are_discarded() {
        let raw = "Dan:\nAlex: Something.";
        let t = parse(raw).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.lines[0].speaker, Speaker::Alex);
    }

    #[test]
    fn no_turns_is_a_parse_error() {
        let err = parse("The model refused to answer in the requested format.").unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
        assert!(parse("").is_err());
    }
}
