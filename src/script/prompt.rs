// src/script/prompt.rs
// Single-shot prompt for the episode script. The persona set is fixed; the
// parser downstream depends on the `Dan:` / `Alex:` turn labels requested
// here.

use crate::fetch::types::ResearchItem;
use crate::transcript::Speaker;

/// Studies block embedded into the prompt, one entry per item.
pub fn format_items(items: &[ResearchItem]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!(
            "\nSTUDY {n}:\nTitle: {title}\nAbstract: {summary}\nLink: {link}\nPublished: {date}\n---\n",
            n = i + 1,
            title = item.title,
            summary = item.summary,
            link = item.source_link,
            date = item.published_at.format("%Y-%m-%d"),
        ));
    }
    out
}

pub fn build_prompt(
    show_title: &str,
    items: &[ResearchItem],
    min_words: u32,
    max_words: u32,
) -> String {
    let dan = Speaker::Dan.label();
    let alex = Speaker::Alex.label();
    let studies = format_items(items);

    format!(
        r#"You are writing a podcast script for "{show_title}", a weekly podcast that breaks down the latest GLP-1 and obesity medication research for healthcare professionals and educated patients.

CREATE A CONVERSATIONAL SCRIPT BETWEEN TWO HOSTS:

HOST 1 - {dan_upper}:
- Registered dietitian with 15 years of clinical experience
- Evidence-focused and appropriately skeptical
- Critical of poorly designed studies and overhyped findings
- Speaks in clear, accessible language but doesn't dumb things down
- Occasionally uses dry humor

HOST 2 - {alex_upper}:
- Science journalist who covers metabolic health
- Asks the questions that listeners would ask
- Helps translate complex concepts
- Curious and engaged, but defers to {dan} on clinical matters
- Good at drawing out practical implications

STUDIES TO COVER:
{studies}

SCRIPT REQUIREMENTS:
1. LENGTH: {min_words}-{max_words} words
2. FORMAT: Use "{dan}:" and "{alex}:" labels for each speaker turn
3. STRUCTURE:
   - Brief intro/welcome (30 seconds)
   - Cover each study: what they did, methodology critique, patient implications
   - {dan} should be critical of weak methodologies (small sample sizes, short duration, industry funding bias)
   - {alex} asks clarifying questions listeners would want answered
   - End with key takeaways

4. TONE:
   - Professional but conversational
   - Natural dialogue with some back-and-forth
   - Include brief reactions ("That's interesting..." "Right, and...")
   - Avoid sounding scripted or robotic

5. CONTENT GUIDELINES:
   - Be specific about numbers (sample sizes, effect sizes, p-values when relevant)
   - Discuss clinical relevance, not just statistical significance
   - Note limitations honestly
   - Provide actionable insights for practitioners and patients

Write the complete script now. Start directly with the dialogue (no meta-commentary)."#,
        dan_upper = dan.to_uppercase(),
        alex_upper = alex.to_uppercase(),
    )
}
