//! Draft inspection — measures a generated CV draft against the template policy
//! (key-qualities section, at most five narrative paragraphs, no bullets).
//!
//! The report is informational: violations are logged by the generator, never
//! used to reject a draft.

use serde::Serialize;

pub const MAX_NARRATIVE_PARAGRAPHS: usize = 5;

const KEY_QUALITIES_HEADING: &str = "key qualities";
const BULLET_MARKERS: &[char] = &['-', '*', '•', '●', '▪', '◦', '‣'];
/// A block needs this many sentences to count as a narrative paragraph;
/// lone headlines and skill listings fall below it.
const MIN_PARAGRAPH_SENTENCES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftReport {
    pub has_key_qualities: bool,
    pub narrative_paragraphs: usize,
    pub bullet_lines: usize,
}

impl DraftReport {
    pub fn follows_template(&self) -> bool {
        self.has_key_qualities
            && self.narrative_paragraphs <= MAX_NARRATIVE_PARAGRAPHS
            && self.bullet_lines == 0
    }
}

pub fn inspect_draft(draft: &str) -> DraftReport {
    let lowered = draft.to_lowercase();
    let has_key_qualities = lowered.contains(KEY_QUALITIES_HEADING);

    let bullet_lines = draft.lines().filter(|line| is_bullet_line(line)).count();

    let narrative_paragraphs = blocks(draft)
        .filter(|block| !block.to_lowercase().contains(KEY_QUALITIES_HEADING))
        .filter(|block| !block.lines().all(is_bullet_line))
        .filter(|block| count_sentences(block) >= MIN_PARAGRAPH_SENTENCES)
        .count();

    DraftReport {
        has_key_qualities,
        narrative_paragraphs,
        bullet_lines,
    }
}

/// Splits on blank lines.
fn blocks(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split("\n\n")
        .flat_map(|chunk| chunk.split("\r\n\r\n"))
        .map(|chunk| chunk.trim().to_string())
        .filter(|chunk| !chunk.is_empty())
}

fn is_bullet_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(marker), Some(' ')) => BULLET_MARKERS.contains(&marker),
        _ => false,
    }
}

fn count_sentences(block: &str) -> usize {
    let chars: Vec<char> = block.chars().collect();
    chars
        .iter()
        .enumerate()
        .filter(|&(i, &c)| {
            matches!(c, '.' | '!' | '?')
                && chars.get(i + 1).map_or(true, |next| next.is_whitespace())
        })
        .count()
}
