//! Plain-text rendition of a knowledge base and the reverse migration.

use crate::model::{KnowledgeBase, Section};

pub const DEFAULT_HEADER: &str = "KNOWLEDGE BASE";
const RULE_WIDTH: usize = 47;
const MIN_RULE_WIDTH: usize = 40;
const MAX_TITLE_CHARS: usize = 100;

/// Render `kb` as the text document fed to retrieval.
///
/// ```text
/// HEADER
///
/// ===============================================
/// SECTION TITLE
/// ===============================================
///
/// content
///
/// ```
pub fn export_text(kb: &KnowledgeBase, header: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = format!("{header}\n\n");
    for section in &kb.sections {
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&section.title.to_uppercase());
        out.push('\n');
        out.push_str(&rule);
        out.push_str("\n\n");
        out.push_str(&section.content);
        out.push_str("\n\n");
    }
    out
}

/// Split legacy text on `=` rules into sections.
///
/// A part whose first line is shorter than 100 chars starts a new section
/// titled by that line; otherwise the part is appended to the current one.
/// Sections with an empty body are dropped.
pub fn parse_text(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut title = String::new();
    let mut content = String::new();

    for part in split_on_rules(text) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let mut lines = part.split('\n');
        let first = lines.next().unwrap_or_default().trim();
        if !first.is_empty() && first.chars().count() < MAX_TITLE_CHARS {
            flush(&mut sections, &title, &content);
            title = first.to_string();
            content = lines.collect::<Vec<_>>().join("\n").trim().to_string();
        } else {
            content.push('\n');
            content.push_str(part);
        }
    }
    flush(&mut sections, &title, &content);
    sections
}

fn flush(sections: &mut Vec<Section>, title: &str, content: &str) {
    if !title.is_empty() && !content.is_empty() {
        sections.push(Section::new(title, content.trim()));
    }
}

/// Pieces of `text` between runs of at least [`MIN_RULE_WIDTH`] `=` chars.
fn split_on_rules(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut run_start = None;
    for (i, c) in text.char_indices().chain(std::iter::once((text.len(), '\0'))) {
        if c == '=' {
            run_start.get_or_insert(i);
            continue;
        }
        if let Some(rs) = run_start.take() {
            if i - rs >= MIN_RULE_WIDTH {
                parts.push(&text[start..rs]);
                start = i;
            }
        }
    }
    parts.push(&text[start..]);
    parts
}
