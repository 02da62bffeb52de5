use scraper::node::Node;
use scraper::{ElementRef, Html};

const SKIPPED: [&str; 4] = ["script", "style", "noscript", "head"];

/// Visible text of an HTML page, one fragment per line.
///
/// Text nodes are trimmed and split on double spaces; empty fragments are
/// dropped.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();
    collect_text(document.root_element(), &mut parts);
    parts
        .iter()
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text<'a>(element: ElementRef<'a>, parts: &mut Vec<&'a str>) {
    if SKIPPED.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                for line in text.lines() {
                    let line = line.trim();
                    if !line.is_empty() {
                        parts.push(line);
                    }
                }
            }
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    collect_text(el, parts);
                }
            }
            _ => {}
        }
    }
}
