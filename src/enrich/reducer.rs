// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTML to plain text reduction
//!
//! Parses the page with `scraper`, keeps the first `<title>` separately and
//! flattens every remaining visible text node into one whitespace-collapsed
//! line.

use scraper::{Html, Node, Selector};

use crate::utils::text::{collapse_whitespace, truncate_to_char_boundary};

/// Elements whose text is never part of the excerpt
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "title"];

/// Title and visible text of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducedPage {
    pub title: Option<String>,
    pub text: String,
}

/// Reduce `html` to its title and at most `max_bytes` of visible text
pub fn reduce_html(html: &str, max_bytes: usize) -> ReducedPage {
    let document = Html::parse_document(html);
    let text = visible_text(&document);

    ReducedPage {
        title: extract_title(&document),
        text: truncate_to_char_boundary(&text, max_bytes).to_string(),
    }
}

/// Trimmed text of the first `<title>` element, if it has any
pub fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;

    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// All text nodes outside hidden elements, whitespace collapsed
fn visible_text(document: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            parts.push(text);
        }
    }

    collapse_whitespace(&parts.join(" "))
}
