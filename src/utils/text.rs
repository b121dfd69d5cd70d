// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! UTF-8 aware text helpers shared by aggregation and enrichment

/// Longest prefix of `text` that fits in `max_bytes` without splitting a
/// code point
pub fn truncate_to_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Collapse every whitespace run to a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
