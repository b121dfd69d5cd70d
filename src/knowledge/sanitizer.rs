// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prompt-injection phrase redaction
//!
//! Fetched file content ends up inside an LLM prompt, so known instruction
//! override phrases are replaced with a fixed marker before it is budgeted.

use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Literal text substituted for every redacted match
pub const REDACTION_MARKER: &str = "[redacted]";

/// Built-in phrases, applied in this order before any configured extras
const BUILTIN_PHRASES: &[&str] = &[
    "ignore system prompt",
    "ignore previous instructions",
    "disregard all above",
];

#[derive(Debug, Error)]
pub enum SanitizerError {
    #[error("Invalid redaction phrase '{phrase}': {source}")]
    InvalidPattern {
        phrase: String,
        #[source]
        source: regex::Error,
    },

    #[error("Redaction phrase '{0}' matches the redaction marker")]
    MatchesMarker(String),

    /// Matches shorter than the marker would make redaction grow the text
    #[error("Redaction phrase '{0}' is shorter than the redaction marker")]
    TooShort(String),
}

/// Ordered, case-insensitive phrase redactor
#[derive(Debug, Clone)]
pub struct Sanitizer {
    patterns: Vec<Regex>,
}

impl Sanitizer {
    /// Build a sanitizer with the built-in phrases followed by `extra_phrases`
    pub fn new(extra_phrases: &[String]) -> Result<Self, SanitizerError> {
        let mut phrases: Vec<&str> = BUILTIN_PHRASES.to_vec();
        phrases.extend(extra_phrases.iter().map(String::as_str));

        let mut patterns = Vec::new();
        for phrase in phrases {
            let pattern = phrase_pattern(phrase)?;
            if pattern.is_match(REDACTION_MARKER) {
                return Err(SanitizerError::MatchesMarker(phrase.to_string()));
            }
            patterns.push(pattern);
        }

        Ok(Self { patterns })
    }

    /// Apply every pattern once, in order
    pub fn sanitize(&self, text: &str) -> String {
        let mut out = text.to_string();
        for pattern in &self.patterns {
            out = pattern.replace_all(&out, REDACTION_MARKER).into_owned();
        }
        out
    }

    /// Number of active patterns
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(&[]).expect("built-in redaction phrases are valid")
    }
}

/// Words of `phrase` matched literally, separated by any run of whitespace
fn phrase_pattern(phrase: &str) -> Result<Regex, SanitizerError> {
    let body = phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");

    let shortest_match = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
    if shortest_match.len() < REDACTION_MARKER.len() {
        return Err(SanitizerError::TooShort(phrase.to_string()));
    }

    RegexBuilder::new(&body)
        .case_insensitive(true)
        .build()
        .map_err(|source| SanitizerError::InvalidPattern {
            phrase: phrase.to_string(),
            source,
        })
}
