//! Tokenization: split text into reveal-sized tokens.
//!
//! Both granularities are lossless: concatenating all tokens reproduces
//! the input byte for byte. Any non-empty string yields at least one
//! token.

use crate::options::StreamBy;
use unicode_segmentation::UnicodeSegmentation;

/// Split `text` into tokens at the given granularity.
pub fn tokenize(text: &str, stream_by: StreamBy) -> Vec<String> {
    match stream_by {
        StreamBy::Word => split_words(text),
        StreamBy::Character => text.graphemes(true).map(str::to_string).collect(),
    }
}

/// Alternating runs of non-whitespace and whitespace characters.
fn split_words(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_whitespace = None;

    for ch in text.chars() {
        let ws = ch.is_whitespace();
        if in_whitespace != Some(ws) && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        in_whitespace = Some(ws);
        current.push(ch);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
