//! Digit-aware ordering so `2.png` sorts before `10.png`

use std::cmp::Ordering;

/// One run of a natural sort key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Chunk {
    /// Lowercased non-digit run
    Text(String),
    /// Digit run as (significant length, digits without leading zeros)
    Number(usize, String),
}

/// Split `s` into alternating text and number runs
///
/// Keys always start with a (possibly empty) text run, so two keys compare
/// text against text and number against number.
pub fn natural_key(s: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut text = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_ascii_digit() {
            text.extend(c.to_lowercase());
            continue;
        }

        chunks.push(Chunk::Text(std::mem::take(&mut text)));

        let mut digits = String::from(c);
        while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
            digits.push(d);
            chars.next();
        }

        let trimmed = digits.trim_start_matches('0').to_string();
        chunks.push(Chunk::Number(trimmed.len(), trimmed));
    }

    chunks.push(Chunk::Text(text));
    chunks
}

pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b))
}
