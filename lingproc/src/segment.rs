//! Boundary detection helpers.
//!
//! A sentence ends with `.`, `!` or `?` followed by whitespace. A clause ends
//! with `,`, `;` or `:` followed by whitespace. The whitespace run is treated
//! as the separator and dropped; the punctuation stays with the piece before
//! it.

use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("sentence boundary regex"));
static CLAUSE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;:]\s+").expect("clause boundary regex"));

/// Split `text` after every match of `boundary`, keeping the leading
/// punctuation byte and dropping the whitespace that follows it.
fn split_after<'a>(text: &'a str, boundary: &Regex) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for m in boundary.find_iter(text) {
        // every boundary starts with a single ASCII punctuation byte
        let end = m.start() + 1;
        parts.push(&text[start..end]);
        start = m.end();
    }
    parts.push(&text[start..]);
    parts.retain(|p| !p.is_empty());
    parts
}

/// Split `text` into sentences.
///
/// # Examples
/// ```
/// use lingproc::split_sentences;
///
/// let sentences = split_sentences("Hello world. How are you?");
/// assert_eq!(sentences, vec!["Hello world.", "How are you?"]);
/// ```
pub fn split_sentences(text: &str) -> Vec<&str> {
    split_after(text, &SENTENCE_END)
}

/// Split a sentence into clauses at commas, semicolons and colons.
pub fn split_clauses(sentence: &str) -> Vec<&str> {
    split_after(sentence, &CLAUSE_END)
}

/// Return the first sentence of `text` whose size exceeds `max_bytes`.
pub fn oversized_sentence(text: &str, max_bytes: usize) -> Option<&str> {
    split_sentences(text)
        .into_iter()
        .map(str::trim)
        .find(|s| s.len() > max_bytes)
}
