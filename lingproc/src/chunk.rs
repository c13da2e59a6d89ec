//! Byte-bounded text chunking.
//!
//! [`chunk_text`] packs sentences greedily into chunks no larger than a byte
//! limit. A sentence that is too large on its own is broken at clause
//! boundaries, and a clause that is still too large is broken between words.
//! A single word larger than the limit is emitted whole.

use serde::Serialize;
use tracing::warn;

use crate::segment::{split_clauses, split_sentences};

/// Number of characters of an oversized word included in warnings.
const PREVIEW_CHARS: usize = 20;

/// An ordered fragment of the input text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Position of this chunk in the original text, starting at zero.
    pub index: usize,
    /// The text to synthesize.
    pub text: String,
}

impl Chunk {
    /// Size of the chunk text in bytes.
    pub fn byte_len(&self) -> usize {
        self.text.len()
    }

    /// Whether the chunk holds no text at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Split `text` into chunks of at most `max_bytes` bytes.
///
/// Text that already fits is returned unchanged as a single chunk, so an
/// empty string yields one empty chunk.
///
/// # Examples
/// ```
/// use lingproc::chunk_text;
///
/// let chunks = chunk_text("First sentence. Second sentence. Third sentence.", 30);
/// assert!(chunks.len() >= 2);
/// assert!(chunks.iter().all(|c| c.byte_len() <= 30));
/// ```
pub fn chunk_text(text: &str, max_bytes: usize) -> Vec<Chunk> {
    let pieces = if text.len() <= max_bytes {
        vec![text.to_string()]
    } else {
        split_to_limit(text, max_bytes)
    };
    pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk { index, text })
        .collect()
}

fn split_to_limit(text: &str, max_bytes: usize) -> Vec<String> {
    let mut packer = Packer::new(max_bytes);
    for sentence in split_sentences(text) {
        let sentence = sentence.trim();
        if sentence.len() > max_bytes {
            packer.extend(split_long_sentence(sentence, max_bytes));
        } else {
            packer.push(sentence);
        }
    }
    packer.finish()
}

fn split_long_sentence(sentence: &str, max_bytes: usize) -> Vec<String> {
    let mut packer = Packer::new(max_bytes);
    for clause in split_clauses(sentence) {
        let clause = clause.trim();
        if clause.len() > max_bytes {
            packer.extend(split_at_words(clause, max_bytes));
        } else {
            packer.push(clause);
        }
    }
    packer.finish()
}

fn split_at_words(clause: &str, max_bytes: usize) -> Vec<String> {
    let mut packer = Packer::new(max_bytes);
    for word in clause.split_whitespace() {
        if word.len() > max_bytes {
            let preview: String = word.chars().take(PREVIEW_CHARS).collect();
            warn!(
                word_preview = %preview,
                bytes = word.len(),
                max_bytes,
                "word exceeds chunk byte limit"
            );
            packer.extend(vec![word.to_string()]);
        } else {
            packer.push(word);
        }
    }
    packer.finish()
}

/// Greedy accumulator shared by every splitting level.
struct Packer {
    max_bytes: usize,
    current: String,
    done: Vec<String>,
}

impl Packer {
    fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            current: String::new(),
            done: Vec::new(),
        }
    }

    /// Append `piece` to the open chunk, closing it first if `piece` would
    /// push it past the limit.
    fn push(&mut self, piece: &str) {
        if piece.is_empty() {
            return;
        }
        if self.current.is_empty() {
            self.current.push_str(piece);
        } else if self.current.len() + 1 + piece.len() <= self.max_bytes {
            self.current.push(' ');
            self.current.push_str(piece);
        } else {
            self.close();
            self.current.push_str(piece);
        }
    }

    /// Close the open chunk and append already finished chunks after it.
    fn extend(&mut self, chunks: Vec<String>) {
        self.close();
        self.done.extend(chunks.into_iter().filter(|c| !c.is_empty()));
    }

    fn close(&mut self) {
        let current = std::mem::take(&mut self.current);
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            self.done.push(trimmed.to_string());
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.close();
        self.done
    }
}
