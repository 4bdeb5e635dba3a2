// file: src/chunker/splitter.rs
// description: recursive separator-based text splitter with bounded overlap
// reference: hierarchical paragraph/line/sentence/word splitting

use std::collections::VecDeque;

/// Paragraph, line, sentence end, whitespace, then arbitrary character cut.
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// Splits text into pieces of at most `chunk_size` characters, preferring the
/// earliest separator in the list that occurs in the text.
///
/// Consecutive pieces produced by one merge pass share a tail of whole splits
/// whose combined length never exceeds `chunk_overlap`.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self::with_separators(chunk_size, chunk_overlap, &DEFAULT_SEPARATORS)
    }

    pub fn with_separators(chunk_size: usize, chunk_overlap: usize, separators: &[&str]) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
            separators: separators.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, remaining) = pick_separator(text, separators);

        let splits = if separator.is_empty() {
            split_chars(text)
        } else {
            split_keeping_separator(text, separator)
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for split in splits {
            if char_len(split) < self.chunk_size {
                pending.push(split);
                continue;
            }

            if !pending.is_empty() {
                chunks.extend(self.merge_splits(&pending));
                pending.clear();
            }

            if remaining.is_empty() {
                if let Some(piece) = non_blank(split) {
                    chunks.push(piece);
                }
            } else {
                chunks.extend(self.split_recursive(split, remaining));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge_splits(&pending));
        }

        chunks
    }

    /// Greedily packs splits into chunks, carrying a tail of at most
    /// `chunk_overlap` characters into the next chunk.
    ///
    /// A window is only emitted once it holds text beyond the carried tail.
    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;
        let mut fresh = false;

        for &split in splits {
            let len = char_len(split);

            if total + len > self.chunk_size && !window.is_empty() {
                if fresh && let Some(chunk) = join_window(&window) {
                    chunks.push(chunk);
                }
                fresh = false;

                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }

            window.push_back(split);
            total += len;
            fresh |= !split.trim().is_empty();
        }

        if fresh && let Some(chunk) = join_window(&window) {
            chunks.push(chunk);
        }

        chunks
    }
}

fn pick_separator<'s>(text: &str, separators: &'s [String]) -> (&'s str, &'s [String]) {
    for (index, separator) in separators.iter().enumerate() {
        if separator.is_empty() || text.contains(separator.as_str()) {
            return (separator.as_str(), &separators[index + 1..]);
        }
    }
    ("", &[])
}

/// Splits after each separator occurrence so the separator stays with the
/// preceding text.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

fn split_chars(text: &str) -> Vec<&str> {
    text.char_indices()
        .map(|(start, c)| &text[start..start + c.len_utf8()])
        .collect()
}

fn join_window(window: &VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    non_blank(&joined)
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}
