//! Recursive separator-cascade text splitting.
//!
//! Splits on the highest-priority separator that appears in the text
//! (paragraph break, then line break, then space, then single characters)
//! and only recurses to lower-priority separators for pieces that still
//! exceed the chunk budget. Pieces are then greedily merged back into
//! chunks of at most `chunk_size` characters, with a `chunk_overlap`-sized
//! tail carried into the next chunk.

use std::collections::VecDeque;

use tracing::warn;

use crate::loader::RawSegment;

/// A chunk-sized span of text that still carries its source file for
/// attribution. Document ids are stamped later by the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct TextChunk {
    pub content: String,
    pub source_path: String,
}

pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                " ".to_string(),
                String::new(),
            ],
        }
    }

    /// Split every segment, preserving segment order and source metadata.
    pub fn split_segments(&self, segments: &[RawSegment]) -> Vec<TextChunk> {
        let mut chunks = Vec::new();
        for segment in segments {
            for content in self.split_text(&segment.text) {
                chunks.push(TextChunk {
                    content,
                    source_path: segment.source_path.clone(),
                });
            }
        }
        chunks
    }

    /// Split one text into chunks of at most `chunk_size` characters.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.split_recursive(text, &self.separators, &mut out);
        out.into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[String], out: &mut Vec<String>) {
        // The empty separator always matches, so this cannot fail as long
        // as the cascade ends with "".
        let sep_idx = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s.as_str()))
            .unwrap_or(separators.len() - 1);
        let separator = &separators[sep_idx];
        let remaining = &separators[sep_idx + 1..];

        let pieces: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(separator.as_str()).map(str::to_string).collect()
        };

        let mut fitting: Vec<String> = Vec::new();
        for piece in pieces {
            if char_len(&piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }
            // Oversized piece: flush what fits so far, then descend one
            // separator level (or give up and emit the piece whole).
            if !fitting.is_empty() {
                self.merge_pieces(&fitting, separator, out);
                fitting.clear();
            }
            if remaining.is_empty() {
                out.push(piece);
            } else {
                self.split_recursive(&piece, remaining, out);
            }
        }
        if !fitting.is_empty() {
            self.merge_pieces(&fitting, separator, out);
        }
    }

    /// Greedily pack `pieces` into chunks of at most `chunk_size`
    /// characters, retaining a tail of roughly `chunk_overlap` characters
    /// between adjacent chunks.
    fn merge_pieces(&self, pieces: &[String], separator: &str, out: &mut Vec<String>) {
        let sep_len = char_len(separator);
        let mut window: VecDeque<&String> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let piece_len = char_len(piece);
            let extra = if window.is_empty() { 0 } else { sep_len };
            if total + piece_len + extra > self.chunk_size {
                if total > self.chunk_size {
                    warn!("produced a chunk of {total} chars, above the budget of {}", self.chunk_size);
                }
                if !window.is_empty() {
                    out.push(join_pieces(&window, separator));
                    // Shrink until the remainder fits inside the overlap
                    // budget and leaves room for the incoming piece.
                    while total > self.chunk_overlap
                        || (total + piece_len + if window.is_empty() { 0 } else { sep_len }
                            > self.chunk_size
                            && total > 0)
                    {
                        let Some(front) = window.pop_front() else { break };
                        total -= char_len(front) + if window.is_empty() { 0 } else { sep_len };
                    }
                }
            }
            total += piece_len + if window.is_empty() { 0 } else { sep_len };
            window.push_back(piece);
        }
        if !window.is_empty() {
            out.push(join_pieces(&window, separator));
        }
    }
}

fn join_pieces(window: &VecDeque<&String>, separator: &str) -> String {
    let mut joined = String::new();
    for (i, piece) in window.iter().enumerate() {
        if i > 0 {
            joined.push_str(separator);
        }
        joined.push_str(piece);
    }
    joined
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
