//! Chunk construction strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`TitleChunker`] — groups content elements between successive headings,
//!   preserving document structure as chunk boundaries
//! - [`WindowChunker`] — splits page text into fixed-size windows with
//!   overlap carried between consecutive windows of the same page
//!
//! Both strategies feed candidate text through the same quality gate
//! ([`passes_quality`](crate::normalize::passes_quality)) before a
//! [`Chunk`] is materialized: a rejected candidate is never constructed,
//! only counted.

use std::sync::Arc;

use tracing::debug;

use crate::config::{ChunkStrategy, ChunkingConfig, QualityConfig};
use crate::document::{Chunk, ContentElement, ElementKind};
use crate::normalize::{clean_text, passes_quality};

/// A strategy for building chunks from parsed content elements.
///
/// Implementations attach provenance (`source`, `page`, `sequence_index`)
/// and apply the shared quality gate; they never produce a chunk whose text
/// fails it.
pub trait Chunker: Send + Sync {
    /// Build chunks for one document.
    ///
    /// `sequence_index` is monotonic per source, starting at 0, counting
    /// only accepted chunks.
    fn chunk(&self, source: &str, elements: &[ContentElement], quality: &QualityConfig)
    -> Vec<Chunk>;
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Collects candidate texts, applying the quality gate and numbering the
/// survivors. Shared by both strategies so the gate logic exists once.
struct ChunkCollector<'a> {
    source: &'a str,
    quality: &'a QualityConfig,
    chunks: Vec<Chunk>,
    rejected: usize,
}

impl<'a> ChunkCollector<'a> {
    fn new(source: &'a str, quality: &'a QualityConfig) -> Self {
        Self { source, quality, chunks: Vec::new(), rejected: 0 }
    }

    /// Clean `raw`, gate it, and either materialize a chunk or count a
    /// rejection.
    fn push(&mut self, raw: &str, page: Option<u32>) {
        let cleaned = clean_text(raw);
        if !passes_quality(&cleaned, self.quality) {
            self.rejected += 1;
            return;
        }
        let sequence_index = self.chunks.len();
        self.chunks.push(Chunk {
            text: cleaned,
            source: self.source.to_string(),
            page,
            sequence_index,
        });
    }

    fn finish(self, strategy: &str) -> Vec<Chunk> {
        debug!(
            source = self.source,
            strategy,
            accepted = self.chunks.len(),
            rejected = self.rejected,
            "chunking complete"
        );
        self.chunks
    }
}

// ── Title-delimited strategy ───────────────────────────────────────

/// Groups elements between successive title elements into chunks.
///
/// A new chunk starts at every [`Title`](ElementKind::Title) element, when
/// the accumulated text passes `new_after_n_chars`, or when appending an
/// element would exceed the `max_characters` hard cap. Trailing fragments
/// shorter than `combine_text_under_n_chars` are merged into the previous
/// chunk when the merge stays within the hard cap.
#[derive(Debug, Clone)]
pub struct TitleChunker {
    max_characters: usize,
    new_after_n_chars: usize,
    combine_text_under_n_chars: usize,
}

impl TitleChunker {
    /// Create a `TitleChunker` from the chunking configuration.
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            max_characters: config.max_characters,
            new_after_n_chars: config.new_after_n_chars,
            combine_text_under_n_chars: config.combine_text_under_n_chars,
        }
    }

    /// Accumulate elements into raw sections bounded by titles and size caps.
    fn sections(&self, elements: &[ContentElement]) -> Vec<(String, Option<u32>)> {
        let mut sections: Vec<(String, Option<u32>)> = Vec::new();
        let mut current = String::new();
        let mut current_page: Option<u32> = None;

        for element in elements {
            let text = element.text.trim();
            if text.is_empty() {
                continue;
            }

            let closes_section = element.kind == ElementKind::Title
                || (!current.is_empty()
                    && char_len(&current) + 2 + char_len(text) > self.max_characters);
            if closes_section && !current.is_empty() {
                sections.push((std::mem::take(&mut current), current_page));
            }

            if current.is_empty() {
                current_page = element.page;
                current.push_str(text);
            } else {
                current.push_str("\n\n");
                current.push_str(text);
            }

            // A single oversized element still has to respect the hard cap.
            while char_len(&current) > self.max_characters {
                let cut = current
                    .char_indices()
                    .nth(self.max_characters)
                    .map_or(current.len(), |(i, _)| i);
                let rest = current.split_off(cut);
                sections.push((std::mem::replace(&mut current, rest), current_page));
            }

            if char_len(&current) > self.new_after_n_chars {
                sections.push((std::mem::take(&mut current), current_page));
            }
        }

        if !current.is_empty() {
            sections.push((current, current_page));
        }

        sections
    }

    /// Merge fragments below `combine_text_under_n_chars` into their
    /// predecessor, without breaching the hard cap.
    fn combine_small(&self, sections: Vec<(String, Option<u32>)>) -> Vec<(String, Option<u32>)> {
        let mut combined: Vec<(String, Option<u32>)> = Vec::new();
        for (text, page) in sections {
            if char_len(&text) < self.combine_text_under_n_chars {
                if let Some((prev, _)) = combined.last_mut() {
                    if char_len(prev) + 2 + char_len(&text) <= self.max_characters {
                        prev.push_str("\n\n");
                        prev.push_str(&text);
                        continue;
                    }
                }
            }
            combined.push((text, page));
        }
        combined
    }
}

impl Chunker for TitleChunker {
    fn chunk(
        &self,
        source: &str,
        elements: &[ContentElement],
        quality: &QualityConfig,
    ) -> Vec<Chunk> {
        let mut collector = ChunkCollector::new(source, quality);
        for (raw, page) in self.combine_small(self.sections(elements)) {
            collector.push(&raw, page);
        }
        collector.finish("title")
    }
}

// ── Fixed-window strategy ──────────────────────────────────────────

/// Splits page-level text into windows of at most `chunk_size` characters.
///
/// Boundaries are chosen by a priority list of separators (paragraph break,
/// line break, sentence terminator, space, hard cut). The last
/// `chunk_overlap` characters of a window are carried into the next window
/// of the same page, preserving context across a cut. Pages whose cleaned
/// text is under `min_page_chars` are skipped before splitting.
#[derive(Debug, Clone)]
pub struct WindowChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

/// Boundary priority for [`WindowChunker`]. The implicit final level is a
/// hard character cut.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

impl WindowChunker {
    /// Create a `WindowChunker` from the chunking configuration.
    pub fn new(config: &ChunkingConfig) -> Self {
        Self { chunk_size: config.chunk_size, chunk_overlap: config.chunk_overlap }
    }

    /// Split a page into windows, carrying overlap between consecutive
    /// windows.
    fn windows(&self, text: &str) -> Vec<String> {
        let segments = decompose(text, self.chunk_size, &SEPARATORS);

        let mut windows = Vec::new();
        let mut current = String::new();
        for segment in segments {
            if !current.is_empty() && char_len(&current) + char_len(&segment) > self.chunk_size {
                let carried = overlap_tail(&current, self.chunk_overlap);
                windows.push(std::mem::replace(&mut current, carried));
            }
            current.push_str(&segment);
        }
        if !current.is_empty() {
            windows.push(current);
        }
        windows
    }
}

impl Chunker for WindowChunker {
    fn chunk(
        &self,
        source: &str,
        elements: &[ContentElement],
        quality: &QualityConfig,
    ) -> Vec<Chunk> {
        // Group element text by page, preserving document order.
        let mut pages: Vec<(Option<u32>, String)> = Vec::new();
        for element in elements {
            match pages.last_mut() {
                Some((page, text)) if *page == element.page => {
                    text.push_str("\n\n");
                    text.push_str(&element.text);
                }
                _ => pages.push((element.page, element.text.clone())),
            }
        }

        let mut collector = ChunkCollector::new(source, quality);
        for (page, raw) in pages {
            if char_len(&clean_text(&raw)) < quality.min_page_chars {
                debug!(source, ?page, "skipping page below minimum length");
                continue;
            }
            for window in self.windows(&raw) {
                collector.push(&window, page);
            }
        }
        collector.finish("window")
    }
}

/// Build the chunking strategy named by the configuration.
pub fn chunker_from_config(config: &ChunkingConfig) -> Arc<dyn Chunker> {
    match config.strategy {
        ChunkStrategy::Title => Arc::new(TitleChunker::new(config)),
        ChunkStrategy::Window => Arc::new(WindowChunker::new(config)),
    }
}

/// Recursively split `text` into segments no longer than `limit`, trying
/// each separator in priority order and falling back to a hard cut.
/// Separators stay attached to the preceding segment so that joining
/// segments reproduces the original text.
fn decompose(text: &str, limit: usize, separators: &[&str]) -> Vec<String> {
    if char_len(text) <= limit {
        return vec![text.to_string()];
    }
    let Some((separator, rest)) = separators.split_first() else {
        return hard_cut(text, limit);
    };

    let parts = split_keeping_separator(text, separator);
    if parts.len() <= 1 {
        return decompose(text, limit, rest);
    }

    let mut segments = Vec::new();
    for part in parts {
        if char_len(part) > limit {
            segments.extend(decompose(part, limit, rest));
        } else {
            segments.push(part.to_string());
        }
    }
    segments
}

/// Split at every occurrence of `separator`, keeping it attached to the
/// preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        parts.push(&text[start..end]);
        start = end;
    }
    if start < text.len() {
        parts.push(&text[start..]);
    }
    parts
}

/// Cut into pieces of exactly `limit` characters (the last may be shorter).
fn hard_cut(text: &str, limit: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut remaining = text;
    while char_len(remaining) > limit {
        let cut = remaining.char_indices().nth(limit).map_or(remaining.len(), |(i, _)| i);
        pieces.push(remaining[..cut].to_string());
        remaining = &remaining[cut..];
    }
    if !remaining.is_empty() {
        pieces.push(remaining.to_string());
    }
    pieces
}

/// The trailing `overlap` characters of `text`, aligned to a char boundary.
fn overlap_tail(text: &str, overlap: usize) -> String {
    if overlap == 0 {
        return String::new();
    }
    let total = char_len(text);
    if total <= overlap {
        return text.to_string();
    }
    let cut = text.char_indices().nth(total - overlap).map_or(0, |(i, _)| i);
    text[cut..].to_string()
}
