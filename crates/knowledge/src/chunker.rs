//! Newline-aware text chunking with character-based size and overlap.
//!
//! Lines are merged greedily up to `chunk_size` characters. When a chunk is
//! emitted, the next one re-uses trailing lines of the previous chunk whose
//! total length fits in `overlap`. A line longer than `chunk_size` is cut into
//! character windows that repeat exactly `overlap` characters.
//!
//! Every chunk is an exact slice of the input. The newline between two
//! non-overlapping chunks belongs to neither. Blank lines never start or end a
//! chunk, though they count toward its size when they sit between two lines
//! of the same chunk.

use crate::types::Chunk;
use docchat_core::{AppError, AppResult, RetrievalConfig};
use std::collections::VecDeque;
use std::ops::Range;

/// Default maximum chunk length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default characters shared between consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

const SEPARATOR: char = '\n';

/// Validated chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl ChunkConfig {
    /// Validate raw (possibly negative) values.
    ///
    /// Requires `chunk_size > 0` and `0 <= overlap < chunk_size`.
    pub fn new(chunk_size: i64, overlap: i64) -> AppResult<Self> {
        if chunk_size <= 0 {
            return Err(AppError::Config(format!(
                "chunk size must be greater than zero, got {}",
                chunk_size
            )));
        }

        if overlap < 0 {
            return Err(AppError::Config(format!(
                "chunk overlap must not be negative, got {}",
                overlap
            )));
        }

        if overlap >= chunk_size {
            return Err(AppError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size: chunk_size as usize,
            overlap: overlap as usize,
        })
    }

    /// Validate the chunking section of the application config.
    pub fn from_retrieval(config: &RetrievalConfig) -> AppResult<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Splits document text into overlapping chunks.
#[derive(Debug, Clone)]
pub struct TextChunker {
    config: ChunkConfig,
}

impl TextChunker {
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ChunkConfig {
        self.config
    }

    /// Split text into chunks numbered in document order.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = self
            .split_spans(text)
            .into_iter()
            .enumerate()
            .map(|(source_order, byte_range)| Chunk {
                id: source_order as u64,
                text: text[byte_range.clone()].to_string(),
                source_order,
                byte_range,
            })
            .collect();

        tracing::debug!(
            "Chunked {} bytes into {} chunks (size: {}, overlap: {})",
            text.len(),
            chunks.len(),
            self.config.chunk_size,
            self.config.overlap
        );

        chunks
    }

    /// Byte ranges of the chunks [`split`](Self::split) would produce.
    pub fn split_spans(&self, text: &str) -> Vec<Range<usize>> {
        let ChunkConfig {
            chunk_size,
            overlap,
        } = self.config;

        let mut spans = Vec::new();
        // Lines of the chunk being assembled
        let mut window: VecDeque<WindowLine> = VecDeque::new();
        let mut total = 0usize;

        for line in line_spans(text) {
            // Blank lines only ever separate chunks
            if text[line.clone()].trim().is_empty() {
                continue;
            }

            let len = text[line.clone()].chars().count();

            if len > chunk_size {
                push_window(text, &window, &mut spans);
                window.clear();
                total = 0;
                self.split_long_line(text, line, &mut spans);
                continue;
            }

            if !window.is_empty() && total + gap_before(text, &window, &line) + len > chunk_size {
                push_window(text, &window, &mut spans);

                while total > overlap
                    || (!window.is_empty() && total + gap_before(text, &window, &line) + len > chunk_size)
                {
                    let Some(first) = window.pop_front() else {
                        break;
                    };
                    total -= first.len;
                    if let Some(next) = window.front_mut() {
                        total -= next.gap;
                        next.gap = 0;
                    }
                }
            }

            let gap = gap_before(text, &window, &line);
            total += gap + len;
            window.push_back(WindowLine {
                range: line,
                len,
                gap,
            });
        }

        push_window(text, &window, &mut spans);
        spans
    }

    /// Cut a single oversized line into windows of at most `chunk_size`
    /// characters, each starting `overlap` characters before the previous end.
    fn split_long_line(&self, text: &str, line: Range<usize>, spans: &mut Vec<Range<usize>>) {
        let ChunkConfig {
            chunk_size,
            overlap,
        } = self.config;

        let segment = &text[line.clone()];
        let chars: Vec<char> = segment.chars().collect();
        let mut offsets: Vec<usize> = segment.char_indices().map(|(i, _)| i).collect();
        offsets.push(segment.len());

        let n = chars.len();
        let mut start = 0;

        loop {
            if n - start <= chunk_size {
                push_span(text, line.start + offsets[start]..line.start + offsets[n], spans);
                break;
            }

            let hard_end = start + chunk_size;
            // Prefer ending right after whitespace, keeping the window longer than the overlap
            let end = (start + overlap + 1..=hard_end)
                .rev()
                .find(|&p| chars[p - 1].is_whitespace())
                .unwrap_or(hard_end);

            push_span(text, line.start + offsets[start]..line.start + offsets[end], spans);
            start = end - overlap;
        }
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(ChunkConfig::default())
    }
}

/// Split `text` into chunk strings after validating the parameters.
pub fn split(text: &str, chunk_size: i64, overlap: i64) -> AppResult<Vec<String>> {
    let chunker = TextChunker::new(ChunkConfig::new(chunk_size, overlap)?);
    Ok(chunker
        .split_spans(text)
        .into_iter()
        .map(|range| text[range].to_string())
        .collect())
}

fn line_spans(text: &str) -> impl Iterator<Item = Range<usize>> + '_ {
    let mut start = 0;
    text.split(SEPARATOR).map(move |line| {
        let range = start..start + line.len();
        start = range.end + SEPARATOR.len_utf8();
        range
    })
}

/// A non-blank line in the chunk being assembled.
struct WindowLine {
    range: Range<usize>,
    /// Characters in the line
    len: usize,
    /// Characters between the previous line in the window and this one
    gap: usize,
}

/// Characters separating the window's last line from `line`, zero when empty.
fn gap_before(text: &str, window: &VecDeque<WindowLine>, line: &Range<usize>) -> usize {
    window
        .back()
        .map(|last| text[last.range.end..line.start].chars().count())
        .unwrap_or(0)
}

fn push_window(text: &str, window: &VecDeque<WindowLine>, spans: &mut Vec<Range<usize>>) {
    if let (Some(first), Some(last)) = (window.front(), window.back()) {
        push_span(text, first.range.start..last.range.end, spans);
    }
}

fn push_span(text: &str, range: Range<usize>, spans: &mut Vec<Range<usize>>) {
    if !text[range.clone()].trim().is_empty() {
        spans.push(range);
    }
}
