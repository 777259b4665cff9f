//! Token-window chunker
//!
//! Assembles ordered document splits into chunks that honor a min/max token
//! budget, carrying a bounded tail of each chunk into the next one so that
//! context survives the boundary.

use raq_core::{Error, Result, TokenCounter};

/// An atomic unit of text produced by document segmentation
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub text: String,
    pub token_count: usize,
}

impl Split {
    pub fn new(text: impl Into<String>, token_count: usize) -> Self {
        Self {
            text: text.into(),
            token_count,
        }
    }
}

/// A bounded group of splits forming one retrieval-sized unit.
///
/// `token_count` always equals the sum of the constituent splits' counts.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Constituent splits, in original document order
    pub splits: Vec<Split>,
    pub token_count: usize,
    /// Reserved for semantic boundary triggers; not produced by this chunker
    pub is_triggered: bool,
    /// Reserved for semantic boundary triggers; not produced by this chunker
    pub triggered_score: Option<f32>,
}

impl Chunk {
    fn new(splits: Vec<Split>, token_count: usize) -> Self {
        Self {
            splits,
            token_count,
            is_triggered: false,
            triggered_score: None,
        }
    }

    /// The chunk body as a single string
    pub fn text(&self) -> String {
        self.splits
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Granularity used when producing splits from raw text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMode {
    /// Split on sentence terminators (`.`, `!`, `?`)
    Sentence,
    /// Split on blank lines
    #[default]
    Paragraph,
}

/// Token budget for chunk assembly
#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    pub min_tokens: usize,
    pub max_tokens: usize,
    pub overlap_tokens: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            min_tokens: 100,
            max_tokens: 300,
            overlap_tokens: 50,
        }
    }
}

impl ChunkerConfig {
    /// Reject invalid budgets before any document is processed
    fn validate(&self) -> Result<()> {
        if self.min_tokens == 0 {
            return Err(Error::Configuration(
                "min_tokens must be greater than zero".to_string(),
            ));
        }
        if self.min_tokens > self.max_tokens {
            return Err(Error::Configuration(format!(
                "min_tokens ({}) must not exceed max_tokens ({})",
                self.min_tokens, self.max_tokens
            )));
        }
        if self.overlap_tokens >= self.max_tokens {
            return Err(Error::Configuration(format!(
                "overlap_tokens ({}) must be smaller than max_tokens ({})",
                self.overlap_tokens, self.max_tokens
            )));
        }
        Ok(())
    }
}

/// Single-pass greedy chunker over ordered splits.
///
/// Pure computation: no I/O, no shared state, safe to run for many documents
/// in parallel with one instance per task or a shared reference.
pub struct WindowChunker<C: TokenCounter> {
    counter: C,
    config: ChunkerConfig,
}

impl<C: TokenCounter> WindowChunker<C> {
    pub fn new(counter: C, config: ChunkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { counter, config })
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Produce splits from raw text, trimming and dropping empty pieces
    pub fn split_text(&self, text: &str, mode: SplitMode) -> Vec<Split> {
        let pieces: Vec<&str> = match mode {
            SplitMode::Sentence => text.split(['.', '!', '?']).collect(),
            SplitMode::Paragraph => text.split("\n\n").collect(),
        };

        pieces
            .into_iter()
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(|piece| Split::new(piece, self.counter.count(piece)))
            .collect()
    }

    /// Assemble splits into chunks in one left-to-right pass.
    ///
    /// A chunk closes when appending the next split would exceed
    /// `max_tokens` while the buffer already holds at least `min_tokens`;
    /// the closed chunk's tail (up to `overlap_tokens`) seeds the next
    /// buffer. A single split larger than `max_tokens` is appended whole —
    /// splits are never broken mid-split. No seeding happens at the final
    /// flush.
    pub fn chunk(&self, splits: &[Split]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current: Vec<Split> = Vec::new();
        let mut current_tokens = 0usize;

        for split in splits {
            if split.text.trim().is_empty() {
                continue;
            }
            let tokens = split.token_count;

            if current_tokens + tokens > self.config.max_tokens
                && current_tokens >= self.config.min_tokens
            {
                chunks.push(Chunk::new(current.clone(), current_tokens));
                let (seed, seed_tokens) = self.overlap_seed(&current);
                current = seed;
                current_tokens = seed_tokens;
            }

            current.push(split.clone());
            current_tokens += tokens;
        }

        if !current.is_empty() {
            chunks.push(Chunk::new(current, current_tokens));
        }

        chunks
    }

    /// Split then chunk in one call
    pub fn chunk_text(&self, text: &str, mode: SplitMode) -> Vec<Chunk> {
        let splits = self.split_text(text, mode);
        self.chunk(&splits)
    }

    /// Walk the closed chunk's tail backwards, keeping splits while the
    /// accumulated count stays within `overlap_tokens`. The walk stops at
    /// the first split that would exceed the bound, so a lone oversized
    /// trailing split yields an empty seed. Document order is restored.
    fn overlap_seed(&self, closed: &[Split]) -> (Vec<Split>, usize) {
        let mut seed: Vec<Split> = Vec::new();
        let mut seed_tokens = 0usize;

        for split in closed.iter().rev() {
            if seed_tokens + split.token_count <= self.config.overlap_tokens {
                seed.insert(0, split.clone());
                seed_tokens += split.token_count;
            } else {
                break;
            }
        }

        (seed, seed_tokens)
    }
}
