use rand::Rng;
use std::time::Duration;

use crate::cancel::CancellationToken;
use crate::chunker::{chunk_len, chunk_text, ChunkRules};
use crate::config::TypistSettings;
use crate::scroll::{AutoScroll, ScrollContainer, ScrollMetrics, TextContainer};
use crate::text::TextSource;

/// Chunks of one source block and how much of it is visible
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    chunks: Vec<String>,
    next: usize,
    revealed: String,
}

impl TextBlock {
    pub fn new(chunks: Vec<String>) -> Self {
        Self {
            chunks,
            next: 0,
            revealed: String::new(),
        }
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn revealed(&self) -> &str {
        &self.revealed
    }

    pub fn is_complete(&self) -> bool {
        self.next >= self.chunks.len()
    }

    fn take_next(&mut self) -> Option<String> {
        let chunk = self.chunks.get(self.next)?.clone();
        self.next += 1;
        self.revealed.push_str(&chunk);
        Some(chunk)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TypistPhase {
    Idle,
    Typing {
        block: usize,
        next_chunk_at: Duration,
    },
    Pausing {
        next_block: usize,
        resume_at: Duration,
    },
    Finished,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypistEvent {
    BlockStarted { block: usize },
    ChunkRevealed { block: usize, chunk: String },
    BlockCompleted { block: usize },
    AutoScrollChanged { enabled: bool },
    Finished,
    Cancelled,
}

/// Reveals text blocks strictly one after another, a chunk at a time
#[derive(Debug)]
pub struct Typist<R: Rng> {
    sources: Vec<TextSource>,
    blocks: Vec<TextBlock>,
    settings: TypistSettings,
    rules: ChunkRules,
    rng: R,
    phase: TypistPhase,
    auto_scroll: AutoScroll,
    token: CancellationToken,
}

impl<R: Rng> Typist<R> {
    pub fn new(
        sources: Vec<TextSource>,
        settings: TypistSettings,
        rng: R,
        token: CancellationToken,
    ) -> Self {
        Self {
            sources,
            blocks: Vec::new(),
            rules: ChunkRules::from(&settings),
            auto_scroll: AutoScroll::new(settings.scroll_threshold_px),
            settings,
            rng,
            phase: TypistPhase::Idle,
            token,
        }
    }

    pub fn phase(&self) -> TypistPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == TypistPhase::Finished
    }

    pub fn auto_scroll(&self) -> bool {
        self.auto_scroll.is_enabled()
    }

    /// Blocks started so far, in order
    pub fn blocks(&self) -> &[TextBlock] {
        &self.blocks
    }

    /// Feed a scroll event of the container
    pub fn on_scroll(&mut self, metrics: &ScrollMetrics) -> Option<TypistEvent> {
        if self.auto_scroll.on_scroll(metrics) {
            let enabled = self.auto_scroll.is_enabled();
            log::debug!("auto-scroll {}", if enabled { "resumed" } else { "paused" });
            Some(TypistEvent::AutoScrollChanged { enabled })
        } else {
            None
        }
    }

    pub fn start<C: TextContainer>(
        &mut self,
        now: Duration,
        container: &mut C,
    ) -> Vec<TypistEvent> {
        let mut events = Vec::new();
        if self.phase == TypistPhase::Idle {
            self.begin_block(0, now, container, &mut events);
        }
        events
    }

    /// Reveal every chunk that came due up to `now`
    pub fn advance<C: TextContainer>(
        &mut self,
        now: Duration,
        container: &mut C,
    ) -> Vec<TypistEvent> {
        let mut events = Vec::new();

        if self.token.is_cancelled()
            && !matches!(self.phase, TypistPhase::Finished | TypistPhase::Cancelled)
        {
            container.set_cursor(None);
            self.phase = TypistPhase::Cancelled;
            events.push(TypistEvent::Cancelled);
            return events;
        }

        loop {
            match self.phase {
                TypistPhase::Typing {
                    block,
                    next_chunk_at,
                } if now >= next_chunk_at => {
                    self.reveal_chunk(block, next_chunk_at, container, &mut events);
                }
                TypistPhase::Pausing {
                    next_block,
                    resume_at,
                } if now >= resume_at => {
                    self.begin_block(next_block, resume_at, container, &mut events);
                }
                _ => break,
            }
        }

        events
    }

    fn begin_block<C: TextContainer>(
        &mut self,
        index: usize,
        at: Duration,
        container: &mut C,
        events: &mut Vec<TypistEvent>,
    ) {
        let Some(source) = self.sources.get(index) else {
            log::info!("typist finished {} blocks", self.blocks.len());
            self.phase = TypistPhase::Finished;
            events.push(TypistEvent::Finished);
            return;
        };

        let chunks = chunk_text(source.source_text(), &self.rules, &mut self.rng);
        log::debug!("block {index} started with {} chunks", chunks.len());
        self.blocks.push(TextBlock::new(chunks));

        container.set_cursor(Some(index));
        self.phase = TypistPhase::Typing {
            block: index,
            next_chunk_at: at,
        };
        events.push(TypistEvent::BlockStarted { block: index });
    }

    fn reveal_chunk<C: TextContainer>(
        &mut self,
        block: usize,
        at: Duration,
        container: &mut C,
        events: &mut Vec<TypistEvent>,
    ) {
        let Some(chunk) = self.blocks[block].take_next() else {
            self.complete_block(block, at, container, events);
            return;
        };

        container.append(block, &chunk);
        let delay = self.settings.chunk_delay(chunk_len(&chunk));
        events.push(TypistEvent::ChunkRevealed { block, chunk });

        if self.auto_scroll.is_enabled() {
            container.scroll_to_bottom();
            if let Some(event) = self.on_scroll(&container.metrics()) {
                events.push(event);
            }
        }

        if self.blocks[block].is_complete() {
            self.complete_block(block, at, container, events);
        } else {
            self.phase = TypistPhase::Typing {
                block,
                next_chunk_at: at + delay,
            };
        }
    }

    fn complete_block<C: TextContainer>(
        &mut self,
        block: usize,
        at: Duration,
        container: &mut C,
        events: &mut Vec<TypistEvent>,
    ) {
        container.set_cursor(None);
        log::debug!("block {block} complete");
        self.phase = TypistPhase::Pausing {
            next_block: block + 1,
            resume_at: at + self.settings.block_pause(),
        };
        events.push(TypistEvent::BlockCompleted { block });
    }
}
