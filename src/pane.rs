use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::scroll::{ScrollContainer, ScrollMetrics, TextContainer};

/// Nominal pixel height of one terminal row, so scroll thresholds keep their meaning
pub const ROW_HEIGHT_PX: f64 = 16.0;

/// Scrollable, word-wrapped text area the typist writes into
#[derive(Debug, Default, Clone)]
pub struct TextPane {
    blocks: Vec<String>,
    /// wrapped rows per block, kept in step with `blocks` and `width`
    wrapped: Vec<Vec<String>>,
    cursor: Option<usize>,
    width: u16,
    height: u16,
    scroll_top: f64,
}

impl TextPane {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Inner size changed; keeps the scroll offset within range
    pub fn resize(&mut self, width: u16, height: u16) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        let rewrap = width != self.width;
        self.width = width;
        self.height = height;
        if rewrap {
            for i in 0..self.blocks.len() {
                self.rewrap(i);
            }
        }
        let top = self.scroll_top;
        self.set_scroll_top(top);
    }

    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    pub fn cursor_block(&self) -> Option<usize> {
        self.cursor
    }

    /// Wrapped rows; blocks are separated by an empty row
    pub fn rows(&self) -> Vec<String> {
        let mut rows = Vec::with_capacity(self.row_count());
        for (i, block) in self.wrapped.iter().enumerate() {
            if i > 0 {
                rows.push(String::new());
            }
            rows.extend(block.iter().cloned());
        }
        rows
    }

    pub fn row_count(&self) -> usize {
        let separators = self.wrapped.len().saturating_sub(1);
        self.wrapped.iter().map(Vec::len).sum::<usize>() + separators
    }

    /// First visible row
    pub fn row_offset(&self) -> u16 {
        (self.scroll_top / ROW_HEIGHT_PX).round() as u16
    }

    pub fn scroll_rows(&mut self, delta: i32) {
        let top = self.scroll_top + delta as f64 * ROW_HEIGHT_PX;
        self.set_scroll_top(top);
    }

    fn ensure_block(&mut self, block: usize) {
        if self.blocks.len() <= block {
            self.blocks.resize(block + 1, String::new());
            self.wrapped.resize(block + 1, vec![String::new()]);
        }
    }

    fn rewrap(&mut self, block: usize) {
        self.wrapped[block] = wrap(&self.blocks[block], self.width.max(1) as usize);
    }
}

impl ScrollContainer for TextPane {
    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(
            self.scroll_top,
            self.row_count() as f64 * ROW_HEIGHT_PX,
            self.height as f64 * ROW_HEIGHT_PX,
        )
    }

    fn set_scroll_top(&mut self, top: f64) {
        let max = self.metrics().max_scroll_top();
        self.scroll_top = top.clamp(0.0, max);
    }
}

impl TextContainer for TextPane {
    fn append(&mut self, block: usize, chunk: &str) {
        self.ensure_block(block);
        self.blocks[block].push_str(chunk);
        self.rewrap(block);
    }

    fn set_cursor(&mut self, block: Option<usize>) {
        if let Some(b) = block {
            self.ensure_block(b);
        }
        self.cursor = block;
    }
}

/// Greedy word wrap by display width; over-long words are split
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();

    for paragraph in text.split('\n') {
        let mut row = String::new();
        let mut row_width = 0;

        for word in paragraph.split(' ') {
            let word_width = word.width();
            let sep = usize::from(!row.is_empty());

            if row_width + sep + word_width <= width {
                if sep == 1 {
                    row.push(' ');
                }
                row.push_str(word);
                row_width += sep + word_width;
                continue;
            }

            if !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }

            for c in word.chars() {
                let cw = c.width().unwrap_or(0);
                if row_width + cw > width && !row.is_empty() {
                    rows.push(std::mem::take(&mut row));
                    row_width = 0;
                }
                row.push(c);
                row_width += cw;
            }
        }

        rows.push(row);
    }

    rows
}
