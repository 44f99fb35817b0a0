/// Snapshot of a scrollable container, all values in pixels
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    pub fn max_scroll_top(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }

    /// Visible bottom edge within `threshold` of the content bottom
    pub fn is_near_bottom(&self, threshold: f64) -> bool {
        self.scroll_top + self.client_height >= self.scroll_height - threshold
    }
}

pub trait ScrollContainer {
    fn metrics(&self) -> ScrollMetrics;

    fn set_scroll_top(&mut self, top: f64);

    fn scroll_to_bottom(&mut self) {
        let max = self.metrics().max_scroll_top();
        self.set_scroll_top(max);
    }
}

/// A container the typist writes into
pub trait TextContainer: ScrollContainer {
    /// Append `chunk` to the visible text of block `block`
    fn append(&mut self, block: usize, chunk: &str);

    /// Show the blinking insertion marker after `block`, or hide it
    fn set_cursor(&mut self, block: Option<usize>);
}

/// Whether the container should follow new content
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoScroll {
    enabled: bool,
    threshold: f64,
}

impl AutoScroll {
    pub fn new(threshold: f64) -> Self {
        Self {
            enabled: true,
            threshold,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Recompute from a scroll event; returns true when the flag flipped
    pub fn on_scroll(&mut self, metrics: &ScrollMetrics) -> bool {
        let enabled = metrics.is_near_bottom(self.threshold);
        let changed = enabled != self.enabled;
        self.enabled = enabled;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_scenario() {
        let mut auto = AutoScroll::new(10.0);

        auto.on_scroll(&ScrollMetrics::new(495.0, 1000.0, 500.0));
        assert!(auto.is_enabled());

        auto.on_scroll(&ScrollMetrics::new(400.0, 1000.0, 500.0));
        assert!(!auto.is_enabled());
    }

    #[test]
    fn test_threshold_boundary() {
        let mut auto = AutoScroll::new(10.0);

        // 490 + 500 == 1000 - 10
        assert!(!auto.on_scroll(&ScrollMetrics::new(490.0, 1000.0, 500.0)));
        assert!(auto.is_enabled());

        assert!(auto.on_scroll(&ScrollMetrics::new(489.0, 1000.0, 500.0)));
        assert!(!auto.is_enabled());

        assert!(auto.on_scroll(&ScrollMetrics::new(500.0, 1000.0, 500.0)));
        assert!(auto.is_enabled());
    }

    #[test]
    fn test_short_content_counts_as_bottom() {
        let mut auto = AutoScroll::new(10.0);
        auto.on_scroll(&ScrollMetrics::new(0.0, 100.0, 500.0));
        assert!(auto.is_enabled());
        assert_eq!(ScrollMetrics::new(0.0, 100.0, 500.0).max_scroll_top(), 0.0);
    }
}
