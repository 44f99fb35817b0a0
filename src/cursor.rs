use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 2-D translation applied to the decorative cursor element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Translation {
    pub x: f64,
    pub y: f64,
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "translate({}px, {}px)", self.x, self.y)
    }
}

/// Mirrors the latest pointer position, no smoothing or history
#[derive(Debug, Default)]
pub struct CursorTracker {
    position: Option<PointerPosition>,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_pointer_move(&mut self, position: PointerPosition) {
        self.position = Some(position);
    }

    pub fn position(&self) -> Option<PointerPosition> {
        self.position
    }

    pub fn translation(&self) -> Option<Translation> {
        self.position.map(|p| Translation { x: p.x, y: p.y })
    }
}
