use rand::Rng;
use std::time::Duration;

use crate::cancel::CancellationToken;
use crate::config::LineSettings;
use crate::geometry::{Point, Rect, Viewport};
use crate::scheduler::{DelayRange, Scheduler};
use crate::signal_line::{LineState, SignalLine};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimatorEvent {
    Spawned { id: u64 },
    Arrived { id: u64 },
    Removed { id: u64 },
}

/// Brief highlight on the target; overlapping arrivals extend it
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlowState {
    until: Option<Duration>,
}

impl GlowState {
    pub fn trigger(&mut self, at: Duration, length: Duration) {
        let end = at + length;
        self.until = Some(self.until.map_or(end, |u| u.max(end)));
    }

    pub fn is_active(&self, now: Duration) -> bool {
        self.until.is_some_and(|u| now < u)
    }
}

/// Fixed target of every line: the avatar's centre at start-up
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Avatar {
    rect: Rect,
    target: Point,
}

impl Avatar {
    /// `scroll` is the page offset at initialisation and is baked into the target
    pub fn new(rect: Rect, scroll: Point) -> Self {
        let center = rect.center();
        Self {
            rect,
            target: Point::new(center.x + scroll.x, center.y + scroll.y),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn target(&self) -> Point {
        self.target
    }
}

#[derive(Debug)]
struct TrackedLine {
    line: SignalLine,
    last_state: LineState,
}

/// Spawns lines on a random schedule and retires them after their fade
#[derive(Debug)]
pub struct SignalAnimator<R: Rng> {
    settings: LineSettings,
    viewport: Viewport,
    avatar: Avatar,
    scheduler: Scheduler,
    rng: R,
    lines: Vec<TrackedLine>,
    glow: GlowState,
    next_id: u64,
}

impl<R: Rng> SignalAnimator<R> {
    pub fn new(
        settings: LineSettings,
        viewport: Viewport,
        avatar: Avatar,
        rng: R,
        token: CancellationToken,
    ) -> Self {
        let scheduler = Scheduler::new(DelayRange::from(&settings), token);
        Self {
            settings,
            viewport,
            avatar,
            scheduler,
            rng,
            lines: Vec::new(),
            glow: GlowState::default(),
            next_id: 0,
        }
    }

    pub fn start(&mut self, now: Duration) {
        self.scheduler.start(now, &mut self.rng);
    }

    /// Lines spawned after this see the new size; the target stays put
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn avatar(&self) -> Avatar {
        self.avatar
    }

    pub fn next_spawn(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    pub fn lines(&self) -> impl Iterator<Item = &SignalLine> {
        self.lines.iter().map(|t| &t.line)
    }

    pub fn is_glowing(&self, now: Duration) -> bool {
        self.glow.is_active(now)
    }

    /// Spawn one line immediately, outside the schedule
    pub fn spawn(&mut self, now: Duration) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let line = SignalLine::spawn(
            id,
            &mut self.rng,
            &self.viewport,
            self.avatar.target(),
            now,
            &self.settings,
        );
        log::debug!(
            "line {id} spawned with {} waypoints, length {:.1}",
            line.waypoints().len(),
            line.total_length()
        );
        self.lines.push(TrackedLine {
            line,
            last_state: LineState::Drawing,
        });
        id
    }

    /// Run every timer that came due up to `now`
    pub fn advance(&mut self, now: Duration) -> Vec<AnimatorEvent> {
        let mut events = Vec::new();

        if self.scheduler.is_stopped() {
            for tracked in self.lines.drain(..) {
                events.push(AnimatorEvent::Removed {
                    id: tracked.line.id(),
                });
            }
            return events;
        }

        for due in self.scheduler.poll(now, &mut self.rng) {
            let id = self.spawn(due);
            events.push(AnimatorEvent::Spawned { id });
        }

        let glow_length = self.settings.glow();
        for tracked in self.lines.iter_mut() {
            let state = tracked.line.state(now);
            let id = tracked.line.id();

            if tracked.last_state == LineState::Drawing && state != LineState::Drawing {
                log::debug!("line {id} reached the target");
                self.glow.trigger(tracked.line.arrives_at(), glow_length);
                events.push(AnimatorEvent::Arrived { id });
            }
            if state == LineState::Removed {
                log::trace!("line {id} removed");
                events.push(AnimatorEvent::Removed { id });
            }
            tracked.last_state = state;
        }
        self.lines.retain(|t| t.last_state != LineState::Removed);

        events
    }

    /// Stop scheduling and drop every in-flight line
    pub fn teardown(&mut self) -> usize {
        self.scheduler.stop();
        let dropped = self.lines.len();
        self.lines.clear();
        dropped
    }
}
