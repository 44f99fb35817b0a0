use rand::Rng;
use std::time::Duration;

use crate::config::LineSettings;
use crate::geometry::{Point, Polyline, Viewport};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum LineState {
    /// stroke grows while the marker travels
    Drawing,
    /// marker has reached the target, fade not yet stepped
    Signaling,
    Fading,
    Removed,
}

/// Durations a line's lifecycle is measured against
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineTiming {
    pub travel: Duration,
    pub fade_interval: Duration,
    pub fade_steps: u32,
}

impl From<&LineSettings> for LineTiming {
    fn from(s: &LineSettings) -> Self {
        Self {
            travel: s.travel(),
            fade_interval: s.fade_interval(),
            fade_steps: s.fade_steps.max(1),
        }
    }
}

/// Random path from a viewport edge to `target`.
///
/// Each turn moves only the x or the y coordinate (fair coin) to a value
/// strictly between the current one and the target's, so every segment up
/// to the last turn point is axis-aligned. The final waypoint is `target`.
pub fn generate_waypoints<R: Rng + ?Sized>(
    rng: &mut R,
    viewport: &Viewport,
    target: Point,
    max_turns: u32,
) -> Vec<Point> {
    let (_, start) = viewport.random_edge_point(rng);
    let turns = rng.gen_range(0..=max_turns);

    let mut points = Vec::with_capacity(turns as usize + 2);
    points.push(start);

    let mut current = start;
    for _ in 0..turns {
        if rng.gen_bool(0.5) {
            current.x = between(rng, current.x, target.x);
        } else {
            current.y = between(rng, current.y, target.y);
        }
        points.push(current);
    }

    points.push(target);
    points
}

fn between<R: Rng + ?Sized>(rng: &mut R, from: f64, to: f64) -> f64 {
    let t = rng.gen_range(f64::EPSILON..1.0);
    from + (to - from) * t
}

/// One animated line; everything visible is derived from a single progress value
#[derive(Clone, Debug)]
pub struct SignalLine {
    id: u64,
    path: Polyline,
    created_at: Duration,
    timing: LineTiming,
}

impl SignalLine {
    pub fn new(id: u64, waypoints: Vec<Point>, created_at: Duration, timing: LineTiming) -> Self {
        Self {
            id,
            path: Polyline::new(waypoints),
            created_at,
            timing,
        }
    }

    pub fn spawn<R: Rng + ?Sized>(
        id: u64,
        rng: &mut R,
        viewport: &Viewport,
        target: Point,
        now: Duration,
        settings: &LineSettings,
    ) -> Self {
        let waypoints = generate_waypoints(rng, viewport, target, settings.max_turns);
        Self::new(id, waypoints, now, LineTiming::from(settings))
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn waypoints(&self) -> &[Point] {
        self.path.points()
    }

    pub fn total_length(&self) -> f64 {
        self.path.total_length()
    }

    pub fn created_at(&self) -> Duration {
        self.created_at
    }

    pub fn arrives_at(&self) -> Duration {
        self.created_at + self.timing.travel
    }

    pub fn removed_at(&self) -> Duration {
        self.arrives_at() + self.timing.fade_interval * self.timing.fade_steps
    }

    /// Linear progress in `[0, 1]`
    pub fn progress(&self, now: Duration) -> f64 {
        let elapsed = now.saturating_sub(self.created_at).as_secs_f64();
        (elapsed / self.timing.travel.as_secs_f64()).min(1.0)
    }

    pub fn drawn_length(&self, now: Duration) -> f64 {
        self.total_length() * self.progress(now)
    }

    /// Dash offset of the stroke: full length before start, zero on arrival
    pub fn dash_offset(&self, now: Duration) -> f64 {
        self.total_length() - self.drawn_length(now)
    }

    pub fn marker_position(&self, now: Duration) -> Option<Point> {
        self.path.point_at(self.drawn_length(now))
    }

    pub fn drawn_segments(&self, now: Duration) -> Vec<(Point, Point)> {
        self.path.prefix(self.drawn_length(now))
    }

    /// Fade steps taken so far, capped at the step count
    pub fn fade_step(&self, now: Duration) -> u32 {
        let arrival = self.arrives_at();
        if now < arrival {
            return 0;
        }
        if self.timing.fade_interval.is_zero() {
            return self.timing.fade_steps;
        }
        let since = (now - arrival).as_nanos() / self.timing.fade_interval.as_nanos();
        since.min(self.timing.fade_steps as u128) as u32
    }

    pub fn opacity(&self, now: Duration) -> f64 {
        1.0 - self.fade_step(now) as f64 / self.timing.fade_steps as f64
    }

    pub fn state(&self, now: Duration) -> LineState {
        if now < self.arrives_at() {
            return LineState::Drawing;
        }
        match self.fade_step(now) {
            0 => LineState::Signaling,
            step if step >= self.timing.fade_steps => LineState::Removed,
            _ => LineState::Fading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn straight_line() -> SignalLine {
        SignalLine::new(
            1,
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(100.0, 100.0)],
            ms(1000),
            LineTiming::from(&LineSettings::default()),
        )
    }

    fn shares_exactly_one_coordinate(a: &Point, b: &Point) -> bool {
        (a.x == b.x) != (a.y == b.y)
    }

    #[test]
    fn test_waypoints_start_on_edge_and_end_on_target() {
        let viewport = Viewport::new(1280.0, 720.0);
        let target = Point::new(900.0, 300.0);
        let mut rng = StdRng::seed_from_u64(2024);

        for _ in 0..500 {
            let points = generate_waypoints(&mut rng, &viewport, target, 2);

            assert!(viewport.is_on_edge(&points[0]), "{:?}", points[0]);
            assert_eq!(*points.last().unwrap(), target);

            let turns = points.len() - 2;
            assert!(turns <= 2);

            for pair in points[..points.len() - 1].windows(2) {
                assert!(
                    shares_exactly_one_coordinate(&pair[0], &pair[1]),
                    "{:?} -> {:?}",
                    pair[0],
                    pair[1]
                );
            }
        }
    }

    #[test]
    fn test_turns_move_towards_target() {
        let viewport = Viewport::new(1280.0, 720.0);
        let target = Point::new(640.0, 360.0);
        let mut rng = StdRng::seed_from_u64(77);

        for _ in 0..500 {
            let points = generate_waypoints(&mut rng, &viewport, target, 2);
            for pair in points.windows(2) {
                let (prev, next) = (pair[0], pair[1]);
                assert!(prev.x.min(target.x) <= next.x && next.x <= prev.x.max(target.x));
                assert!(prev.y.min(target.y) <= next.y && next.y <= prev.y.max(target.y));
            }
        }
    }

    #[test]
    fn test_every_turn_count_occurs() {
        let viewport = Viewport::new(800.0, 600.0);
        let target = Point::new(400.0, 300.0);
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = [false; 3];

        for _ in 0..300 {
            let points = generate_waypoints(&mut rng, &viewport, target, 2);
            seen[points.len() - 2] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn test_zero_max_turns_goes_straight() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(0);
        let points = generate_waypoints(&mut rng, &viewport, Point::new(1.0, 2.0), 0);
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_same_seed_same_path() {
        let viewport = Viewport::new(800.0, 600.0);
        let target = Point::new(400.0, 300.0);
        let a = generate_waypoints(&mut StdRng::seed_from_u64(5), &viewport, target, 2);
        let b = generate_waypoints(&mut StdRng::seed_from_u64(5), &viewport, target, 2);
        assert_eq!(a, b);
    }

    #[test]
    fn test_progress_is_linear_and_clamped() {
        let line = straight_line();

        assert_eq!(line.total_length(), 200.0);
        assert_eq!(line.progress(ms(0)), 0.0);
        assert_eq!(line.progress(ms(1000)), 0.0);
        assert_eq!(line.progress(ms(2000)), 0.25);
        assert_eq!(line.progress(ms(5000)), 1.0);
        assert_eq!(line.progress(ms(9000)), 1.0);

        assert_eq!(line.drawn_length(ms(3000)), 100.0);
        assert_eq!(line.dash_offset(ms(3000)), 100.0);
        assert_eq!(line.dash_offset(ms(1000)), 200.0);
        assert_eq!(line.dash_offset(ms(5000)), 0.0);
    }

    #[test]
    fn test_marker_follows_drawn_stroke() {
        let line = straight_line();

        assert_eq!(line.marker_position(ms(1000)), Some(Point::new(0.0, 0.0)));
        assert_eq!(line.marker_position(ms(3000)), Some(Point::new(100.0, 0.0)));
        assert_eq!(line.marker_position(ms(4000)), Some(Point::new(100.0, 50.0)));
        assert_eq!(line.marker_position(ms(5000)), Some(Point::new(100.0, 100.0)));

        let segments = line.drawn_segments(ms(4000));
        assert_eq!(segments.last().unwrap().1, line.marker_position(ms(4000)).unwrap());
    }

    #[test]
    fn test_lifecycle() {
        let line = straight_line();
        // arrival at 5000ms, 20 fade steps of 20ms
        assert_eq!(line.arrives_at(), ms(5000));
        assert_eq!(line.removed_at(), ms(5400));

        assert_eq!(line.state(ms(1000)), LineState::Drawing);
        assert_eq!(line.state(ms(4999)), LineState::Drawing);
        assert_eq!(line.state(ms(5000)), LineState::Signaling);
        assert_eq!(line.state(ms(5019)), LineState::Signaling);
        assert_eq!(line.state(ms(5020)), LineState::Fading);
        assert_eq!(line.state(ms(5399)), LineState::Fading);
        assert_eq!(line.state(ms(5400)), LineState::Removed);
    }

    #[test]
    fn test_opacity_ramp() {
        let line = straight_line();

        assert_eq!(line.opacity(ms(3000)), 1.0);
        assert_eq!(line.opacity(ms(5000)), 1.0);
        assert_eq!(line.opacity(ms(5020)), 0.95);
        assert_eq!(line.opacity(ms(5200)), 0.5);
        assert_eq!(line.opacity(ms(5400)), 0.0);
        assert_eq!(line.opacity(ms(9000)), 0.0);
    }
}
