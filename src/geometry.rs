use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// point `t` of the way from `self` to `other`
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point { x: v.0, y: v.1 }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Visible drawing area, origin in the top-left corner
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, p: &Point) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }

    /// True if `p` lies on one of the four borders
    pub fn is_on_edge(&self, p: &Point) -> bool {
        self.contains(p)
            && (p.x == 0.0 || p.y == 0.0 || p.x == self.width || p.y == self.height)
    }

    /// Uniformly random edge, then a uniformly random position along it
    pub fn random_edge_point<R: Rng + ?Sized>(&self, rng: &mut R) -> (Edge, Point) {
        let edge = match rng.gen_range(0..4) {
            0 => Edge::Top,
            1 => Edge::Right,
            2 => Edge::Bottom,
            _ => Edge::Left,
        };
        let point = match edge {
            Edge::Top => Point::new(rng.gen::<f64>() * self.width, 0.0),
            Edge::Right => Point::new(self.width, rng.gen::<f64>() * self.height),
            Edge::Bottom => Point::new(rng.gen::<f64>() * self.width, self.height),
            Edge::Left => Point::new(0.0, rng.gen::<f64>() * self.height),
        };
        (edge, point)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Axis-aware rectangle, used for the avatar's bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// An open path through an ordered list of points
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    points: Vec<Point>,
    total_length: f64,
}

impl Polyline {
    pub fn new(points: Vec<Point>) -> Self {
        let total_length = points
            .iter()
            .tuple_windows()
            .map(|(a, b)| a.distance(b))
            .sum();
        Self {
            points,
            total_length,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Point at arc distance `distance` from the start, clamped to the ends
    pub fn point_at(&self, distance: f64) -> Option<Point> {
        let first = *self.points.first()?;
        if distance <= 0.0 {
            return Some(first);
        }

        let mut remaining = distance;
        for (a, b) in self.points.iter().tuple_windows() {
            let len = a.distance(b);
            if remaining <= len {
                if len == 0.0 {
                    return Some(*b);
                }
                return Some(a.lerp(b, remaining / len));
            }
            remaining -= len;
        }

        self.points.last().copied()
    }

    /// Segments covering the first `distance` units of the path
    pub fn prefix(&self, distance: f64) -> Vec<(Point, Point)> {
        let mut segments = Vec::new();
        let mut remaining = distance;

        for (a, b) in self.points.iter().tuple_windows() {
            if remaining <= 0.0 {
                break;
            }
            let len = a.distance(b);
            if remaining >= len {
                segments.push((*a, *b));
            } else {
                segments.push((*a, a.lerp(b, remaining / len)));
            }
            remaining -= len;
        }

        segments
    }
}
