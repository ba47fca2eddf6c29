//! Eight-way compass bucketing of pointer motion.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tracker::Point;

/// Half-width of each compass bucket, in degrees.
pub const DEFAULT_DIRECTION_THRESHOLD: f64 = 35.0;

/// Screen-space heading. `Down` is +y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    Up,
    UpRight,
    Unknown,
}

impl Direction {
    /// The eight resolvable headings, counter-clockwise on screen from 0°.
    pub const COMPASS: [Direction; 8] = [
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::DownLeft,
        Direction::Left,
        Direction::UpLeft,
        Direction::Up,
        Direction::UpRight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Right => "right",
            Direction::DownRight => "down-right",
            Direction::Down => "down",
            Direction::DownLeft => "down-left",
            Direction::Left => "left",
            Direction::UpLeft => "up-left",
            Direction::Up => "up",
            Direction::UpRight => "up-right",
            Direction::Unknown => "unknown",
        }
    }

    /// Axis angle of the bucket centre, as returned by `atan2(dy, dx)`.
    pub fn axis_degrees(self) -> Option<f64> {
        let deg = match self {
            Direction::Right => 0.0,
            Direction::DownRight => 45.0,
            Direction::Down => 90.0,
            Direction::DownLeft => 135.0,
            Direction::Left => 180.0,
            Direction::UpLeft => -135.0,
            Direction::Up => -90.0,
            Direction::UpRight => -45.0,
            Direction::Unknown => return None,
        };
        Some(deg)
    }

    pub fn is_known(self) -> bool {
        self != Direction::Unknown
    }

    /// Cardinal parts: `DownRight` is both `Down` and `Right`.
    pub fn cardinals(self) -> &'static [Direction] {
        match self {
            Direction::Right => &[Direction::Right],
            Direction::DownRight => &[Direction::Down, Direction::Right],
            Direction::Down => &[Direction::Down],
            Direction::DownLeft => &[Direction::Down, Direction::Left],
            Direction::Left => &[Direction::Left],
            Direction::UpLeft => &[Direction::Up, Direction::Left],
            Direction::Up => &[Direction::Up],
            Direction::UpRight => &[Direction::Up, Direction::Right],
            Direction::Unknown => &[],
        }
    }

    pub fn is_diagonal(self) -> bool {
        self.cardinals().len() == 2
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buckets only partition the circle while they cannot overlap.
pub fn is_valid_threshold(threshold: f64) -> bool {
    threshold > 0.0 && threshold <= 45.0
}

/// Heading from `p1` to `p2`. Coincident points are `Unknown`.
pub fn direction_between(p1: Point, p2: Point, threshold: f64) -> Direction {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    if dx == 0.0 && dy == 0.0 {
        return Direction::Unknown;
    }
    direction_from_degrees(dy.atan2(dx).to_degrees(), threshold)
}

/// Buckets an `atan2` angle in (-180, 180]. Lower bounds are exclusive and
/// upper bounds inclusive, so a boundary angle lands in exactly one bucket.
pub fn direction_from_degrees(deg: f64, t: f64) -> Direction {
    if !deg.is_finite() {
        return Direction::Unknown;
    }
    if deg > -t && deg <= t {
        Direction::Right
    } else if deg > t && deg <= 90.0 - t {
        Direction::DownRight
    } else if deg > 90.0 - t && deg <= 90.0 + t {
        Direction::Down
    } else if deg > 90.0 + t && deg <= 180.0 - t {
        Direction::DownLeft
    } else if deg > 180.0 - t || deg <= -180.0 + t {
        Direction::Left
    } else if deg > -180.0 + t && deg <= -90.0 - t {
        Direction::UpLeft
    } else if deg > -90.0 - t && deg <= -90.0 + t {
        Direction::Up
    } else if deg > -90.0 + t && deg <= -t {
        Direction::UpRight
    } else {
        Direction::Unknown
    }
}
