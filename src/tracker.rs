//! Pointer sample accumulation for a single drag.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Viewport pixel coordinate. y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Samples of one drag in capture order. Append-only while live.
#[derive(Debug, Clone, PartialEq)]
pub struct GesturePath {
    points: Vec<Point>,
    finished: bool,
}

impl GesturePath {
    pub fn new(origin: Point) -> Self {
        Self {
            points: vec![origin],
            finished: false,
        }
    }

    /// Wraps an already recorded sequence; the result is finished.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            points,
            finished: true,
        }
    }

    pub fn push(&mut self, p: Point) -> Result<(), SessionError> {
        if self.finished {
            return Err(SessionError::PathFinished);
        }
        self.points.push(p);
        Ok(())
    }

    pub fn finish(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

impl AsRef<[Point]> for GesturePath {
    fn as_ref(&self) -> &[Point] {
        &self.points
    }
}

/// Owns the live path; at most one drag at a time.
#[derive(Debug, Default)]
pub struct PointTracker {
    active: Option<GesturePath>,
}

impl PointTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, origin: Point) -> Result<&GesturePath, SessionError> {
        if self.active.is_some() {
            return Err(SessionError::DragAlreadyActive);
        }
        let path = self.active.insert(GesturePath::new(origin));
        Ok(&*path)
    }

    /// No dedup and no distance filter; noise is the classifier's problem.
    pub fn append(&mut self, p: Point) -> Result<&GesturePath, SessionError> {
        let path = self.active.as_mut().ok_or(SessionError::NoActiveDrag)?;
        path.push(p)?;
        Ok(&*path)
    }

    /// Closes the live path and hands it over.
    pub fn finish(&mut self) -> Result<GesturePath, SessionError> {
        let mut path = self.active.take().ok_or(SessionError::NoActiveDrag)?;
        path.finish();
        Ok(path)
    }

    pub fn abandon(&mut self) -> Option<GesturePath> {
        self.active.take()
    }

    pub fn path(&self) -> Option<&GesturePath> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}
