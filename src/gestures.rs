//! Path classification: sampling, rejection gates, segmentation and label
//! composition. Everything here is a pure query over a point slice.

use std::fmt;

use log::debug;

use crate::direction::{DEFAULT_DIRECTION_THRESHOLD, Direction, direction_between};
use crate::label::GestureLabel;
use crate::tracker::Point;

/// Paths are split into this many parts before composition.
pub const SEGMENT_COUNT: usize = 3;

/// A path touching all four cardinals may have at most this many runs.
const ALL_DIRECTIONS_RUN_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Points kept by the first downsampling pass.
    pub sample_count: usize,
    /// Shorter paths (px) are not intentional.
    pub min_gesture_length: f64,
    /// Bucket half-width in degrees.
    pub direction_threshold: f64,
    pub complexity_samples: usize,
    /// Stride between points compared in the complexity walk.
    pub complexity_step: usize,
    pub max_direction_runs: usize,
    /// Path length over bounding-box diagonal above which the path loops.
    pub loop_ratio: f64,
    pub min_loop_diagonal: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sample_count: 40,
            min_gesture_length: 20.0,
            direction_threshold: DEFAULT_DIRECTION_THRESHOLD,
            complexity_samples: 60,
            complexity_step: 4,
            max_direction_runs: 4,
            loop_ratio: 2.5,
            min_loop_diagonal: 50.0,
        }
    }
}

impl ClassifierConfig {
    /// Coarser sampling for live preview.
    pub fn preview() -> Self {
        Self::default().with_sample_count(20)
    }

    pub fn with_sample_count(mut self, n: usize) -> Self {
        self.sample_count = n;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComplexityReason {
    TooManyTurns { runs: usize },
    AllDirections { runs: usize },
    SelfIntersecting { path_length: f64, diagonal: f64 },
}

impl fmt::Display for ComplexityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyTurns { runs } => write!(f, "too many direction changes ({runs})"),
            Self::AllDirections { runs } => {
                write!(f, "touches all four directions with {runs} changes")
            }
            Self::SelfIntersecting {
                path_length,
                diagonal,
            } => write!(
                f,
                "path length {path_length:.0}px loops over a {diagonal:.0}px box"
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    TooShort { distance: f64 },
    TooComplex(ComplexityReason),
    NoSegments,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { distance } => write!(f, "too short ({distance:.1}px)"),
            Self::TooComplex(why) => write!(f, "too complex: {why}"),
            Self::NoSegments => f.write_str("no clear direction"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Recognized(GestureLabel),
    Rejected(RejectReason),
}

impl Classification {
    /// Collapses rejection into the empty label.
    pub fn into_label(self) -> GestureLabel {
        match self {
            Classification::Recognized(label) => label,
            Classification::Rejected(_) => GestureLabel::empty(),
        }
    }

    pub fn label(&self) -> Option<&GestureLabel> {
        match self {
            Classification::Recognized(label) => Some(label),
            Classification::Rejected(_) => None,
        }
    }
}

/// Contiguous slice of a sampled path with its dominant heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<'a> {
    pub points: &'a [Point],
    pub direction: Direction,
}

#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    cfg: ClassifierConfig,
}

impl GestureClassifier {
    pub fn new(cfg: ClassifierConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.cfg
    }

    pub fn classify(&self, points: &[Point]) -> GestureLabel {
        self.evaluate(points).into_label()
    }

    pub fn evaluate(&self, points: &[Point]) -> Classification {
        let sampled = sample_points(points, self.cfg.sample_count);

        let distance = path_length(&sampled);
        if distance < self.cfg.min_gesture_length {
            debug!("gesture rejected: {distance:.1}px is below the minimum length");
            return Classification::Rejected(RejectReason::TooShort { distance });
        }

        if let Some(why) = self.complexity(points) {
            debug!("gesture rejected: {why}");
            return Classification::Rejected(RejectReason::TooComplex(why));
        }

        let directions: Vec<Direction> = self
            .segments(&sampled)
            .iter()
            .map(|s| s.direction)
            .collect();
        let runs = fold_corners(collapse_runs(&directions));

        match runs.as_slice() {
            [] => Classification::Rejected(RejectReason::NoSegments),
            [_] | [_, _] | [_, _, _] => {
                Classification::Recognized(GestureLabel::from_directions(&runs))
            }
            [first, .., last] if first != last => {
                Classification::Recognized(GestureLabel::from_directions(&[*first, *last]))
            }
            _ => self.endpoint_fallback(points),
        }
    }

    /// Total polyline length of the first-pass sample.
    pub fn total_distance(&self, points: &[Point]) -> f64 {
        path_length(&sample_points(points, self.cfg.sample_count))
    }

    /// Scribble detection on a denser, independent sample.
    pub fn complexity(&self, points: &[Point]) -> Option<ComplexityReason> {
        let dense = sample_points(points, self.cfg.complexity_samples);
        if dense.is_empty() {
            return None;
        }
        let t = self.cfg.direction_threshold;
        let step = self.cfg.complexity_step.max(1);

        let directions: Vec<Direction> = (step..dense.len())
            .step_by(step)
            .map(|i| direction_between(dense[i - step], dense[i], t))
            .filter(|d| d.is_known())
            .collect();
        let runs = collapse_runs(&directions).len();

        if runs > self.cfg.max_direction_runs {
            return Some(ComplexityReason::TooManyTurns { runs });
        }

        let touches = |c: Direction| directions.iter().any(|d| d.cardinals().contains(&c));
        let all_four = [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
            .into_iter()
            .all(touches);
        if all_four && runs > ALL_DIRECTIONS_RUN_LIMIT {
            return Some(ComplexityReason::AllDirections { runs });
        }

        let diagonal = bounding_diagonal(&dense);
        let length = path_length(&dense);
        if length > self.cfg.loop_ratio * diagonal && diagonal > self.cfg.min_loop_diagonal {
            return Some(ComplexityReason::SelfIntersecting {
                path_length: length,
                diagonal,
            });
        }

        None
    }

    /// Splits `sampled` into `SEGMENT_COUNT` parts and drops those without a
    /// resolvable heading.
    pub fn segments<'a>(&self, sampled: &'a [Point]) -> Vec<Segment<'a>> {
        let t = self.cfg.direction_threshold;
        split_segments(sampled)
            .into_iter()
            .filter_map(|points| {
                let n = points.len();
                if n < 2 {
                    return None;
                }
                let mut direction = direction_between(points[0], points[n - 1], t);
                if !direction.is_known() && n >= 4 {
                    direction = direction_between(points[n / 4], points[n * 3 / 4], t);
                }
                direction
                    .is_known()
                    .then_some(Segment { points, direction })
            })
            .collect()
    }

    fn endpoint_fallback(&self, points: &[Point]) -> Classification {
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Classification::Rejected(RejectReason::NoSegments);
        };
        let direction = direction_between(*first, *last, self.cfg.direction_threshold);
        if direction.is_known() {
            Classification::Recognized(GestureLabel::from_directions(&[direction]))
        } else {
            Classification::Rejected(RejectReason::NoSegments)
        }
    }
}

/// Uniform stride downsampling to exactly `n` points. The last sample is
/// always the last input point. Inputs of `n` points or fewer pass through.
pub fn sample_points(points: &[Point], n: usize) -> Vec<Point> {
    let len = points.len();
    if n == 0 || len <= n {
        return points.to_vec();
    }
    let mut out: Vec<Point> = (0..n).map(|i| points[i * len / n]).collect();
    out[n - 1] = points[len - 1];
    out
}

pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(w[1])).sum()
}

pub fn bounding_diagonal(points: &[Point]) -> f64 {
    let Some(first) = points.first() else {
        return 0.0;
    };
    let (min_x, min_y, max_x, max_y) = points.iter().fold(
        (first.x, first.y, first.x, first.y),
        |(min_x, min_y, max_x, max_y), p| {
            (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
        },
    );
    let w = max_x - min_x;
    let h = max_y - min_y;
    (w * w + h * h).sqrt()
}

/// Sizes `len/3`, `len/3` and the remainder.
fn split_segments(sampled: &[Point]) -> [&[Point]; SEGMENT_COUNT] {
    let size = sampled.len() / SEGMENT_COUNT;
    let (a, rest) = sampled.split_at(size);
    let (b, c) = rest.split_at(size);
    [a, b, c]
}

/// Keeps the first direction of each run of equal neighbours.
pub fn collapse_runs(directions: &[Direction]) -> Vec<Direction> {
    let mut out: Vec<Direction> = Vec::with_capacity(directions.len());
    for &d in directions {
        if out.last() != Some(&d) {
            out.push(d);
        }
    }
    out
}

/// An L drawn at even speed puts its corner in the middle segment, which
/// then reads as the diagonal between the two legs. A diagonal run flanked
/// by exactly its own two cardinals is that corner and is dropped. A stroke
/// deliberately drawn as right, down-right, down therefore also reads
/// `right-down`.
pub fn fold_corners(runs: Vec<Direction>) -> Vec<Direction> {
    if runs.len() < 3 {
        return runs;
    }
    let mut out = Vec::with_capacity(runs.len());
    for (i, &d) in runs.iter().enumerate() {
        let is_corner = i > 0
            && i + 1 < runs.len()
            && d.is_diagonal()
            && !runs[i - 1].is_diagonal()
            && !runs[i + 1].is_diagonal()
            && runs[i - 1] != runs[i + 1]
            && d.cardinals().contains(&runs[i - 1])
            && d.cardinals().contains(&runs[i + 1]);
        if !is_corner {
            out.push(d);
        }
    }
    out
}
