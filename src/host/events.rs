//! Wire format of the host event stream: one JSON object per line.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::tracker::Point;

/// Only this button starts a drag (browser numbering: 2 = right).
pub const GESTURE_BUTTON: u8 = 2;

fn gesture_button() -> u8 {
    GESTURE_BUTTON
}

/// `t` is milliseconds on the host's clock; only replays use it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerEvent {
    Down {
        x: f64,
        y: f64,
        #[serde(default = "gesture_button")]
        button: u8,
        #[serde(default)]
        t: Option<u64>,
    },
    Move {
        x: f64,
        y: f64,
        #[serde(default)]
        t: Option<u64>,
    },
    Up {
        x: f64,
        y: f64,
        #[serde(default)]
        t: Option<u64>,
    },
    /// The drag was lost (window blur, resize).
    Cancel {
        #[serde(default)]
        t: Option<u64>,
    },
    /// Live change of the preview setting.
    Preview {
        enabled: bool,
        #[serde(default)]
        t: Option<u64>,
    },
}

impl PointerEvent {
    pub fn point(&self) -> Option<Point> {
        match *self {
            PointerEvent::Down { x, y, .. }
            | PointerEvent::Move { x, y, .. }
            | PointerEvent::Up { x, y, .. } => Some(Point::new(x, y)),
            PointerEvent::Cancel { .. } | PointerEvent::Preview { .. } => None,
        }
    }

    pub fn timestamp_ms(&self) -> Option<u64> {
        match *self {
            PointerEvent::Down { t, .. }
            | PointerEvent::Move { t, .. }
            | PointerEvent::Up { t, .. }
            | PointerEvent::Cancel { t }
            | PointerEvent::Preview { t, .. } => t,
        }
    }
}

pub fn parse_event(line: &str) -> Result<PointerEvent> {
    serde_json::from_str(line.trim()).with_context(|| format!("invalid pointer event: {line}"))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Pair(f64, f64),
    Object { x: f64, y: f64 },
}

/// A recorded path: `[[x, y], ...]` or `[{"x": .., "y": ..}, ...]`.
pub fn parse_points(json: &str) -> Result<Vec<Point>> {
    let raw: Vec<RawPoint> = serde_json::from_str(json).context("expected a JSON array of points")?;
    Ok(raw
        .into_iter()
        .map(|p| match p {
            RawPoint::Pair(x, y) => Point::new(x, y),
            RawPoint::Object { x, y } => Point::new(x, y),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_defaults_to_the_gesture_button() {
        let ev = parse_event(r#"{"type":"down","x":1,"y":2}"#).unwrap();
        assert_eq!(
            ev,
            PointerEvent::Down {
                x: 1.0,
                y: 2.0,
                button: GESTURE_BUTTON,
                t: None
            }
        );
        assert_eq!(ev.point(), Some(Point::new(1.0, 2.0)));
    }

    #[test]
    fn timestamps_and_settings() {
        let ev = parse_event(r#"{"type":"move","x":1.5,"y":2,"t":40}"#).unwrap();
        assert_eq!(ev.timestamp_ms(), Some(40));
        let ev = parse_event(r#"{"type":"preview","enabled":false}"#).unwrap();
        assert_eq!(ev.point(), None);
        assert!(parse_event(r#"{"type":"wheel"}"#).is_err());
    }

    #[test]
    fn both_point_shapes() {
        let a = parse_points("[[0, 0], [10.5, 3]]").unwrap();
        let b = parse_points(r#"[{"x": 0, "y": 0}, {"x": 10.5, "y": 3}]"#).unwrap();
        assert_eq!(a, b);
        assert!(parse_points("{}").is_err());
    }
}
