use std::time::{Duration, Instant};

use anyhow::Result;
use log::{debug, info, warn};
use serde::Serialize;

use super::dispatch::{Dispatch, dispatch_gesture};
use super::events::{GESTURE_BUTTON, PointerEvent};
use crate::actions::{Action, ActionLookup, ActionMap, ActionSink};
use crate::config::Profile;
use crate::label::GestureLabel;
use crate::session::{DragOutcome, GestureSession, PreviewOutcome};
use crate::tracker::Point;

/// What the host should show or know after an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Feedback {
    Preview {
        gesture: GestureLabel,
        /// `None` when nothing is bound to the gesture.
        description: Option<String>,
    },
    Discarded {
        x: f64,
        y: f64,
        linger_ms: u64,
    },
    Dispatched {
        gesture: GestureLabel,
        action: Action,
    },
    Unbound {
        gesture: GestureLabel,
    },
}

/// Pointer events in, feedback and dispatched actions out.
pub struct Pipeline<S: ActionSink> {
    session: GestureSession,
    actions: ActionMap,
    sink: S,
    discard_linger: Duration,
}

impl<S: ActionSink> Pipeline<S> {
    pub fn new(profile: &Profile, sink: S) -> Self {
        let mut session = GestureSession::new(profile.session_config());
        session.set_preview_enabled(profile.meta.show_preview);
        Self {
            session,
            actions: profile.action_map(),
            sink,
            discard_linger: Duration::from_millis(profile.thresholds.discard_linger_ms),
        }
    }

    /// Swaps thresholds and bindings; a drag in flight continues.
    pub fn apply_profile(&mut self, profile: &Profile) {
        self.session.set_config(profile.session_config());
        self.session.set_preview_enabled(profile.meta.show_preview);
        self.actions = profile.action_map();
        self.discard_linger = Duration::from_millis(profile.thresholds.discard_linger_ms);
    }

    pub fn session(&self) -> &GestureSession {
        &self.session
    }

    pub fn actions(&self) -> &ActionMap {
        &self.actions
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn handle(&mut self, ev: PointerEvent) -> Result<Vec<Feedback>> {
        self.handle_at(ev, Instant::now())
    }

    pub fn handle_at(&mut self, ev: PointerEvent, now: Instant) -> Result<Vec<Feedback>> {
        let mut out = Vec::new();
        match ev {
            PointerEvent::Down { x, y, button, .. } => {
                if button != GESTURE_BUTTON {
                    return Ok(out);
                }
                self.session.on_drag_start(Point::new(x, y))?;
                debug!("drag started at ({x}, {y})");
            }
            PointerEvent::Move { x, y, .. } => {
                if self.session.is_dragging() {
                    self.session.on_drag_move_at(Point::new(x, y), now)?;
                }
            }
            PointerEvent::Up { x, y, .. } => {
                if !self.session.is_dragging() {
                    return Ok(out);
                }
                match self.session.finish_drag(Point::new(x, y))? {
                    DragOutcome::Recognized(label) => {
                        out.extend(self.dispatch(label)?);
                    }
                    DragOutcome::Discarded => {
                        info!("gesture discarded as too small or complex");
                        out.push(self.discarded_at(Point::new(x, y)));
                    }
                    DragOutcome::Ignored => debug!("no gesture detected"),
                }
            }
            PointerEvent::Cancel { .. } => {
                if self.session.abandon().is_some() {
                    debug!("drag abandoned");
                }
            }
            PointerEvent::Preview { enabled, .. } => {
                self.session.set_preview_enabled(enabled);
            }
        }
        Ok(out)
    }

    /// Fires the pending preview once it is due.
    pub fn tick(&mut self, now: Instant) -> Option<Feedback> {
        let at = self.session.path().and_then(|p| p.last())?;
        match self.session.poll_preview(now)? {
            PreviewOutcome::Label(gesture) => {
                let description = self
                    .actions
                    .action_for(&gesture)
                    .map(|b| b.description().to_string());
                Some(Feedback::Preview {
                    gesture,
                    description,
                })
            }
            PreviewOutcome::Discarded => Some(self.discarded_at(at)),
            PreviewOutcome::Nothing => None,
        }
    }

    fn dispatch(&mut self, label: GestureLabel) -> Result<Option<Feedback>> {
        let fb = match dispatch_gesture(&label, &self.actions, &mut self.sink)? {
            Dispatch::NoGesture => None,
            Dispatch::Unbound => Some(Feedback::Unbound { gesture: label }),
            Dispatch::Sent(action) => Some(Feedback::Dispatched {
                gesture: label,
                action,
            }),
        };
        Ok(fb)
    }

    fn discarded_at(&self, p: Point) -> Feedback {
        Feedback::Discarded {
            x: p.x,
            y: p.y,
            linger_ms: self.discard_linger.as_millis() as u64,
        }
    }
}

/// Feeds recorded events on their own clock (`t`, ms). Events without a
/// timestamp inherit the previous one. Previews fire between events exactly
/// as they would have live.
pub fn replay<S: ActionSink>(
    pipeline: &mut Pipeline<S>,
    events: impl IntoIterator<Item = PointerEvent>,
) -> Vec<Feedback> {
    let epoch = Instant::now();
    let mut last_ms = 0;
    let mut out = Vec::new();
    for ev in events {
        last_ms = ev.timestamp_ms().unwrap_or(last_ms);
        let now = epoch + Duration::from_millis(last_ms);
        out.extend(pipeline.tick(now));
        match pipeline.handle_at(ev, now) {
            Ok(fb) => out.extend(fb),
            Err(e) => warn!("event rejected: {e}"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::NoopSink;

    fn profile() -> Profile {
        Profile::from_toml_str(include_str!("../../profiles/default.toml")).unwrap()
    }

    fn mv(x: f64, y: f64, t: u64) -> PointerEvent {
        PointerEvent::Move { x, y, t: Some(t) }
    }

    #[test]
    fn other_buttons_do_not_start_a_drag() {
        let mut p = Pipeline::new(&profile(), NoopSink);
        let fb = p
            .handle(PointerEvent::Down {
                x: 0.0,
                y: 0.0,
                button: 0,
                t: None,
            })
            .unwrap();
        assert!(fb.is_empty());
        assert!(!p.session().is_dragging());
        // stray moves and ups are host noise, not misuse
        assert!(p.handle(mv(5.0, 5.0, 0)).unwrap().is_empty());
        assert!(
            p.handle(PointerEvent::Up {
                x: 5.0,
                y: 5.0,
                t: None
            })
            .unwrap()
            .is_empty()
        );
    }

    #[test]
    fn second_down_is_rejected() {
        let mut p = Pipeline::new(&profile(), NoopSink);
        let down = PointerEvent::Down {
            x: 0.0,
            y: 0.0,
            button: GESTURE_BUTTON,
            t: None,
        };
        p.handle(down).unwrap();
        assert!(p.handle(down).is_err());
        assert!(p.session().is_dragging());
    }

    #[test]
    fn replay_previews_then_dispatches() {
        let mut p = Pipeline::new(&profile(), NoopSink);
        let mut events = vec![PointerEvent::Down {
            x: 200.0,
            y: 100.0,
            button: GESTURE_BUTTON,
            t: Some(0),
        }];
        for i in 1..=20u64 {
            events.push(mv(200.0 - i as f64 * 6.0, 100.0, i * 10));
        }
        // hold still, then let the preview delay pass
        events.push(mv(79.0, 100.0, 210));
        events.push(mv(79.0, 100.0, 500));
        events.push(PointerEvent::Up {
            x: 79.0,
            y: 100.0,
            t: Some(520),
        });

        let fb = replay(&mut p, events);
        assert_eq!(
            fb,
            vec![
                Feedback::Preview {
                    gesture: "left".parse().unwrap(),
                    description: Some("Go back".into()),
                },
                Feedback::Dispatched {
                    gesture: "left".parse().unwrap(),
                    action: Action::Back,
                },
            ]
        );
    }

    #[test]
    fn replay_reports_a_discarded_preview_and_release() {
        let mut p = Pipeline::new(&profile(), NoopSink);
        let mut events = vec![PointerEvent::Down {
            x: 0.0,
            y: 0.0,
            button: GESTURE_BUTTON,
            t: Some(0),
        }];
        for k in 1..=40u64 {
            let x = if k % 2 == 0 { 0.0 } else { 100.0 };
            events.push(mv(x, k as f64 * 2.0, k));
        }
        events.push(mv(1.0, 80.0, 41));
        // the preview is due when this one arrives
        events.push(mv(2.0, 80.0, 241));
        events.push(PointerEvent::Up {
            x: 300.0,
            y: 80.0,
            t: Some(260),
        });

        let fb = replay(&mut p, events);
        assert_eq!(
            fb,
            vec![
                Feedback::Discarded {
                    x: 1.0,
                    y: 80.0,
                    linger_ms: 500,
                },
                Feedback::Discarded {
                    x: 300.0,
                    y: 80.0,
                    linger_ms: 500,
                },
            ]
        );
        assert!(!p.session().is_dragging());
    }
}
