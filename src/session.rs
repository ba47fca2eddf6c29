//! Drag lifecycle and debounced live preview.
//!
//! A `GestureSession` owns everything one pointer needs: the tracker, both
//! classifiers and the pending preview. Hosts call `on_drag_start`,
//! `on_drag_move` and `on_drag_end` in order, and poll the preview with their
//! own clock.

use std::time::{Duration, Instant};

use log::debug;

use crate::error::SessionError;
use crate::gestures::{ClassifierConfig, GestureClassifier};
use crate::label::GestureLabel;
use crate::tracker::{GesturePath, Point, PointTracker};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub final_classifier: ClassifierConfig,
    pub preview_classifier: ClassifierConfig,
    /// Stillness required before a preview is computed.
    pub preview_delay: Duration,
    /// Moves shorter than this (px) count as still.
    pub movement_threshold: f64,
    /// Empty results from longer paths are reported as discarded.
    pub discard_min_points: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            final_classifier: ClassifierConfig::default(),
            preview_classifier: ClassifierConfig::preview(),
            preview_delay: Duration::from_millis(200),
            movement_threshold: 5.0,
            discard_min_points: 10,
        }
    }
}

/// A cancellable deadline. Dropping it is the cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    due: Instant,
}

impl ScheduledTask {
    pub fn after(now: Instant, delay: Duration) -> Self {
        Self { due: now + delay }
    }

    pub fn due(&self) -> Instant {
        self.due
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    Recognized(GestureLabel),
    /// A real attempt that was too complex or unresolvable.
    Discarded,
    /// Nothing worth reporting was drawn.
    Ignored,
}

impl DragOutcome {
    pub fn into_label(self) -> GestureLabel {
        match self {
            DragOutcome::Recognized(label) => label,
            _ => GestureLabel::empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreviewOutcome {
    Label(GestureLabel),
    Discarded,
    Nothing,
}

#[derive(Debug)]
pub struct GestureSession {
    cfg: SessionConfig,
    final_classifier: GestureClassifier,
    preview_classifier: GestureClassifier,
    tracker: PointTracker,
    pending_preview: Option<ScheduledTask>,
    last_sample: Option<Point>,
    discarded: bool,
    preview_enabled: bool,
}

impl Default for GestureSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl GestureSession {
    pub fn new(cfg: SessionConfig) -> Self {
        Self {
            final_classifier: GestureClassifier::new(cfg.final_classifier.clone()),
            preview_classifier: GestureClassifier::new(cfg.preview_classifier.clone()),
            cfg,
            tracker: PointTracker::new(),
            pending_preview: None,
            last_sample: None,
            discarded: false,
            preview_enabled: true,
        }
    }

    /// Takes effect from the next classification; a live path is kept.
    pub fn set_config(&mut self, cfg: SessionConfig) {
        self.final_classifier = GestureClassifier::new(cfg.final_classifier.clone());
        self.preview_classifier = GestureClassifier::new(cfg.preview_classifier.clone());
        self.cfg = cfg;
    }

    pub fn config(&self) -> &SessionConfig {
        &self.cfg
    }

    pub fn set_preview_enabled(&mut self, enabled: bool) {
        self.preview_enabled = enabled;
        if !enabled {
            self.pending_preview = None;
        }
    }

    pub fn preview_enabled(&self) -> bool {
        self.preview_enabled
    }

    pub fn is_dragging(&self) -> bool {
        self.tracker.is_active()
    }

    pub fn path(&self) -> Option<&GesturePath> {
        self.tracker.path()
    }

    pub fn pending_preview(&self) -> Option<ScheduledTask> {
        self.pending_preview
    }

    /// Whether a preview already reported this drag as discarded.
    pub fn is_discarded(&self) -> bool {
        self.discarded
    }

    pub fn on_drag_start(&mut self, origin: Point) -> Result<(), SessionError> {
        self.tracker.start(origin)?;
        self.last_sample = Some(origin);
        self.discarded = false;
        self.pending_preview = None;
        Ok(())
    }

    pub fn on_drag_move(&mut self, p: Point) -> Result<(), SessionError> {
        self.on_drag_move_at(p, Instant::now())
    }

    pub fn on_drag_move_at(&mut self, p: Point, now: Instant) -> Result<(), SessionError> {
        self.tracker.append(p)?;

        if self.preview_enabled && !self.discarded {
            let moved = self.last_sample.map_or(0.0, |last| last.distance_to(p));
            if moved < self.cfg.movement_threshold {
                if self.pending_preview.is_none() {
                    self.schedule_preview(now);
                }
            } else {
                self.pending_preview = None;
            }
        }
        self.last_sample = Some(p);
        Ok(())
    }

    /// Arms the single preview slot, replacing whatever was pending.
    pub fn schedule_preview(&mut self, now: Instant) {
        self.pending_preview = Some(ScheduledTask::after(now, self.cfg.preview_delay));
    }

    /// Runs the pending preview once it is due. Idle sessions yield `None`.
    pub fn poll_preview(&mut self, now: Instant) -> Option<PreviewOutcome> {
        let task = self.pending_preview?;
        if !task.is_due(now) {
            return None;
        }
        self.pending_preview = None;
        if !self.tracker.is_active() {
            return None;
        }
        Some(self.preview_outcome())
    }

    /// Preview label of the live path, independent of the schedule.
    pub fn on_preview_tick(&self) -> Result<GestureLabel, SessionError> {
        let path = self.tracker.path().ok_or(SessionError::NoActiveDrag)?;
        Ok(self.preview_classifier.classify(path.points()))
    }

    fn preview_outcome(&mut self) -> PreviewOutcome {
        let Some(path) = self.tracker.path() else {
            return PreviewOutcome::Nothing;
        };
        let label = self.preview_classifier.classify(path.points());
        if !label.is_empty() {
            PreviewOutcome::Label(label)
        } else if path.len() > self.cfg.discard_min_points {
            debug!("preview: discarding gesture of {} points", path.len());
            self.discarded = true;
            self.pending_preview = None;
            PreviewOutcome::Discarded
        } else {
            PreviewOutcome::Nothing
        }
    }

    pub fn on_drag_end(&mut self, p: Point) -> Result<GestureLabel, SessionError> {
        Ok(self.finish_drag(p)?.into_label())
    }

    /// Appends the release point, closes the path and classifies it.
    pub fn finish_drag(&mut self, p: Point) -> Result<DragOutcome, SessionError> {
        self.tracker.append(p)?;
        let path = self.tracker.finish()?;
        self.pending_preview = None;
        self.last_sample = None;

        let label = self.final_classifier.classify(path.points());
        let outcome = if self.discarded {
            DragOutcome::Discarded
        } else if !label.is_empty() {
            DragOutcome::Recognized(label)
        } else if path.len() > self.cfg.discard_min_points {
            DragOutcome::Discarded
        } else {
            DragOutcome::Ignored
        };
        self.discarded = false;
        Ok(outcome)
    }

    /// Drops the live path without classifying it.
    pub fn abandon(&mut self) -> Option<GesturePath> {
        self.pending_preview = None;
        self.last_sample = None;
        self.discarded = false;
        self.tracker.abandon()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag_right(s: &mut GestureSession, t0: Instant) {
        s.on_drag_start(Point::new(0.0, 0.0)).unwrap();
        for i in 1..=20 {
            s.on_drag_move_at(Point::new(i as f64 * 6.0, 0.0), t0).unwrap();
        }
    }

    #[test]
    fn lifecycle_recognizes() {
        let mut s = GestureSession::default();
        drag_right(&mut s, Instant::now());
        assert_eq!(s.on_drag_end(Point::new(120.0, 0.0)).unwrap(), "right");
        assert!(!s.is_dragging());
    }

    #[test]
    fn misuse_is_reported() {
        let mut s = GestureSession::default();
        assert_eq!(
            s.on_drag_move(Point::new(1.0, 1.0)),
            Err(SessionError::NoActiveDrag)
        );
        assert_eq!(
            s.on_drag_end(Point::new(1.0, 1.0)),
            Err(SessionError::NoActiveDrag)
        );
        assert_eq!(s.on_preview_tick(), Err(SessionError::NoActiveDrag));

        s.on_drag_start(Point::new(0.0, 0.0)).unwrap();
        assert_eq!(
            s.on_drag_start(Point::new(5.0, 5.0)),
            Err(SessionError::DragAlreadyActive)
        );
        assert_eq!(s.path().unwrap().points(), &[Point::new(0.0, 0.0)]);
    }

    #[test]
    fn stillness_arms_a_single_preview() {
        let t0 = Instant::now();
        let mut s = GestureSession::default();
        drag_right(&mut s, t0);
        assert!(s.pending_preview().is_none());

        s.on_drag_move_at(Point::new(121.0, 0.0), t0).unwrap();
        let task = s.pending_preview().unwrap();
        assert_eq!(task.due(), t0 + Duration::from_millis(200));

        // still moves do not push the deadline back
        s.on_drag_move_at(Point::new(122.0, 0.0), t0 + Duration::from_millis(50))
            .unwrap();
        assert_eq!(s.pending_preview(), Some(task));

        assert_eq!(s.poll_preview(t0 + Duration::from_millis(199)), None);
        assert_eq!(
            s.poll_preview(t0 + Duration::from_millis(200)),
            Some(PreviewOutcome::Label("right".parse().unwrap()))
        );
        assert!(s.pending_preview().is_none());
    }

    #[test]
    fn movement_cancels_preview() {
        let t0 = Instant::now();
        let mut s = GestureSession::default();
        drag_right(&mut s, t0);
        s.on_drag_move_at(Point::new(121.0, 0.0), t0).unwrap();
        assert!(s.pending_preview().is_some());
        s.on_drag_move_at(Point::new(140.0, 0.0), t0).unwrap();
        assert!(s.pending_preview().is_none());
        assert_eq!(s.poll_preview(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn release_cancels_preview() {
        let t0 = Instant::now();
        let mut s = GestureSession::default();
        drag_right(&mut s, t0);
        s.on_drag_move_at(Point::new(121.0, 0.0), t0).unwrap();
        s.on_drag_end(Point::new(121.0, 0.0)).unwrap();
        assert!(s.pending_preview().is_none());
        assert_eq!(s.poll_preview(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn disabled_preview_never_schedules() {
        let t0 = Instant::now();
        let mut s = GestureSession::default();
        s.set_preview_enabled(false);
        s.on_drag_start(Point::new(0.0, 0.0)).unwrap();
        s.on_drag_move_at(Point::new(1.0, 0.0), t0).unwrap();
        assert!(s.pending_preview().is_none());
        // the direct query still works
        assert!(s.on_preview_tick().unwrap().is_empty());
    }

    #[test]
    fn tiny_wiggle_is_ignored_not_discarded() {
        let mut s = GestureSession::default();
        s.on_drag_start(Point::new(0.0, 0.0)).unwrap();
        s.on_drag_move(Point::new(2.0, 1.0)).unwrap();
        assert_eq!(
            s.finish_drag(Point::new(3.0, 1.0)).unwrap(),
            DragOutcome::Ignored
        );
    }

    #[test]
    fn scribble_is_discarded() {
        let mut s = GestureSession::default();
        s.on_drag_start(Point::new(0.0, 0.0)).unwrap();
        for k in 1..=40 {
            let x = if k % 2 == 0 { 0.0 } else { 100.0 };
            s.on_drag_move(Point::new(x, k as f64 * 2.0)).unwrap();
        }
        assert_eq!(
            s.finish_drag(Point::new(0.0, 82.0)).unwrap(),
            DragOutcome::Discarded
        );
    }

    #[test]
    fn rescheduling_replaces_the_pending_preview() {
        let t0 = Instant::now();
        let mut s = GestureSession::default();
        s.schedule_preview(t0);
        s.schedule_preview(t0 + Duration::from_millis(150));
        assert_eq!(
            s.pending_preview().map(|t| t.due()),
            Some(t0 + Duration::from_millis(350))
        );
    }

    #[test]
    fn discarded_preview_sticks_until_release() {
        let t0 = Instant::now();
        let mut s = GestureSession::default();
        s.on_drag_start(Point::new(0.0, 0.0)).unwrap();
        for k in 1..=40 {
            let x = if k % 2 == 0 { 0.0 } else { 100.0 };
            s.on_drag_move_at(Point::new(x, k as f64 * 2.0), t0).unwrap();
        }
        s.on_drag_move_at(Point::new(1.0, 80.0), t0).unwrap();
        assert!(s.pending_preview().is_some());

        assert_eq!(
            s.poll_preview(t0 + Duration::from_millis(200)),
            Some(PreviewOutcome::Discarded)
        );
        assert!(s.is_discarded());

        // no further previews for this drag
        let t1 = t0 + Duration::from_millis(300);
        s.on_drag_move_at(Point::new(2.0, 80.0), t1).unwrap();
        assert!(s.pending_preview().is_none());

        // a clean finish does not win it back
        for i in 1..=200 {
            s.on_drag_move_at(Point::new(2.0 + i as f64 * 6.0, 80.0), t1)
                .unwrap();
        }
        assert_eq!(
            s.finish_drag(Point::new(1210.0, 80.0)).unwrap(),
            DragOutcome::Discarded
        );
        assert!(!s.is_discarded());

        // the next drag starts fresh
        drag_right(&mut s, t1);
        assert_eq!(s.on_drag_end(Point::new(120.0, 0.0)).unwrap(), "right");
    }

    #[test]
    fn abandon_clears_everything() {
        let t0 = Instant::now();
        let mut s = GestureSession::default();
        drag_right(&mut s, t0);
        s.on_drag_move_at(Point::new(121.0, 0.0), t0).unwrap();
        assert!(s.abandon().is_some());
        assert!(!s.is_dragging());
        assert!(s.pending_preview().is_none());
        s.on_drag_start(Point::new(0.0, 0.0)).unwrap();
    }
}
