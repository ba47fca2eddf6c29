//! Mouse gesture recognition: right-button drags become labels such as
//! `down-right`, which resolve to browser actions through a user profile.

pub mod actions;
pub mod config;
pub mod direction;
pub mod error;
pub mod gestures;
pub mod host;
pub mod label;
pub mod logging;
pub mod session;
pub mod tracker;

pub use direction::{Direction, direction_between};
pub use error::{LabelError, SessionError};
pub use gestures::{Classification, ClassifierConfig, GestureClassifier, RejectReason};
pub use label::GestureLabel;
pub use session::{GestureSession, SessionConfig};
pub use tracker::{GesturePath, Point, PointTracker};
