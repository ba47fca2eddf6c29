use thiserror::Error;

/// Lifecycle misuse by the host event layer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("a drag is already in progress")]
    DragAlreadyActive,
    #[error("no drag in progress")]
    NoActiveDrag,
    #[error("gesture path is already finished")]
    PathFinished,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("gesture label is empty")]
    Empty,
    #[error("unknown direction token '{0}'")]
    BadToken(String),
    #[error("gesture label '{0}' has too many directions")]
    TooLong(String),
}
