//! Error taxonomy for the dronelab core.
//!
//! None of these are fatal to the interactive session: every variant is
//! surfaced to the operator and leaves the scene state untouched (or, for
//! stream errors, leaves the ingestion loop cleanly disconnected).

use thiserror::Error;

/// Errors raised by the scene graph store and the scene serializer.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Adding an object whose name is already taken. The store is unchanged.
    #[error("an object named \"{0}\" already exists in the scene")]
    DuplicateName(String),

    /// An operation referenced a name that is not in the store.
    #[error("no object named \"{0}\" in the scene")]
    NotFound(String),

    /// The XML writer failed while building the document.
    #[error("failed to serialize scene: {0}")]
    Serialize(String),

    /// Writing or replacing the scene file on disk failed.
    #[error("failed to write scene file: {0}")]
    Io(#[from] std::io::Error),
}

/// Malformed operator input (position/orientation parse failure, empty
/// drone name). The originating dialog is re-shown; nothing is mutated.
#[derive(Debug, Error)]
#[error("invalid input: {0}")]
pub struct ValidationError(pub String);

/// Failures on the motion-capture link.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The capture system could not be reached on connect.
    #[error("could not connect to the motion-capture system: {0}")]
    ConnectFailed(String),

    /// The pose stream dropped mid-session. The ingestion loop transitions
    /// to `Disconnected`; reconnection is operator-initiated.
    #[error("pose stream lost: {0}")]
    StreamLost(String),
}

/// Failure in the video-recording side channel.
#[derive(Debug, Error)]
#[error("recording backend failure: {0}")]
pub struct RecordingError(pub String);

/// Umbrella error returned by the command dispatcher to the control surface.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Recording(#[from] RecordingError),
}
