//! # Dronelab Prelude
//!
//! One-stop import for the types a typical embedder needs:
//!
//! ```rust
//! use dronelab::prelude::*;
//! ```

// Re-export core session types
pub use crate::app::Session;
pub use crate::default;

// Re-export scene types
pub use crate::scene::{ObjectKind, SceneGraphStore, SceneObject};

// Re-export the capture boundary
pub use crate::mocap::{
    ChannelSource, ConnectionState, IdentityRegistry, IngestionLoop, PoseFrame, PoseFrameSource,
    RigidBodyId,
};

// Re-export the command surface
pub use crate::command::{CommandDispatcher, OperatorAction};
pub use crate::recording::{NullRecorder, RecordingBackend, RecordingHandle};
pub use crate::ui::{ControlSurface, SessionView};

// Re-export error taxonomy
pub use crate::error::{
    CommandError, RecordingError, SceneError, StreamError, ValidationError,
};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Quaternion, Vector3};
