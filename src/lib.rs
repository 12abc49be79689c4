// src/lib.rs
//! Dronelab
//!
//! Interactive 3D test-environment scene composer with live motion-capture
//! pose synchronization. Operators place buildings, landing zones, poles and
//! drones; drone poses are kept in sync with a streaming capture feed; the
//! finished scene is emitted as an XML description for downstream tooling.

pub mod app;
pub mod command;
pub mod error;
pub mod mocap;
pub mod recording;
pub mod scene;
pub mod ui;

pub mod prelude;

// Re-export main types for convenience
pub use app::Session;

/// Creates a session wired to an in-process channel feed and a no-op
/// recorder, returning the sending half of the feed alongside it.
pub fn default() -> (
    std::sync::mpsc::Sender<mocap::PoseFrame>,
    Session<mocap::ChannelSource, recording::NullRecorder>,
) {
    let (tx, source) = mocap::ChannelSource::new();
    (tx, Session::new(source, recording::NullRecorder::default()))
}
