//! Pose frame source boundary.
//!
//! The motion-capture vendor SDK lives outside this crate; the core only
//! sees a [`PoseFrameSource`]: something that can be connected, produces a
//! blocking stream of [`PoseFrame`]s, and returns promptly from a pending
//! receive when disconnected from another thread.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::sync::Mutex;
use std::time::Duration;

use cgmath::{Quaternion, Vector3};

use crate::error::StreamError;

/// Opaque identity of a tracked rigid body.
///
/// Identities are assigned by the capture system and are not stable across
/// capture sessions; the core never parses or orders them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RigidBodyId(String);

impl RigidBodyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RigidBodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RigidBodyId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One pose sample from the capture system. Consumed and discarded
/// immediately after application; never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseFrame {
    pub rigid_body: RigidBodyId,
    pub position: Vector3<f64>,
    /// Orientation as (w, x, y, z); not required to be normalized on arrival.
    pub orientation: Quaternion<f64>,
    /// Capture-system timestamp in seconds.
    pub timestamp: f64,
}

/// Contract for the capture feed collaborator.
///
/// Methods take `&self` because the source is shared between the ingestion
/// worker (blocking in [`recv`](Self::recv)) and the command thread (calling
/// [`disconnect`](Self::disconnect)).
pub trait PoseFrameSource: Send + Sync {
    /// Establish the link. Bounded wait; an unreachable capture system
    /// surfaces as [`StreamError::ConnectFailed`].
    fn connect(&self) -> Result<(), StreamError>;

    /// Tear down the link. Must cause a pending [`recv`](Self::recv) on
    /// another thread to return promptly rather than block shutdown.
    fn disconnect(&self);

    /// Block until the next frame. `Ok(None)` means the feed ended cleanly
    /// (disconnect or sender gone); `Err` means the stream broke mid-session.
    fn recv(&self) -> Result<Option<PoseFrame>, StreamError>;
}

/// In-process [`PoseFrameSource`] fed through an mpsc channel.
///
/// Used by the tests and by adapters that pump vendor SDK callbacks into the
/// core from their own thread.
pub struct ChannelSource {
    frames: Mutex<mpsc::Receiver<PoseFrame>>,
    open: AtomicBool,
}

impl ChannelSource {
    /// Create a source plus the sending half that feeds it.
    pub fn new() -> (mpsc::Sender<PoseFrame>, Self) {
        let (tx, rx) = mpsc::channel();
        (
            tx,
            Self {
                frames: Mutex::new(rx),
                open: AtomicBool::new(false),
            },
        )
    }
}

impl PoseFrameSource for ChannelSource {
    fn connect(&self) -> Result<(), StreamError> {
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn disconnect(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    fn recv(&self) -> Result<Option<PoseFrame>, StreamError> {
        let frames = self
            .frames
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        loop {
            // Drain anything already queued before honoring a disconnect, so
            // frames sent before the disconnect are never silently lost.
            match frames.try_recv() {
                Ok(frame) => return Ok(Some(frame)),
                Err(TryRecvError::Disconnected) => return Ok(None),
                Err(TryRecvError::Empty) => {}
            }
            if !self.open.load(Ordering::SeqCst) {
                // The disconnect store is ordered after any send that
                // preceded it, so one final drain cannot miss those frames.
                return match frames.try_recv() {
                    Ok(frame) => Ok(Some(frame)),
                    Err(_) => Ok(None),
                };
            }
            match frames.recv_timeout(Duration::from_millis(20)) {
                Ok(frame) => return Ok(Some(frame)),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Ok(None),
            }
        }
    }
}
