//! Pose ingestion loop.
//!
//! Drains the capture feed on its own thread and applies each frame to the
//! matching scene object, so that a slow UI frame never stalls pose updates
//! and a burst of frames never stalls the UI.
//!
//! State machine: `Disconnected → Connecting → Streaming → Disconnected`,
//! with one `Streaming` self-loop per frame. Connecting is operator-driven;
//! there is no automatic reconnect after a stream error (a physical tracking
//! rig should not be hammered by silent retry storms).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crate::error::{SceneError, StreamError};
use crate::mocap::registry::IdentityRegistry;
use crate::mocap::source::{PoseFrame, PoseFrameSource};
use crate::scene::store::SceneGraphStore;

/// Link state, published for the UI status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Streaming,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Streaming => "streaming",
        };
        f.write_str(label)
    }
}

/// Owns the capture worker thread and the connection state machine.
pub struct IngestionLoop<S: PoseFrameSource + 'static> {
    source: Arc<S>,
    store: Arc<SceneGraphStore>,
    registry: Arc<IdentityRegistry>,
    state: Arc<Mutex<ConnectionState>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<S: PoseFrameSource + 'static> IngestionLoop<S> {
    pub fn new(
        source: Arc<S>,
        store: Arc<SceneGraphStore>,
        registry: Arc<IdentityRegistry>,
    ) -> Self {
        Self {
            source,
            store,
            registry,
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            worker: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *lock(&self.state)
    }

    /// Connect to the capture system and start streaming.
    ///
    /// On success all identity bindings are cleared — rigid-body identities
    /// are not stable across capture sessions, so the operator must re-name
    /// drones — and the worker thread starts draining the feed. On failure
    /// the loop stays `Disconnected` and the error is returned for display.
    ///
    /// Returns `Ok(false)` when the loop is already connecting or streaming;
    /// nothing happens in that case, in particular bindings are kept.
    pub fn connect(&self) -> Result<bool, StreamError> {
        if self.state() != ConnectionState::Disconnected {
            log::info!("connect requested while {}", self.state());
            return Ok(false);
        }
        *lock(&self.state) = ConnectionState::Connecting;

        if let Err(err) = self.source.connect() {
            *lock(&self.state) = ConnectionState::Disconnected;
            return Err(err);
        }

        self.registry.unbind_all();

        // Publish Streaming before the worker starts so a feed that ends
        // immediately cannot have its Disconnected write overwritten.
        *lock(&self.state) = ConnectionState::Streaming;

        let source = Arc::clone(&self.source);
        let store = Arc::clone(&self.store);
        let registry = Arc::clone(&self.registry);
        let state = Arc::clone(&self.state);
        let handle = thread::spawn(move || {
            stream_frames(&*source, &store, &registry);
            *lock(&state) = ConnectionState::Disconnected;
        });

        *lock(&self.worker) = Some(handle);
        log::info!("motion-capture link up, streaming");
        Ok(true)
    }

    /// Tear down the link and join the worker.
    ///
    /// Frames already queued by the source are still applied before the
    /// worker exits (source contract: disconnect unblocks the next receive
    /// promptly, after the queue drains).
    pub fn disconnect(&self) {
        self.source.disconnect();
        if let Some(handle) = lock(&self.worker).take() {
            if handle.join().is_err() {
                log::warn!("ingestion worker panicked during shutdown");
            }
        }
        *lock(&self.state) = ConnectionState::Disconnected;
    }
}

impl<S: PoseFrameSource + 'static> Drop for IngestionLoop<S> {
    fn drop(&mut self) {
        // Best effort: unblock the worker but never block process exit on it.
        self.source.disconnect();
        drop(lock(&self.worker).take());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Worker body: `Streaming → Streaming` per frame until the feed ends.
fn stream_frames<S: PoseFrameSource>(
    source: &S,
    store: &SceneGraphStore,
    registry: &IdentityRegistry,
) {
    loop {
        match source.recv() {
            Ok(Some(frame)) => apply_frame(store, registry, frame),
            Ok(None) => {
                log::info!("pose stream ended");
                return;
            }
            Err(err) => {
                log::warn!("pose stream error: {}", err);
                return;
            }
        }
    }
}

/// Apply one frame to the store.
///
/// Resolve and update are two separate critical sections on two separate
/// locks; a `bind` racing between them costs at most one frame applied to
/// the prior binding. Unresolved identities and bound-but-absent names are
/// expected transient states, not errors, and the frame is dropped silently.
fn apply_frame(store: &SceneGraphStore, registry: &IdentityRegistry, frame: PoseFrame) {
    let Some(name) = registry.resolve(&frame.rigid_body) else {
        log::debug!("dropping frame for unbound rigid body {}", frame.rigid_body);
        return;
    };
    match store.update_pose(&name, frame.position, frame.orientation) {
        Ok(()) => {}
        Err(SceneError::NotFound(_)) => {
            log::debug!(
                "dropping frame for \"{}\": bound but not in the scene yet",
                name
            );
        }
        Err(err) => log::warn!("pose update for \"{}\" failed: {}", name, err),
    }
}
