//! Command dispatcher.
//!
//! Translates discrete operator actions from the control surface into scene
//! store / identity registry mutations or side-channel calls. Runs on the
//! UI thread; every action is one atomic state transition, and a failed
//! action leaves the scene exactly as it was.

use std::path::PathBuf;

use cgmath::Vector3;

use crate::command::parse::{self, DRONE_SPAWN_POSITIONS};
use crate::error::{CommandError, ValidationError};
use crate::mocap::ingestion::IngestionLoop;
use crate::mocap::registry::IdentityRegistry;
use crate::mocap::source::{PoseFrameSource, RigidBodyId};
use crate::recording::{RecordingBackend, RecordingHandle};
use crate::scene::object::{ObjectKind, SceneObject};
use crate::scene::serializer;
use crate::scene::store::SceneGraphStore;
use std::sync::Arc;

/// A discrete operator action, as delivered by the control surface.
///
/// Position and orientation arrive as the raw dialog text; parsing and
/// validation happen here so a malformed entry can re-show the dialog
/// without touching the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorAction {
    AddBuilding {
        kind: ObjectKind,
        /// `None` means auto-name from the kind tag.
        name: Option<String>,
        position: String,
        orientation: String,
    },
    AddDrones,
    NameDrones(Vec<(String, RigidBodyId)>),
    Connect,
    Disconnect,
    ToggleRecording,
    SaveScene(PathBuf),
    Quit,
}

/// Applies operator actions to the session state.
pub struct CommandDispatcher<S: PoseFrameSource + 'static, R: RecordingBackend> {
    store: Arc<SceneGraphStore>,
    registry: Arc<IdentityRegistry>,
    ingestion: Arc<IngestionLoop<S>>,
    recorder: R,
    recording: Option<RecordingHandle>,
    next_drone_suffix: u32,
}

impl<S: PoseFrameSource + 'static, R: RecordingBackend> CommandDispatcher<S, R> {
    pub fn new(
        store: Arc<SceneGraphStore>,
        registry: Arc<IdentityRegistry>,
        ingestion: Arc<IngestionLoop<S>>,
        recorder: R,
    ) -> Self {
        Self {
            store,
            registry,
            ingestion,
            recorder,
            recording: None,
            next_drone_suffix: 1,
        }
    }

    /// Whether the recording side channel is currently active.
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Execute one action. Returns an operator-facing summary on success;
    /// every error variant is recoverable and leaves the session usable.
    pub fn dispatch(&mut self, action: OperatorAction) -> Result<String, CommandError> {
        match action {
            OperatorAction::AddBuilding {
                kind,
                name,
                position,
                orientation,
            } => self.add_building(kind, name, &position, &orientation),
            OperatorAction::AddDrones => self.add_drones(),
            OperatorAction::NameDrones(pairs) => self.name_drones(pairs),
            OperatorAction::Connect => {
                if self.ingestion.connect()? {
                    Ok("connected to motion-capture system; bindings cleared, re-name your drones"
                        .into())
                } else {
                    Ok("already connected to motion-capture system".into())
                }
            }
            OperatorAction::Disconnect => {
                self.ingestion.disconnect();
                Ok("disconnected from motion-capture system".into())
            }
            OperatorAction::ToggleRecording => self.toggle_recording(),
            OperatorAction::SaveScene(path) => {
                serializer::save_to_file(&self.store.snapshot(), &path)?;
                Ok(format!("scene saved to {}", path.display()))
            }
            OperatorAction::Quit => Ok("quit".into()),
        }
    }

    fn add_building(
        &mut self,
        kind: ObjectKind,
        name: Option<String>,
        position: &str,
        orientation: &str,
    ) -> Result<String, CommandError> {
        // Parse both fields before mutating anything.
        let position = parse::parse_position(position)?;
        let orientation = parse::parse_orientation(orientation)?;

        let name = match name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => self.auto_name(kind.xml_tag()),
        };

        let object = SceneObject::with_orientation(kind, name.clone(), position, orientation);
        self.store.add(object)?;
        Ok(format!("added {} \"{}\"", kind.xml_tag(), name))
    }

    fn add_drones(&mut self) -> Result<String, CommandError> {
        let mut names = Vec::with_capacity(DRONE_SPAWN_POSITIONS.len());
        for offset in DRONE_SPAWN_POSITIONS {
            let name = self.next_drone_name();
            let position = Vector3::new(offset[0], offset[1], offset[2]);
            // Names come from a fresh monotonic suffix, so add cannot collide.
            self.store
                .add(SceneObject::new(ObjectKind::Drone, name.clone(), position))?;
            names.push(name);
        }
        Ok(format!("added {} drones: {}", names.len(), names.join(", ")))
    }

    fn name_drones(&mut self, pairs: Vec<(String, RigidBodyId)>) -> Result<String, CommandError> {
        if pairs.is_empty() {
            return Err(ValidationError("no drone selections to bind".into()).into());
        }
        // Atomicity is per pair: a malformed entry is reported and skipped,
        // the well-formed pairs still bind.
        let mut bound = 0;
        let mut skipped = Vec::new();
        for (name, rigid_body) in pairs {
            if name.trim().is_empty() {
                skipped.push(format!("empty drone name for rigid body {}", rigid_body));
                continue;
            }
            self.registry.bind(name.trim().to_string(), rigid_body);
            bound += 1;
        }
        if !skipped.is_empty() {
            return Err(ValidationError(format!(
                "{} ({} other pair(s) bound)",
                skipped.join("; "),
                bound
            ))
            .into());
        }
        Ok(format!("bound {} drone(s)", bound))
    }

    fn toggle_recording(&mut self) -> Result<String, CommandError> {
        match self.recording {
            None => {
                // Failure leaves the toggle off.
                let handle = self.recorder.start()?;
                self.recording = Some(handle);
                Ok("recording started".into())
            }
            Some(handle) => {
                // Failure keeps the handle so the toggle state reverts to
                // "recording" and a later stop can still succeed.
                let path = self.recorder.stop(handle)?;
                self.recording = None;
                Ok(format!("recording saved to {}", path.display()))
            }
        }
    }

    /// Next `cf<n>` name, advancing a monotonic suffix that is never reused
    /// across invocations and skipping names the operator already took.
    fn next_drone_name(&mut self) -> String {
        loop {
            let candidate = format!("cf{}", self.next_drone_suffix);
            self.next_drone_suffix += 1;
            if !self.store.contains(&candidate) {
                return candidate;
            }
        }
    }

    /// Auto-name a static object from its tag: `Hospital1`, `Hospital2`, ...
    fn auto_name(&self, tag: &str) -> String {
        let mut n = 1;
        loop {
            let candidate = format!("{}{}", tag, n);
            if !self.store.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parse::DRONE_BATCH_SIZE;
    use crate::error::SceneError;
    use crate::mocap::source::ChannelSource;
    use crate::recording::NullRecorder;

    fn dispatcher() -> (
        CommandDispatcher<ChannelSource, NullRecorder>,
        Arc<SceneGraphStore>,
        Arc<IdentityRegistry>,
    ) {
        let (_tx, source) = ChannelSource::new();
        let store = Arc::new(SceneGraphStore::new());
        let registry = Arc::new(IdentityRegistry::new());
        let ingestion = Arc::new(IngestionLoop::new(
            Arc::new(source),
            Arc::clone(&store),
            Arc::clone(&registry),
        ));
        let dispatcher = CommandDispatcher::new(
            Arc::clone(&store),
            Arc::clone(&registry),
            ingestion,
            NullRecorder::default(),
        );
        (dispatcher, store, registry)
    }

    fn add_building_action(name: Option<&str>, position: &str) -> OperatorAction {
        OperatorAction::AddBuilding {
            kind: ObjectKind::HospitalBuilding,
            name: name.map(String::from),
            position: position.into(),
            orientation: String::new(),
        }
    }

    #[test]
    fn test_add_building() {
        let (mut dispatcher, store, _) = dispatcher();
        dispatcher
            .dispatch(add_building_action(Some("H1"), "1 2 0"))
            .unwrap();
        let obj = store.get("H1").unwrap();
        assert_eq!(obj.kind, ObjectKind::HospitalBuilding);
        assert_eq!(obj.position, Vector3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_add_building_duplicate_name_leaves_scene_unchanged() {
        let (mut dispatcher, store, _) = dispatcher();
        dispatcher
            .dispatch(add_building_action(Some("H1"), "0 0 0"))
            .unwrap();
        let err = dispatcher
            .dispatch(add_building_action(Some("H1"), "5 5 5"))
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::Scene(SceneError::DuplicateName(_))
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("H1").unwrap().position, Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_add_building_malformed_position_rejected() {
        let (mut dispatcher, store, _) = dispatcher();
        let err = dispatcher
            .dispatch(add_building_action(Some("H1"), "not a position"))
            .unwrap_err();
        assert!(matches!(err, CommandError::Validation(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_building_auto_name() {
        let (mut dispatcher, store, _) = dispatcher();
        dispatcher.dispatch(add_building_action(None, "0 0 0")).unwrap();
        dispatcher.dispatch(add_building_action(None, "1 0 0")).unwrap();
        assert!(store.contains("Hospital1"));
        assert!(store.contains("Hospital2"));
    }

    #[test]
    fn test_add_drones_batch() {
        let (mut dispatcher, store, _) = dispatcher();
        dispatcher.dispatch(OperatorAction::AddDrones).unwrap();
        assert_eq!(store.len(), DRONE_BATCH_SIZE);
        let snapshot = store.snapshot();
        assert!(snapshot.iter().all(|o| o.kind.is_drone()));
        // pairwise-distinct names
        let mut names: Vec<_> = snapshot.iter().map(|o| o.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), DRONE_BATCH_SIZE);
    }

    #[test]
    fn test_repeated_add_drones_never_collides() {
        let (mut dispatcher, store, _) = dispatcher();
        dispatcher.dispatch(OperatorAction::AddDrones).unwrap();
        dispatcher.dispatch(OperatorAction::AddDrones).unwrap();
        assert_eq!(store.len(), 2 * DRONE_BATCH_SIZE);
        assert!(store.contains("cf1"));
        assert!(store.contains(&format!("cf{}", 2 * DRONE_BATCH_SIZE)));
    }

    #[test]
    fn test_add_drones_skips_operator_taken_names() {
        let (mut dispatcher, store, _) = dispatcher();
        store
            .add(SceneObject::new(
                ObjectKind::Pole,
                "cf2",
                Vector3::new(0.0, 0.0, 0.0),
            ))
            .unwrap();
        dispatcher.dispatch(OperatorAction::AddDrones).unwrap();
        // cf2 was taken by the pole; the batch ran through to cf5
        assert!(store.contains("cf5"));
        assert_eq!(store.get("cf2").unwrap().kind, ObjectKind::Pole);
    }

    #[test]
    fn test_name_drones_binds_pairs() {
        let (mut dispatcher, _, registry) = dispatcher();
        dispatcher
            .dispatch(OperatorAction::NameDrones(vec![
                ("cf1".into(), RigidBodyId::from("rb-7")),
                ("cf2".into(), RigidBodyId::from("rb-8")),
            ]))
            .unwrap();
        assert_eq!(registry.resolve(&RigidBodyId::from("rb-7")), Some("cf1".into()));
        assert_eq!(registry.resolve(&RigidBodyId::from("rb-8")), Some("cf2".into()));
    }

    #[test]
    fn test_name_drones_malformed_pair_skipped_others_still_bind() {
        let (mut dispatcher, _, registry) = dispatcher();
        let err = dispatcher
            .dispatch(OperatorAction::NameDrones(vec![
                ("cf1".into(), RigidBodyId::from("rb-7")),
                ("  ".into(), RigidBodyId::from("rb-8")),
            ]))
            .unwrap_err();
        assert!(matches!(err, CommandError::Validation(_)));
        assert_eq!(registry.resolve(&RigidBodyId::from("rb-7")), Some("cf1".into()));
        assert_eq!(registry.resolve(&RigidBodyId::from("rb-8")), None);
        assert_eq!(registry.bindings().len(), 1);
    }

    #[test]
    fn test_name_drones_all_malformed_binds_nothing() {
        let (mut dispatcher, _, registry) = dispatcher();
        let err = dispatcher
            .dispatch(OperatorAction::NameDrones(vec![(
                "".into(),
                RigidBodyId::from("rb-8"),
            )]))
            .unwrap_err();
        assert!(matches!(err, CommandError::Validation(_)));
        assert!(registry.bindings().is_empty());
    }

    #[test]
    fn test_recording_toggle_round_trip() {
        let (mut dispatcher, _, _) = dispatcher();
        assert!(!dispatcher.is_recording());
        dispatcher.dispatch(OperatorAction::ToggleRecording).unwrap();
        assert!(dispatcher.is_recording());
        let message = dispatcher
            .dispatch(OperatorAction::ToggleRecording)
            .unwrap();
        assert!(!dispatcher.is_recording());
        assert!(message.contains("recording_1.mp4"));
    }

    struct FailingStopRecorder;

    impl RecordingBackend for FailingStopRecorder {
        fn start(&mut self) -> Result<RecordingHandle, crate::error::RecordingError> {
            Ok(RecordingHandle(1))
        }
        fn stop(
            &mut self,
            _handle: RecordingHandle,
        ) -> Result<std::path::PathBuf, crate::error::RecordingError> {
            Err(crate::error::RecordingError("encoder died".into()))
        }
    }

    #[test]
    fn test_failed_stop_keeps_recording_state() {
        let (_tx, source) = ChannelSource::new();
        let store = Arc::new(SceneGraphStore::new());
        let registry = Arc::new(IdentityRegistry::new());
        let ingestion = Arc::new(IngestionLoop::new(
            Arc::new(source),
            Arc::clone(&store),
            Arc::clone(&registry),
        ));
        let mut dispatcher =
            CommandDispatcher::new(store, registry, ingestion, FailingStopRecorder);

        dispatcher.dispatch(OperatorAction::ToggleRecording).unwrap();
        let err = dispatcher
            .dispatch(OperatorAction::ToggleRecording)
            .unwrap_err();
        assert!(matches!(err, CommandError::Recording(_)));
        assert!(dispatcher.is_recording());
    }

    #[test]
    fn test_save_scene_writes_serialized_snapshot() {
        let (mut dispatcher, store, _) = dispatcher();
        dispatcher
            .dispatch(add_building_action(Some("H1"), "1 2 3"))
            .unwrap();
        let path = std::env::temp_dir().join(format!(
            "dronelab_dispatcher_test_{}.xml",
            std::process::id()
        ));
        dispatcher
            .dispatch(OperatorAction::SaveScene(path.clone()))
            .unwrap();
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, serializer::serialize(&store.snapshot()).unwrap());
        let _ = std::fs::remove_file(&path);
    }
}
