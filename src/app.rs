//! The interactive session object.
//!
//! `Session` owns the scene store, identity registry, ingestion loop, and
//! command dispatcher, and runs the operator loop against a pluggable
//! [`ControlSurface`]. It is the single place the pieces are wired together;
//! no component reaches the others through ambient state.

use std::sync::Arc;

use crate::command::dispatcher::{CommandDispatcher, OperatorAction};
use crate::error::CommandError;
use crate::mocap::ingestion::{ConnectionState, IngestionLoop};
use crate::mocap::registry::IdentityRegistry;
use crate::mocap::source::PoseFrameSource;
use crate::recording::RecordingBackend;
use crate::scene::store::SceneGraphStore;
use crate::ui::{ControlSurface, SessionView};

/// One interactive scene-building session.
pub struct Session<S: PoseFrameSource + 'static, R: RecordingBackend> {
    store: Arc<SceneGraphStore>,
    registry: Arc<IdentityRegistry>,
    ingestion: Arc<IngestionLoop<S>>,
    dispatcher: CommandDispatcher<S, R>,
}

impl<S: PoseFrameSource + 'static, R: RecordingBackend> Session<S, R> {
    /// Wire a session around a pose source and a recording backend.
    pub fn new(source: S, recorder: R) -> Self {
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
            Arc::clone(&ingestion),
            recorder,
        );
        Self {
            store,
            registry,
            ingestion,
            dispatcher,
        }
    }

    pub fn store(&self) -> &Arc<SceneGraphStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<IdentityRegistry> {
        &self.registry
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.ingestion.state()
    }

    /// A drawable snapshot of the whole session.
    pub fn view(&self) -> SessionView {
        SessionView {
            objects: self.store.snapshot(),
            connection: self.ingestion.state(),
            recording: self.dispatcher.is_recording(),
            bindings: self.registry.bindings(),
        }
    }

    /// Execute one operator action directly (the control surface normally
    /// goes through [`run`](Self::run), but embedders can drive this).
    pub fn dispatch(&mut self, action: OperatorAction) -> Result<String, CommandError> {
        self.dispatcher.dispatch(action)
    }

    /// Run the operator loop until the surface closes or the operator quits.
    ///
    /// Shutdown attempts a capture disconnect but the `Drop` path is the
    /// backstop: a misbehaving collaborator must not block process exit.
    pub fn run(&mut self, surface: &mut dyn ControlSurface) {
        loop {
            let view = self.view();
            let action = match surface.next_action(&view) {
                Some(OperatorAction::Quit) | None => break,
                Some(action) => action,
            };
            match self.dispatch(action) {
                Ok(message) => surface.report(&message),
                Err(err) => {
                    log::warn!("command failed: {}", err);
                    surface.report_error(&err);
                }
            }
        }
        self.ingestion.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocap::source::{ChannelSource, PoseFrame, RigidBodyId};
    use crate::recording::NullRecorder;
    use crate::scene::object::ObjectKind;
    use cgmath::{Quaternion, Vector3};

    /// Scripted surface: plays a fixed list of actions, records feedback.
    struct ScriptedSurface {
        actions: Vec<OperatorAction>,
        reports: Vec<String>,
        errors: usize,
    }

    impl ScriptedSurface {
        fn new(actions: Vec<OperatorAction>) -> Self {
            Self {
                actions,
                reports: Vec::new(),
                errors: 0,
            }
        }
    }

    impl ControlSurface for ScriptedSurface {
        fn next_action(&mut self, _view: &SessionView) -> Option<OperatorAction> {
            if self.actions.is_empty() {
                None
            } else {
                Some(self.actions.remove(0))
            }
        }

        fn report(&mut self, message: &str) {
            self.reports.push(message.to_string());
        }

        fn report_error(&mut self, _error: &CommandError) {
            self.errors += 1;
        }
    }

    #[test]
    fn test_connect_name_stream_scenario() {
        // connect succeeds -> "cf1" bound to "rb-7" -> frame arrives
        // -> get("cf1").position == (1, 2, 3)
        let (tx, source) = ChannelSource::new();
        let mut session = Session::new(source, NullRecorder::default());

        session.dispatch(OperatorAction::AddDrones).unwrap();
        session.dispatch(OperatorAction::Connect).unwrap();
        assert_eq!(session.connection_state(), ConnectionState::Streaming);

        session
            .dispatch(OperatorAction::NameDrones(vec![(
                "cf1".into(),
                RigidBodyId::from("rb-7"),
            )]))
            .unwrap();

        tx.send(PoseFrame {
            rigid_body: RigidBodyId::from("rb-7"),
            position: Vector3::new(1.0, 2.0, 3.0),
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            timestamp: 0.1,
        })
        .unwrap();

        session.dispatch(OperatorAction::Disconnect).unwrap();
        let cf1 = session.store().get("cf1").unwrap();
        assert_eq!(cf1.position, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(cf1.kind, ObjectKind::Drone);
    }

    #[test]
    fn test_repeat_connect_reports_already_connected() {
        let (_tx, source) = ChannelSource::new();
        let mut session = Session::new(source, NullRecorder::default());

        let first = session.dispatch(OperatorAction::Connect).unwrap();
        assert!(first.contains("bindings cleared"));

        let second = session.dispatch(OperatorAction::Connect).unwrap();
        assert!(second.contains("already connected"));
        assert_eq!(session.connection_state(), ConnectionState::Streaming);

        session.dispatch(OperatorAction::Disconnect).unwrap();
    }

    #[test]
    fn test_run_loop_reports_and_survives_errors() {
        let (_tx, source) = ChannelSource::new();
        let mut session = Session::new(source, NullRecorder::default());
        let mut surface = ScriptedSurface::new(vec![
            OperatorAction::AddDrones,
            OperatorAction::AddBuilding {
                kind: ObjectKind::Pole,
                name: Some("P1".into()),
                position: "garbage".into(),
                orientation: String::new(),
            },
            OperatorAction::AddBuilding {
                kind: ObjectKind::Pole,
                name: Some("P1".into()),
                position: "0 0 0".into(),
                orientation: String::new(),
            },
            OperatorAction::Quit,
        ]);

        session.run(&mut surface);

        assert_eq!(surface.errors, 1); // the malformed position
        assert_eq!(surface.reports.len(), 2);
        assert!(session.store().contains("P1"));
        assert_eq!(session.connection_state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_view_bundles_session_state() {
        let (_tx, source) = ChannelSource::new();
        let mut session = Session::new(source, NullRecorder::default());
        session.dispatch(OperatorAction::AddDrones).unwrap();
        session
            .dispatch(OperatorAction::NameDrones(vec![(
                "cf1".into(),
                RigidBodyId::from("rb-1"),
            )]))
            .unwrap();
        let view = session.view();
        assert_eq!(view.objects.len(), crate::command::parse::DRONE_BATCH_SIZE);
        assert_eq!(view.bindings.len(), 1);
        assert_eq!(view.connection, ConnectionState::Disconnected);
        assert!(!view.recording);
    }
}
