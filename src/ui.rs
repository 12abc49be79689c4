//! Control surface boundary.
//!
//! The widget toolkit that draws menus and pop-ups is an external
//! collaborator. The core hands it a [`SessionView`] to draw from and
//! receives back discrete [`OperatorAction`]s; nothing in here knows how the
//! surface is rendered.

use crate::command::dispatcher::OperatorAction;
use crate::error::CommandError;
use crate::mocap::ingestion::ConnectionState;
use crate::mocap::source::RigidBodyId;
use crate::scene::object::SceneObject;

/// Everything a control surface needs to draw one frame of status:
/// a detached scene snapshot plus the session's toggles.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub objects: Vec<SceneObject>,
    pub connection: ConnectionState,
    pub recording: bool,
    pub bindings: Vec<(String, RigidBodyId)>,
}

/// The interactive surface the operator drives the session through.
pub trait ControlSurface {
    /// Draw the current view and block until the operator picks an action.
    /// `None` means the surface was closed; the session ends.
    fn next_action(&mut self, view: &SessionView) -> Option<OperatorAction>;

    /// Show the outcome of a successful action.
    fn report(&mut self, message: &str);

    /// Show a recoverable error; the session stays usable.
    fn report_error(&mut self, error: &CommandError);
}
