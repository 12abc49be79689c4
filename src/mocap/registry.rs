//! Drone name ↔ rigid-body identity bindings.
//!
//! The registry is written only by operator commands (name drones, session
//! reset) and read by the ingestion loop on every frame. It keeps its own
//! lock, independent from the scene store's, so the ingestion loop never
//! holds two locks at once.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::mocap::source::RigidBodyId;

/// Bidirectionally-unique mapping between drone names and rigid-body
/// identities; last writer wins on either key.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    bindings: Mutex<Vec<(String, RigidBodyId)>>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(String, RigidBodyId)>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind a drone name to a rigid-body identity, displacing any existing
    /// binding that shares either the name or the identity.
    ///
    /// This models the operator re-ticking drones in the capture UI, so it
    /// succeeds unconditionally. A frame processed after this returns
    /// observes the new mapping.
    pub fn bind(&self, name: impl Into<String>, rigid_body: RigidBodyId) {
        let name = name.into();
        let mut bindings = self.lock();
        bindings.retain(|(n, rb)| *n != name && *rb != rigid_body);
        log::info!("bound drone \"{}\" to rigid body {}", name, rigid_body);
        bindings.push((name, rigid_body));
    }

    /// Resolve a rigid-body identity to its bound drone name, if any.
    /// Unbound identities are not an error; the ingestion loop drops their
    /// frames silently.
    pub fn resolve(&self, rigid_body: &RigidBodyId) -> Option<String> {
        self.lock()
            .iter()
            .find(|(_, rb)| rb == rigid_body)
            .map(|(name, _)| name.clone())
    }

    /// Drop every binding. Called on reconnect: rigid-body identities are not
    /// stable across capture sessions, so the operator re-names drones.
    pub fn unbind_all(&self) {
        let mut bindings = self.lock();
        if !bindings.is_empty() {
            log::info!("cleared {} drone binding(s)", bindings.len());
        }
        bindings.clear();
    }

    /// Current bindings in binding order, for UI display.
    pub fn bindings(&self) -> Vec<(String, RigidBodyId)> {
        self.lock().clone()
    }
}
