//! The authoritative, mutex-guarded scene graph.
//!
//! Both the command dispatcher (operator thread) and the pose ingestion loop
//! (capture thread) mutate the store; rendering and serialization read it
//! through [`SceneGraphStore::snapshot`]. The lock is held only for the
//! duration of each call — a snapshot is a copy, never a live view, so no
//! reader can observe a half-applied mutation or stall the capture thread.

use std::sync::{Mutex, MutexGuard, PoisonError};

use cgmath::{Quaternion, Vector3};

use crate::error::SceneError;
use crate::scene::object::SceneObject;

/// Ordered name → object store. Insertion order is preserved so that
/// serialization output is deterministic.
#[derive(Debug, Default)]
pub struct SceneGraphStore {
    objects: Mutex<Vec<SceneObject>>,
}

impl SceneGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Every critical section below is a plain field read/write, so a
    // poisoned lock cannot hide a half-applied mutation; recover the data.
    fn lock(&self) -> MutexGuard<'_, Vec<SceneObject>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an object to the scene.
    ///
    /// Fails with [`SceneError::DuplicateName`] if the name is already taken,
    /// leaving the store unchanged.
    pub fn add(&self, object: SceneObject) -> Result<(), SceneError> {
        let mut objects = self.lock();
        if objects.iter().any(|o| o.name == object.name) {
            return Err(SceneError::DuplicateName(object.name));
        }
        log::debug!("scene: added {:?} \"{}\"", object.kind, object.name);
        objects.push(object);
        Ok(())
    }

    /// Look up an object by name, returning a copy.
    pub fn get(&self, name: &str) -> Result<SceneObject, SceneError> {
        self.lock()
            .iter()
            .find(|o| o.name == name)
            .cloned()
            .ok_or_else(|| SceneError::NotFound(name.to_string()))
    }

    /// Overwrite the pose of the named object in place.
    ///
    /// The orientation is renormalized before storing, so the unit-quaternion
    /// invariant holds for arbitrary input.
    pub fn update_pose(
        &self,
        name: &str,
        position: Vector3<f64>,
        orientation: Quaternion<f64>,
    ) -> Result<(), SceneError> {
        let mut objects = self.lock();
        let object = objects
            .iter_mut()
            .find(|o| o.name == name)
            .ok_or_else(|| SceneError::NotFound(name.to_string()))?;
        object.set_pose(position, orientation);
        Ok(())
    }

    /// A consistent point-in-time copy of the scene, in insertion order.
    ///
    /// The lock is released before this returns; callers can serialize or
    /// render the snapshot without blocking the ingestion loop.
    pub fn snapshot(&self) -> Vec<SceneObject> {
        self.lock().clone()
    }

    /// Whether an object with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.lock().iter().any(|o| o.name == name)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::object::ObjectKind;
    use cgmath::InnerSpace;

    fn airport(name: &str) -> SceneObject {
        SceneObject::new(ObjectKind::Airport, name, Vector3::new(0.0, 0.0, 0.0))
    }

    #[test]
    fn test_add_distinct_names() {
        let store = SceneGraphStore::new();
        store.add(airport("A1")).unwrap();
        store.add(airport("A2")).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.contains("A1"));
        assert!(store.contains("A2"));
    }

    #[test]
    fn test_duplicate_name_rejected_and_store_unchanged() {
        let store = SceneGraphStore::new();
        store.add(airport("A1")).unwrap();
        let err = store.add(airport("A1")).unwrap_err();
        assert!(matches!(err, SceneError::DuplicateName(name) if name == "A1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_missing_name() {
        let store = SceneGraphStore::new();
        assert!(matches!(store.get("nope"), Err(SceneError::NotFound(_))));
    }

    #[test]
    fn test_update_pose_normalizes() {
        let store = SceneGraphStore::new();
        store
            .add(SceneObject::new(
                ObjectKind::Drone,
                "cf1",
                Vector3::new(0.0, 0.0, 0.0),
            ))
            .unwrap();
        store
            .update_pose(
                "cf1",
                Vector3::new(1.0, 2.0, 3.0),
                Quaternion::new(0.5, 0.5, 0.5, 0.5) * 3.0,
            )
            .unwrap();
        let obj = store.get("cf1").unwrap();
        assert_eq!(obj.position, Vector3::new(1.0, 2.0, 3.0));
        assert!((obj.orientation.magnitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_update_pose_missing_name() {
        let store = SceneGraphStore::new();
        let err = store
            .update_pose(
                "ghost",
                Vector3::new(0.0, 0.0, 0.0),
                Quaternion::new(1.0, 0.0, 0.0, 0.0),
            )
            .unwrap_err();
        assert!(matches!(err, SceneError::NotFound(_)));
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let store = SceneGraphStore::new();
        store.add(airport("A1")).unwrap();
        let snap = store.snapshot();
        store
            .update_pose(
                "A1",
                Vector3::new(9.0, 9.0, 9.0),
                Quaternion::new(1.0, 0.0, 0.0, 0.0),
            )
            .unwrap();
        assert_eq!(snap[0].position, Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_snapshot_preserves_insertion_order() {
        let store = SceneGraphStore::new();
        for name in ["C", "A", "B"] {
            store.add(airport(name)).unwrap();
        }
        let names: Vec<_> = store.snapshot().into_iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }
}
