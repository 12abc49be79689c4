//! # Scene Module
//!
//! The in-memory scene graph and its XML serialization.
//!
//! ## Key Components
//!
//! - [`SceneObject`] / [`ObjectKind`] - the placed entities
//! - [`SceneGraphStore`] - the authoritative, lock-guarded object store
//! - [`serializer`] - deterministic XML emission with atomic file replace
//!
//! The store is the single source of truth shared by the command dispatcher,
//! the pose ingestion loop, the control surface, and the serializer.

pub mod object;
pub mod serializer;
pub mod store;

pub use object::{ObjectKind, SceneObject};
pub use store::SceneGraphStore;
