//! # Motion Capture Module
//!
//! Everything between the capture feed and the scene store: the
//! [`PoseFrameSource`] collaborator boundary, the operator-controlled
//! [`IdentityRegistry`], and the [`IngestionLoop`] worker that applies
//! streaming pose frames to bound drones.

pub mod ingestion;
pub mod registry;
pub mod source;

pub use ingestion::{ConnectionState, IngestionLoop};
pub use registry::IdentityRegistry;
pub use source::{ChannelSource, PoseFrame, PoseFrameSource, RigidBodyId};
