//! Testing utilities
//!
//! Recording collaborators that stand in for the external stage commands,
//! so the orchestration can be checked without any image processing.

pub mod mocks;

pub use mocks::{CollaboratorCall, RecordingCollaborators};
