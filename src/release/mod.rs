//! Release artifacts and the media group built from them.

pub mod artifacts;
pub mod context;
pub mod payload;

pub use artifacts::{collect_artifacts, Artifact, ArtifactSet};
pub use context::ReleaseContext;
pub use payload::{build_caption, read_release_notes, MediaDescriptor, MediaGroupPayload};
