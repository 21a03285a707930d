//! Projects domain: video projects, assets, lifecycle state machine

pub mod domain;

// Re-export domain types at the crate root for convenience
pub use domain::assets::{AssetKind, PreviewAsset, UploadFile};
pub use domain::entities::{Project, ProjectSettings, ProjectStatus, Resolution, SettingsPatch};
pub use domain::state::{ProjectEvent, ProjectState, ProjectStateMachine};
