//! Domain entities for the Projects domain
//!
//! Entities carry constructor-time validation and delegate every status change
//! to the lifecycle state machine. Their serde representation is the project
//! service's wire shape: lowercase statuses, settings flattened to top-level
//! fields, asset payloads stored base64-encoded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use promoreel_common::{Error, Result, StateError};

use crate::domain::state::{ProjectEvent, ProjectState, ProjectStateMachine};

/// Output resolution of the generated video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Resolution {
    #[serde(rename = "720p")]
    Hd720,
    #[default]
    #[serde(rename = "1080p")]
    Hd1080,
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hd720 => write!(f, "720p"),
            Self::Hd1080 => write!(f, "1080p"),
        }
    }
}

/// Generation parameters attached to a project
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Target video length in seconds
    pub duration: u32,
    /// Logo overlay opacity, 0.0 (invisible) to 1.0 (opaque)
    pub logo_opacity: f64,
    pub resolution: Resolution,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            duration: 30,
            logo_opacity: 0.8,
            resolution: Resolution::Hd1080,
        }
    }
}

impl ProjectSettings {
    pub const MIN_DURATION_SECS: u32 = 15;
    pub const MAX_DURATION_SECS: u32 = 60;

    /// Validate every field against its range
    pub fn validate(&self) -> Result<()> {
        if self.duration < Self::MIN_DURATION_SECS || self.duration > Self::MAX_DURATION_SECS {
            return Err(Error::Validation(format!(
                "Duration must be {}-{} seconds, got {}",
                Self::MIN_DURATION_SECS,
                Self::MAX_DURATION_SECS,
                self.duration
            )));
        }
        if !self.logo_opacity.is_finite() || !(0.0..=1.0).contains(&self.logo_opacity) {
            return Err(Error::Validation(format!(
                "Logo opacity must be between 0 and 1, got {}",
                self.logo_opacity
            )));
        }
        Ok(())
    }
}

/// A partial settings update. Absent fields are left unchanged; defaults are
/// established once at project creation, never re-invented per update.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.duration.is_none() && self.logo_opacity.is_none() && self.resolution.is_none()
    }

    /// Validate each present field against its range
    pub fn validate(&self) -> Result<()> {
        let mut merged = ProjectSettings::default();
        self.apply_to(&mut merged);
        merged.validate()
    }

    /// Merge present fields into existing settings
    pub fn apply_to(&self, settings: &mut ProjectSettings) {
        if let Some(duration) = self.duration {
            settings.duration = duration;
        }
        if let Some(logo_opacity) = self.logo_opacity {
            settings.logo_opacity = logo_opacity;
        }
        if let Some(resolution) = self.resolution {
            settings.resolution = resolution;
        }
    }
}

/// Project status as reported on the wire
///
/// A status string this client does not recognize deserializes to `Unknown`;
/// reconciliation treats it as "no observation" instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl ProjectStatus {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        self.to_state().map(|s| s.is_terminal()).unwrap_or(false)
    }

    /// Convert to state machine state; `Unknown` has no state-machine meaning
    pub fn to_state(&self) -> Option<ProjectState> {
        match self {
            ProjectStatus::Draft => Some(ProjectState::Draft),
            ProjectStatus::Processing => Some(ProjectState::Processing),
            ProjectStatus::Completed => Some(ProjectState::Completed),
            ProjectStatus::Failed => Some(ProjectState::Failed),
            ProjectStatus::Unknown => None,
        }
    }

    /// Create from state machine state
    pub fn from_state(state: ProjectState) -> Self {
        match state {
            ProjectState::Draft => ProjectStatus::Draft,
            ProjectState::Processing => ProjectStatus::Processing,
            ProjectState::Completed => ProjectStatus::Completed,
            ProjectState::Failed => ProjectStatus::Failed,
        }
    }
}

/// Project entity: one video being assembled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// Base64-encoded image payloads, in slideshow order
    #[serde(default)]
    pub images: Vec<String>,
    /// Base64-encoded logo payload
    #[serde(default)]
    pub logo_file: Option<String>,
    /// Base64-encoded music payload
    #[serde(default)]
    pub music_file: Option<String>,
    #[serde(flatten)]
    pub settings: ProjectSettings,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub video_url: Option<String>,
    pub status: ProjectStatus,
}

impl Project {
    pub const MAX_NAME_LEN: usize = 200;

    /// Create a new draft project with validation. Used on the authoritative
    /// (service) side; clients receive projects already carrying an id.
    pub fn new(name: impl Into<String>, settings: ProjectSettings) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        settings.validate()?;

        Ok(Project {
            id: Uuid::new_v4(),
            name,
            images: Vec::new(),
            logo_file: None,
            music_file: None,
            settings,
            created_at: Utc::now(),
            video_url: None,
            status: ProjectStatus::Draft,
        })
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    /// True while assets and settings may still be mutated
    pub fn is_draft(&self) -> bool {
        self.status == ProjectStatus::Draft
    }

    /// Commit the project's inputs and move it to processing.
    ///
    /// Generation requires at least one image; triggering from any status but
    /// draft is a precondition failure.
    pub fn start_generation(&mut self) -> Result<()> {
        if !self.has_images() {
            return Err(Error::Precondition(
                "Generation requires at least one image".to_string(),
            ));
        }
        let new_state = self.apply_transition(ProjectEvent::Generate)?;
        self.status = ProjectStatus::from_state(new_state);
        Ok(())
    }

    /// Mark generation as succeeded, attaching the rendered output reference
    pub fn complete_generation(&mut self, video_url: String) -> Result<()> {
        let new_state = self.apply_transition(ProjectEvent::GenerationSucceeded)?;
        self.status = ProjectStatus::from_state(new_state);
        self.video_url = Some(video_url);
        Ok(())
    }

    /// Mark generation as failed
    pub fn fail_generation(&mut self) -> Result<()> {
        let new_state = self.apply_transition(ProjectEvent::GenerationFailed)?;
        self.status = ProjectStatus::from_state(new_state);
        self.video_url = None;
        Ok(())
    }

    /// Replace this project wholesale with the service's authoritative copy.
    ///
    /// Every field is taken from the remote representation except status,
    /// which is reconciled monotonically: refreshes must never move a project
    /// backward through its lifecycle, and an unrecognized remote status is
    /// ignored. The `video_url ⇔ completed` invariant is re-established on
    /// the merged result.
    pub fn absorb(&mut self, remote: Project) {
        let status = match (self.status.to_state(), remote.status.to_state()) {
            (Some(current), observed) => {
                ProjectStatus::from_state(ProjectStateMachine::reconcile(current, observed))
            }
            (None, Some(observed)) => ProjectStatus::from_state(observed),
            (None, None) => self.status,
        };

        let mut next = remote;
        next.status = status;
        if next.status == ProjectStatus::Completed {
            if next.video_url.is_none() {
                next.video_url = self.video_url.take();
            }
        } else {
            next.video_url = None;
        }
        *self = next;
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        self.settings.validate()?;

        let completed = self.status == ProjectStatus::Completed;
        if completed != self.video_url.is_some() {
            return Err(Error::Validation(
                "video_url must be present exactly when status is completed".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply a state transition using the state machine
    fn apply_transition(&self, event: ProjectEvent) -> Result<ProjectState> {
        let current = self.status.to_state().ok_or_else(|| {
            Error::Precondition(format!(
                "Project '{}' has an unrecognized status and cannot transition",
                self.id
            ))
        })?;
        ProjectStateMachine::transition(current, event).map_err(|e| match e {
            StateError::InvalidTransition { from, event, .. } => Error::Precondition(format!(
                "Invalid project transition: cannot apply '{}' event from '{}' state",
                event, from
            )),
            StateError::TerminalState(state) => Error::Precondition(format!(
                "Project is in terminal state '{}' and cannot transition",
                state
            )),
            StateError::GuardFailed(msg) => Error::Precondition(msg),
        })
    }
}

/// Project names are non-empty (after trimming) and bounded
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation(
            "Project name must not be empty".to_string(),
        ));
    }
    if name.len() > Project::MAX_NAME_LEN {
        return Err(Error::Validation(format!(
            "Project name must be ≤{} characters",
            Project::MAX_NAME_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_creation() {
        let settings = ProjectSettings {
            duration: 20,
            logo_opacity: 0.5,
            resolution: Resolution::Hd1080,
        };
        let project = Project::new("Summer Sale", settings).unwrap();

        assert_eq!(project.name, "Summer Sale");
        assert_eq!(project.status, ProjectStatus::Draft);
        assert!(project.images.is_empty());
        assert!(project.logo_file.is_none());
        assert!(project.music_file.is_none());
        assert!(project.video_url.is_none());
        assert_eq!(project.settings, settings);
    }

    #[test]
    fn test_project_name_validation() {
        assert!(Project::new("", ProjectSettings::default()).is_err());
        assert!(Project::new("   ", ProjectSettings::default()).is_err());
        assert!(Project::new("a".repeat(201), ProjectSettings::default()).is_err());
        assert!(Project::new("a".repeat(200), ProjectSettings::default()).is_ok());
    }

    #[test]
    fn test_settings_range_validation() {
        let valid = ProjectSettings::default();
        assert!(valid.validate().is_ok());

        for duration in [14, 61, 100, 0] {
            let s = ProjectSettings {
                duration,
                ..ProjectSettings::default()
            };
            assert!(s.validate().is_err(), "duration {} should fail", duration);
        }
        for duration in [15, 30, 60] {
            let s = ProjectSettings {
                duration,
                ..ProjectSettings::default()
            };
            assert!(s.validate().is_ok(), "duration {} should pass", duration);
        }

        for logo_opacity in [-0.1, 1.1, f64::NAN, f64::INFINITY] {
            let s = ProjectSettings {
                logo_opacity,
                ..ProjectSettings::default()
            };
            assert!(s.validate().is_err(), "opacity {} should fail", logo_opacity);
        }
        for logo_opacity in [0.0, 0.5, 1.0] {
            let s = ProjectSettings {
                logo_opacity,
                ..ProjectSettings::default()
            };
            assert!(s.validate().is_ok(), "opacity {} should pass", logo_opacity);
        }
    }

    #[test]
    fn test_settings_defaults() {
        let settings = ProjectSettings::default();
        assert_eq!(settings.duration, 30);
        assert_eq!(settings.logo_opacity, 0.8);
        assert_eq!(settings.resolution, Resolution::Hd1080);
    }

    #[test]
    fn test_patch_validation_and_merge() {
        let patch = SettingsPatch {
            duration: Some(45),
            ..SettingsPatch::default()
        };
        assert!(patch.validate().is_ok());

        let mut settings = ProjectSettings::default();
        patch.apply_to(&mut settings);
        assert_eq!(settings.duration, 45);
        // Absent fields untouched
        assert_eq!(settings.logo_opacity, 0.8);
        assert_eq!(settings.resolution, Resolution::Hd1080);

        let bad = SettingsPatch {
            duration: Some(100),
            ..SettingsPatch::default()
        };
        assert!(bad.validate().is_err());

        assert!(SettingsPatch::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_generation_requires_images() {
        let mut project = Project::new("No Images", ProjectSettings::default()).unwrap();
        let err = project.start_generation().unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert_eq!(project.status, ProjectStatus::Draft);
    }

    #[test]
    fn test_generation_lifecycle() {
        let mut project = Project::new("Lifecycle", ProjectSettings::default()).unwrap();
        project.images.push("aGVsbG8=".to_string());

        project.start_generation().unwrap();
        assert_eq!(project.status, ProjectStatus::Processing);

        // Second trigger is a precondition failure
        assert!(matches!(
            project.start_generation(),
            Err(Error::Precondition(_))
        ));

        project
            .complete_generation("/api/videos/out.mp4".to_string())
            .unwrap();
        assert_eq!(project.status, ProjectStatus::Completed);
        assert_eq!(project.video_url.as_deref(), Some("/api/videos/out.mp4"));
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_failed_generation_has_no_video_url() {
        let mut project = Project::new("Doomed", ProjectSettings::default()).unwrap();
        project.images.push("aGVsbG8=".to_string());
        project.start_generation().unwrap();
        project.fail_generation().unwrap();

        assert_eq!(project.status, ProjectStatus::Failed);
        assert!(project.video_url.is_none());
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_absorb_replaces_wholesale() {
        let mut local = Project::new("Local", ProjectSettings::default()).unwrap();
        let mut remote = local.clone();
        remote.images = vec!["YQ==".to_string(), "Yg==".to_string()];
        remote.settings.duration = 45;
        remote.status = ProjectStatus::Processing;

        local.absorb(remote.clone());
        assert_eq!(local, remote);
    }

    #[test]
    fn test_absorb_never_regresses_status() {
        let mut local = Project::new("Monotonic", ProjectSettings::default()).unwrap();
        local.images.push("YQ==".to_string());
        local.start_generation().unwrap();

        let mut stale = local.clone();
        stale.status = ProjectStatus::Draft;
        local.absorb(stale);
        assert_eq!(local.status, ProjectStatus::Processing);

        local
            .complete_generation("/api/videos/v.mp4".to_string())
            .unwrap();
        let mut regressed = local.clone();
        regressed.status = ProjectStatus::Processing;
        regressed.video_url = None;
        local.absorb(regressed);
        assert_eq!(local.status, ProjectStatus::Completed);
        // Invariant survives the merge even though the stale copy had no URL
        assert_eq!(local.video_url.as_deref(), Some("/api/videos/v.mp4"));
        assert!(local.validate().is_ok());
    }

    #[test]
    fn test_absorb_ignores_unrecognized_status() {
        let mut local = Project::new("Unknown", ProjectSettings::default()).unwrap();
        local.images.push("YQ==".to_string());
        local.start_generation().unwrap();

        let mut weird = local.clone();
        weird.status = ProjectStatus::Unknown;
        local.absorb(weird);
        assert_eq!(local.status, ProjectStatus::Processing);
    }

    #[test]
    fn test_wire_shape_round_trip() {
        let json = json!({
            "id": "6f8a2f64-9c2e-4bca-8f8d-0d2f6f7a1b2c",
            "name": "Wire",
            "images": ["YQ=="],
            "duration": 20,
            "logo_opacity": 0.8,
            "resolution": "1080p",
            "music_file": null,
            "logo_file": null,
            "created_at": "2024-05-01T12:00:00Z",
            "video_url": null,
            "status": "draft"
        });
        let project: Project = serde_json::from_value(json).unwrap();
        assert_eq!(project.name, "Wire");
        assert_eq!(project.settings.duration, 20);
        assert_eq!(project.settings.resolution, Resolution::Hd1080);
        assert_eq!(project.status, ProjectStatus::Draft);

        // Settings flatten back to top-level fields
        let value = serde_json::to_value(&project).unwrap();
        assert_eq!(value["duration"], 20);
        assert_eq!(value["resolution"], "1080p");
        assert_eq!(value["status"], "draft");
    }

    #[test]
    fn test_unrecognized_status_deserializes_to_unknown() {
        let json = json!({
            "id": "6f8a2f64-9c2e-4bca-8f8d-0d2f6f7a1b2c",
            "name": "Wire",
            "images": [],
            "duration": 30,
            "logo_opacity": 0.8,
            "resolution": "720p",
            "created_at": "2024-05-01T12:00:00Z",
            "status": "archived"
        });
        let project: Project = serde_json::from_value(json).unwrap();
        assert_eq!(project.status, ProjectStatus::Unknown);
        assert!(!project.status.is_terminal());
    }
}
