//! Mock Project Service Implementation
//!
//! Programmable in-memory stand-in for the remote project service:
//! - `MockProjectService`: authoritative project store with request recording
//! - `MockBehavior`: controls generation outcome and delay
//! - `GenerationOutcome`: Complete, Fail, or Stall (never finishes)
//!
//! The mock enforces the same server-side rules as the real service: unknown
//! projects are rejected, assets are only mutable while the project is a
//! draft, settings are validated against the same ranges, and generation
//! completes asynchronously after the trigger call has returned.

use std::sync::{Arc, Mutex, RwLock};

use uuid::Uuid;

use promoreel_projects::domain::assets::validate_image_batch;
use promoreel_projects::{AssetKind, Project, SettingsPatch, UploadFile};

use crate::{CreateProjectRequest, ProjectService, ServiceError};

/// What outcome a triggered generation should produce
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Move the project to completed with a video URL
    #[default]
    Complete,
    /// Move the project to failed
    Fail,
    /// Leave the project processing forever
    Stall,
}

/// Programmable behavior for the mock project service
#[derive(Debug, Clone)]
pub struct MockBehavior {
    outcome: Arc<RwLock<GenerationOutcome>>,
    delay_ms: Arc<RwLock<u64>>,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            outcome: Arc::new(RwLock::new(GenerationOutcome::Complete)),
            delay_ms: Arc::new(RwLock::new(10)),
        }
    }
}

impl MockBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the generation outcome
    pub fn set_outcome(&self, outcome: GenerationOutcome) {
        *self.outcome.write().unwrap() = outcome;
    }

    /// Configure the delay before the outcome is applied
    pub fn set_delay_ms(&self, delay: u64) {
        *self.delay_ms.write().unwrap() = delay;
    }

    /// Reset to default behavior
    pub fn reset(&self) {
        *self.outcome.write().unwrap() = GenerationOutcome::Complete;
        *self.delay_ms.write().unwrap() = 10;
    }

    /// Read current outcome
    pub fn get_outcome(&self) -> GenerationOutcome {
        *self.outcome.read().unwrap()
    }

    /// Read current delay
    pub fn get_delay_ms(&self) -> u64 {
        *self.delay_ms.read().unwrap()
    }
}

/// A recorded service request for test assertions
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    CreateProject { name: String },
    UploadImages { project_id: Uuid, count: usize },
    UploadLogo { project_id: Uuid },
    UploadMusic { project_id: Uuid },
    UpdateSettings { project_id: Uuid },
    TriggerGeneration { project_id: Uuid },
}

/// Mock project service with programmable behavior
#[derive(Debug, Clone, Default)]
pub struct MockProjectService {
    behavior: Arc<MockBehavior>,
    projects: Arc<Mutex<Vec<Project>>>,
    history: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockProjectService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: Arc<MockBehavior>) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    /// Get the shared behavior for external configuration
    pub fn behavior(&self) -> &Arc<MockBehavior> {
        &self.behavior
    }

    /// Get recorded service requests
    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.history.lock().unwrap().clone()
    }

    /// Clear request history
    pub fn reset_history(&self) {
        self.history.lock().unwrap().clear();
    }

    fn record(&self, request: RecordedRequest) {
        self.history.lock().unwrap().push(request);
    }

    fn with_project<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Project) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut projects = self.projects.lock().unwrap();
        let project = projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;
        f(project)
    }

    fn require_draft(project: &Project, what: &str) -> Result<(), ServiceError> {
        if !project.is_draft() {
            return Err(ServiceError::Response(format!(
                "{} can only be changed while the project is a draft",
                what
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProjectService for MockProjectService {
    async fn create_project(
        &self,
        request: CreateProjectRequest,
    ) -> Result<Project, ServiceError> {
        self.record(RecordedRequest::CreateProject {
            name: request.name.clone(),
        });
        let project = Project::new(request.name.clone(), request.settings())
            .map_err(|e| ServiceError::Response(e.to_string()))?;
        tracing::info!(project_id = %project.id, name = %project.name, "Mock service: project created");
        self.projects.lock().unwrap().push(project.clone());
        Ok(project)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ServiceError> {
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn get_project(&self, id: Uuid) -> Result<Project, ServiceError> {
        self.with_project(id, |p| Ok(p.clone()))
    }

    async fn upload_images(&self, id: Uuid, files: Vec<UploadFile>) -> Result<(), ServiceError> {
        self.record(RecordedRequest::UploadImages {
            project_id: id,
            count: files.len(),
        });
        self.with_project(id, |project| {
            Self::require_draft(project, "Images")?;
            validate_image_batch(&files).map_err(|e| ServiceError::Response(e.to_string()))?;
            project
                .images
                .extend(files.iter().map(|f| f.to_base64()));
            tracing::info!(project_id = %id, count = files.len(), "Mock service: images uploaded");
            Ok(())
        })
    }

    async fn upload_logo(&self, id: Uuid, file: UploadFile) -> Result<(), ServiceError> {
        self.record(RecordedRequest::UploadLogo { project_id: id });
        self.with_project(id, |project| {
            Self::require_draft(project, "Logo")?;
            file.validate(AssetKind::Logo)
                .map_err(|e| ServiceError::Response(e.to_string()))?;
            project.logo_file = Some(file.to_base64());
            Ok(())
        })
    }

    async fn upload_music(&self, id: Uuid, file: UploadFile) -> Result<(), ServiceError> {
        self.record(RecordedRequest::UploadMusic { project_id: id });
        self.with_project(id, |project| {
            Self::require_draft(project, "Music")?;
            file.validate(AssetKind::Music)
                .map_err(|e| ServiceError::Response(e.to_string()))?;
            project.music_file = Some(file.to_base64());
            Ok(())
        })
    }

    async fn update_settings(&self, id: Uuid, patch: SettingsPatch) -> Result<(), ServiceError> {
        self.record(RecordedRequest::UpdateSettings { project_id: id });
        self.with_project(id, |project| {
            let mut merged = project.settings;
            patch.apply_to(&mut merged);
            merged
                .validate()
                .map_err(|e| ServiceError::Response(e.to_string()))?;
            project.settings = merged;
            Ok(())
        })
    }

    async fn trigger_generation(&self, id: Uuid) -> Result<(), ServiceError> {
        self.record(RecordedRequest::TriggerGeneration { project_id: id });
        self.with_project(id, |project| {
            project
                .start_generation()
                .map_err(|e| ServiceError::Response(e.to_string()))
        })?;
        tracing::info!(project_id = %id, "Mock service: generation started");

        let outcome = self.behavior.get_outcome();
        if outcome == GenerationOutcome::Stall {
            return Ok(());
        }

        let delay_ms = self.behavior.get_delay_ms();
        let projects = Arc::clone(&self.projects);
        tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
            let mut projects = projects.lock().unwrap();
            if let Some(project) = projects.iter_mut().find(|p| p.id == id) {
                let result = match outcome {
                    GenerationOutcome::Complete => {
                        let url = format!("/api/videos/{}_{}.mp4", id, project.settings.resolution);
                        project.complete_generation(url)
                    }
                    GenerationOutcome::Fail => project.fail_generation(),
                    GenerationOutcome::Stall => unreachable!(),
                };
                if let Err(e) = result {
                    tracing::warn!(project_id = %id, error = %e, "Mock service: outcome not applied");
                }
            }
        });

        Ok(())
    }

    async fn fetch_video(&self, video_url: &str) -> Result<Vec<u8>, ServiceError> {
        let projects = self.projects.lock().unwrap();
        let known = projects
            .iter()
            .any(|p| p.video_url.as_deref() == Some(video_url));
        if !known {
            return Err(ServiceError::NotFound("Video not found".to_string()));
        }
        Ok(format!("mock-video:{}", video_url).into_bytes())
    }
}
