//! Orchestration command handlers
//!
//! Every mutating operation follows the same sequencing rule:
//! 1. guard on local preconditions (a missing current project is a no-op,
//!    reflecting a UI-idle state rather than a fault),
//! 2. perform the mutation against the project service,
//! 3. on success, re-fetch the full project and replace cached state
//!    wholesale through one reusable `refresh` operation,
//! 4. on failure, leave prior state untouched and surface the error.
//!
//! The session busy flag is held across each service interaction so a UI can
//! disable duplicate triggers while a request is in flight.

use std::sync::Arc;

use uuid::Uuid;

use promoreel_common::{Config, Error, Result};
use promoreel_projects::domain::assets::validate_image_batch;
use promoreel_projects::domain::entities::validate_name;
use promoreel_projects::{AssetKind, Project, ProjectSettings, SettingsPatch, UploadFile};
use promoreel_service::{
    CreateProjectRequest, ProjectService, ProjectServiceFactory, ServiceConfig,
};

use crate::session::Session;

/// Sequences user-triggered operations against the project service
pub struct Orchestrator {
    service: Arc<dyn ProjectService>,
    session: Session,
}

impl Orchestrator {
    pub fn new(service: Arc<dyn ProjectService>) -> Self {
        Self {
            service,
            session: Session::new(),
        }
    }

    /// Build an orchestrator from environment configuration, selecting the
    /// service provider through the factory
    pub fn from_env() -> Result<Self> {
        let config = Config::from_env()?;
        let service = ProjectServiceFactory::create(ServiceConfig::from_app_config(&config)?)?;
        Ok(Self::new(Arc::from(service)))
    }

    /// Read access to session state for rendering
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Create a new draft project and make it the current one
    pub async fn create_project(
        &mut self,
        name: &str,
        settings: ProjectSettings,
    ) -> Result<Project> {
        self.guard_idle()?;
        validate_name(name)?;
        settings.validate()?;

        self.session.set_busy(true);
        let result = self
            .service
            .create_project(CreateProjectRequest::new(name, settings))
            .await;
        self.session.set_busy(false);

        let project = result?;
        tracing::info!(project_id = %project.id, name = %project.name, "Project created");
        self.session.insert_current(project.clone())?;
        Ok(project)
    }

    /// Replace the session's project list with the service's authoritative one
    pub async fn load_projects(&mut self) -> Result<()> {
        self.guard_idle()?;
        self.session.set_busy(true);
        let result = self.service.list_projects().await;
        self.session.set_busy(false);

        let projects = result?;
        tracing::debug!(count = projects.len(), "Project list loaded");
        self.session.replace_all(projects)
    }

    /// Make a known project the current one, rematerializing its previews
    pub fn select_project(&mut self, id: Uuid) -> Result<&Project> {
        self.session.select(id)?;
        self.session
            .current()
            .ok_or_else(|| Error::NotFound(format!("Project '{}' is not known", id)))
    }

    /// Upload a batch of images to the current project. The batch is atomic:
    /// if any file fails validation, nothing is uploaded.
    pub async fn upload_images(&mut self, files: Vec<UploadFile>) -> Result<()> {
        let Some(project) = self.session.current() else {
            tracing::debug!("No current project; ignoring image upload");
            return Ok(());
        };
        let id = project.id;
        if !project.is_draft() {
            return Err(Error::Precondition(
                "Assets can only be changed while the project is a draft".to_string(),
            ));
        }
        self.guard_idle()?;
        validate_image_batch(&files)?;

        let count = files.len();
        self.session.set_busy(true);
        let result = match self.service.upload_images(id, files).await {
            Ok(()) => self.refresh(id).await,
            Err(e) => Err(e.into()),
        };
        self.session.set_busy(false);

        if result.is_ok() {
            tracing::info!(project_id = %id, count, "Images uploaded");
        }
        result
    }

    /// Upload or replace the current project's logo
    pub async fn upload_logo(&mut self, file: UploadFile) -> Result<()> {
        let Some(project) = self.session.current() else {
            tracing::debug!("No current project; ignoring logo upload");
            return Ok(());
        };
        let id = project.id;
        if !project.is_draft() {
            return Err(Error::Precondition(
                "Assets can only be changed while the project is a draft".to_string(),
            ));
        }
        self.guard_idle()?;
        file.validate(AssetKind::Logo)?;

        self.session.set_busy(true);
        let result = match self.service.upload_logo(id, file).await {
            Ok(()) => self.refresh(id).await,
            Err(e) => Err(e.into()),
        };
        self.session.set_busy(false);
        result
    }

    /// Upload or replace the current project's background music
    pub async fn upload_music(&mut self, file: UploadFile) -> Result<()> {
        let Some(project) = self.session.current() else {
            tracing::debug!("No current project; ignoring music upload");
            return Ok(());
        };
        let id = project.id;
        if !project.is_draft() {
            return Err(Error::Precondition(
                "Assets can only be changed while the project is a draft".to_string(),
            ));
        }
        self.guard_idle()?;
        file.validate(AssetKind::Music)?;

        self.session.set_busy(true);
        let result = match self.service.upload_music(id, file).await {
            Ok(()) => self.refresh(id).await,
            Err(e) => Err(e.into()),
        };
        self.session.set_busy(false);
        result
    }

    /// Apply a partial settings update to the current project. Each present
    /// field is validated against the merged result before anything is sent.
    pub async fn update_settings(&mut self, patch: SettingsPatch) -> Result<()> {
        let Some(project) = self.session.current() else {
            tracing::debug!("No current project; ignoring settings update");
            return Ok(());
        };
        let id = project.id;
        if patch.is_empty() {
            return Ok(());
        }
        let mut merged = project.settings;
        patch.apply_to(&mut merged);
        merged.validate()?;
        self.guard_idle()?;

        self.session.set_busy(true);
        let result = match self.service.update_settings(id, patch).await {
            Ok(()) => self.refresh(id).await,
            Err(e) => Err(e.into()),
        };
        self.session.set_busy(false);
        result
    }

    /// Trigger generation of the current project. Inputs are committed at
    /// this point; the outcome is observed through subsequent refreshes.
    pub async fn generate(&mut self) -> Result<()> {
        let Some(project) = self.session.current() else {
            tracing::debug!("No current project; ignoring generation request");
            return Ok(());
        };
        let id = project.id;
        if !project.has_images() {
            return Err(Error::Precondition(
                "Generation requires at least one image".to_string(),
            ));
        }
        if !project.is_draft() {
            return Err(Error::Precondition(
                "Generation can only be triggered from a draft project".to_string(),
            ));
        }
        self.guard_idle()?;

        self.session.set_busy(true);
        let result = match self.service.trigger_generation(id).await {
            Ok(()) => self.refresh(id).await,
            Err(e) => Err(e.into()),
        };
        self.session.set_busy(false);

        if result.is_ok() {
            tracing::info!(project_id = %id, "Generation triggered");
        }
        result
    }

    /// Re-fetch the current project's authoritative state
    pub async fn refresh_current(&mut self) -> Result<Project> {
        let Some(id) = self.session.current_id() else {
            return Err(Error::Precondition("No current project".to_string()));
        };
        self.guard_idle()?;

        self.session.set_busy(true);
        let result = self.refresh(id).await;
        self.session.set_busy(false);
        result?;

        self.session
            .current()
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Project '{}' is not known", id)))
    }

    /// Download the current project's rendered video
    pub async fn download_video(&mut self) -> Result<Vec<u8>> {
        let Some(project) = self.session.current() else {
            return Err(Error::Precondition("No current project".to_string()));
        };
        let Some(video_url) = project.video_url.clone() else {
            return Err(Error::Precondition(
                "Project has no rendered video".to_string(),
            ));
        };
        self.guard_idle()?;

        self.session.set_busy(true);
        let result = self.service.fetch_video(&video_url).await;
        self.session.set_busy(false);
        Ok(result?)
    }

    /// The single reconciliation operation: fetch the authoritative project
    /// and replace local cached state wholesale (status monotonic, previews
    /// rematerialized). Invoked after every successful mutation.
    async fn refresh(&mut self, id: Uuid) -> Result<()> {
        let remote = self.service.get_project(id).await?;
        self.session.absorb(remote)
    }

    fn guard_idle(&self) -> Result<()> {
        if self.session.is_busy() {
            return Err(Error::Precondition(
                "Another operation is in progress".to_string(),
            ));
        }
        Ok(())
    }
}
