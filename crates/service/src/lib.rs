//! Promoreel Project Service
//!
//! Boundary to the remote project service that stores projects, accepts asset
//! uploads, and renders videos:
//! - HTTP client for the production service
//! - Programmable mock service for testing and development
//! - Configurable provider and base URL

pub mod client;
pub mod mock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use promoreel_projects::{Project, ProjectSettings, SettingsPatch, UploadFile};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Project service configuration error: {0}")]
    Configuration(String),

    #[error("Project service request error: {0}")]
    Request(String),

    #[error("Project service response error: {0}")]
    Response(String),

    #[error("Project service: not found: {0}")]
    NotFound(String),
}

impl From<ServiceError> for promoreel_common::Error {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(msg) => promoreel_common::Error::NotFound(msg),
            other => promoreel_common::Error::Service(other.to_string()),
        }
    }
}

/// Request to create a new project, in the service's wire shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub duration: u32,
    pub logo_opacity: f64,
    pub resolution: promoreel_projects::Resolution,
}

impl CreateProjectRequest {
    pub fn new(name: impl Into<String>, settings: ProjectSettings) -> Self {
        Self {
            name: name.into(),
            duration: settings.duration,
            logo_opacity: settings.logo_opacity,
            resolution: settings.resolution,
        }
    }

    pub fn settings(&self) -> ProjectSettings {
        ProjectSettings {
            duration: self.duration,
            logo_opacity: self.logo_opacity,
            resolution: self.resolution,
        }
    }
}

/// Project service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Service provider (http, mock)
    pub provider: String,
    /// Base URL of the project service API
    pub base_url: String,
}

impl ServiceConfig {
    /// Derive service config from application configuration.
    pub fn from_app_config(config: &promoreel_common::Config) -> Result<Self, ServiceError> {
        if config.service_provider == "http" && config.api_base_url.is_empty() {
            return Err(ServiceError::Configuration(
                "API_BASE_URL is required for the http provider".to_string(),
            ));
        }

        Ok(Self {
            provider: config.service_provider.clone(),
            base_url: config.api_base_url.clone(),
        })
    }

    /// Create service config from environment variables.
    pub fn from_env() -> Result<Self, ServiceError> {
        let config = promoreel_common::Config::from_env()
            .map_err(|e| ServiceError::Configuration(e.to_string()))?;
        Self::from_app_config(&config)
    }
}

/// Remote project service contract.
///
/// Every mutating call is a sequential request/response interaction; the
/// generation trigger is the one asynchronous edge: it returns once the
/// service has accepted the request, and the outcome is observed by
/// re-fetching the project.
#[async_trait::async_trait]
pub trait ProjectService: Send + Sync {
    /// Create a project; the service assigns the id and returns the full
    /// representation with `status = draft`.
    async fn create_project(&self, request: CreateProjectRequest)
        -> Result<Project, ServiceError>;

    /// List all projects known to the service for this caller.
    async fn list_projects(&self) -> Result<Vec<Project>, ServiceError>;

    /// Fetch the authoritative representation of one project.
    async fn get_project(&self, id: Uuid) -> Result<Project, ServiceError>;

    /// Associate a batch of images with the project.
    async fn upload_images(&self, id: Uuid, files: Vec<UploadFile>) -> Result<(), ServiceError>;

    /// Replace the project's logo.
    async fn upload_logo(&self, id: Uuid, file: UploadFile) -> Result<(), ServiceError>;

    /// Replace the project's background music.
    async fn upload_music(&self, id: Uuid, file: UploadFile) -> Result<(), ServiceError>;

    /// Apply a subset of settings fields server-side.
    async fn update_settings(&self, id: Uuid, patch: SettingsPatch) -> Result<(), ServiceError>;

    /// Hand the project to the rendering pipeline. Does not block until
    /// completion; poll `get_project` to observe the outcome.
    async fn trigger_generation(&self, id: Uuid) -> Result<(), ServiceError>;

    /// Download a rendered video by its `video_url` reference.
    async fn fetch_video(&self, video_url: &str) -> Result<Vec<u8>, ServiceError>;
}

/// Factory for creating ProjectService implementations
pub struct ProjectServiceFactory;

impl ProjectServiceFactory {
    /// Create a ProjectService based on configuration.
    pub fn create(config: ServiceConfig) -> Result<Box<dyn ProjectService>, ServiceError> {
        match config.provider.as_str() {
            "http" => {
                tracing::info!(base_url = %config.base_url, "Creating HTTP project service");
                Ok(Box::new(client::HttpProjectService::new(&config.base_url)?))
            }
            "mock" => {
                tracing::info!("Creating mock project service");
                Ok(Box::new(mock::MockProjectService::new()))
            }
            provider => Err(ServiceError::Configuration(format!(
                "Unknown project service provider: {}. Supported providers: http, mock",
                provider
            ))),
        }
    }
}
