//! HTTP Project Service Implementation
//!
//! Real client for the project service REST API: JSON for project CRUD,
//! multipart for asset uploads, form encoding for settings updates.

use reqwest::multipart;
use uuid::Uuid;

use promoreel_projects::{Project, SettingsPatch, UploadFile};

use crate::{CreateProjectRequest, ProjectService, ServiceError};

/// HTTP client for the project service API.
pub struct HttpProjectService {
    http: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpProjectService {
    /// Create a new client against the given API base URL
    /// (e.g. `http://localhost:8000/api`).
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        let base_url = reqwest::Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ServiceError::Configuration(format!("Invalid base URL: {}", e)))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Check a response's status, mapping failures to ServiceError
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response body".to_string());
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound(body));
        }
        Err(ServiceError::Response(format!(
            "Project service returned {}: {}",
            status, body
        )))
    }

    fn multipart_part(file: UploadFile) -> Result<multipart::Part, ServiceError> {
        let content_type = file.content_type.clone();
        multipart::Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(&content_type)
            .map_err(|e| ServiceError::Request(format!("Invalid content type: {}", e)))
    }

    async fn upload_single(
        &self,
        id: Uuid,
        route: &str,
        file: UploadFile,
    ) -> Result<(), ServiceError> {
        let form = multipart::Form::new().part("file", Self::multipart_part(file)?);
        let response = self
            .http
            .post(self.endpoint(&format!("projects/{}/{}", id, route)))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProjectService for HttpProjectService {
    async fn create_project(
        &self,
        request: CreateProjectRequest,
    ) -> Result<Project, ServiceError> {
        let response = self
            .http
            .post(self.endpoint("projects"))
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;
        let project = Self::check(response)
            .await?
            .json::<Project>()
            .await
            .map_err(|e| ServiceError::Response(e.to_string()))?;
        tracing::debug!(project_id = %project.id, "Project created");
        Ok(project)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ServiceError> {
        let response = self
            .http
            .get(self.endpoint("projects"))
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;
        Self::check(response)
            .await?
            .json::<Vec<Project>>()
            .await
            .map_err(|e| ServiceError::Response(e.to_string()))
    }

    async fn get_project(&self, id: Uuid) -> Result<Project, ServiceError> {
        let response = self
            .http
            .get(self.endpoint(&format!("projects/{}", id)))
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;
        Self::check(response)
            .await?
            .json::<Project>()
            .await
            .map_err(|e| ServiceError::Response(e.to_string()))
    }

    async fn upload_images(&self, id: Uuid, files: Vec<UploadFile>) -> Result<(), ServiceError> {
        let count = files.len();
        let mut form = multipart::Form::new();
        for file in files {
            form = form.part("files", Self::multipart_part(file)?);
        }
        let response = self
            .http
            .post(self.endpoint(&format!("projects/{}/upload-images", id)))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;
        Self::check(response).await?;
        tracing::debug!(project_id = %id, count, "Images uploaded");
        Ok(())
    }

    async fn upload_logo(&self, id: Uuid, file: UploadFile) -> Result<(), ServiceError> {
        self.upload_single(id, "upload-logo", file).await
    }

    async fn upload_music(&self, id: Uuid, file: UploadFile) -> Result<(), ServiceError> {
        self.upload_single(id, "upload-music", file).await
    }

    async fn update_settings(&self, id: Uuid, patch: SettingsPatch) -> Result<(), ServiceError> {
        // Only fields present in the patch go on the wire
        let mut fields: Vec<(&str, String)> = Vec::new();
        if let Some(duration) = patch.duration {
            fields.push(("duration", duration.to_string()));
        }
        if let Some(logo_opacity) = patch.logo_opacity {
            fields.push(("logo_opacity", logo_opacity.to_string()));
        }
        if let Some(resolution) = patch.resolution {
            fields.push(("resolution", resolution.to_string()));
        }

        let response = self
            .http
            .put(self.endpoint(&format!("projects/{}/settings", id)))
            .form(&fields)
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn trigger_generation(&self, id: Uuid) -> Result<(), ServiceError> {
        let response = self
            .http
            .post(self.endpoint(&format!("projects/{}/generate", id)))
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;
        Self::check(response).await?;
        tracing::info!(project_id = %id, "Generation triggered");
        Ok(())
    }

    async fn fetch_video(&self, video_url: &str) -> Result<Vec<u8>, ServiceError> {
        // video_url is a reference resolvable against the service's origin
        let url = self
            .base_url
            .join(video_url)
            .map_err(|e| ServiceError::Request(format!("Invalid video URL: {}", e)))?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;
        let bytes = Self::check(response)
            .await?
            .bytes()
            .await
            .map_err(|e| ServiceError::Response(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
