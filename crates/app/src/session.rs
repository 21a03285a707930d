//! Session-wide application state
//!
//! One `Session` exists per user session: the cached project list, the current
//! project, the current project's materialized previews, and the advisory busy
//! flag. It is created at session start and torn down at session end; there is
//! no partial teardown. All reads go through accessors, all writes through the
//! replace operations below, so the orchestrator is the only mutation path.

use uuid::Uuid;

use promoreel_common::{Error, Result};
use promoreel_projects::domain::assets::decode_previews;
use promoreel_projects::{PreviewAsset, Project};

/// Mutable session state owned by the orchestrator
#[derive(Debug, Default)]
pub struct Session {
    projects: Vec<Project>,
    current_id: Option<Uuid>,
    previews: Vec<PreviewAsset>,
    busy: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// All projects known to this session. No ordering guarantee.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// The current project, if one is selected
    pub fn current(&self) -> Option<&Project> {
        let id = self.current_id?;
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn current_id(&self) -> Option<Uuid> {
        self.current_id
    }

    /// Decoded previews of the current project's images, materialized on
    /// selection and refresh
    pub fn previews(&self) -> &[PreviewAsset] {
        &self.previews
    }

    /// True while a service request is in flight. Advisory state for the UI
    /// to disable duplicate triggers, not a lock.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub(crate) fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// Add a newly created project and make it current
    pub(crate) fn insert_current(&mut self, project: Project) -> Result<()> {
        let id = project.id;
        self.projects.retain(|p| p.id != id);
        self.projects.push(project);
        self.current_id = Some(id);
        self.rebuild_previews()
    }

    /// Replace the whole project list with the service's authoritative copy.
    /// The current selection is kept if it still exists, cleared otherwise.
    pub(crate) fn replace_all(&mut self, projects: Vec<Project>) -> Result<()> {
        self.projects = projects;
        if let Some(id) = self.current_id {
            if !self.projects.iter().any(|p| p.id == id) {
                self.current_id = None;
            }
        }
        self.rebuild_previews()
    }

    /// Make a known project the current one
    pub(crate) fn select(&mut self, id: Uuid) -> Result<()> {
        if !self.projects.iter().any(|p| p.id == id) {
            return Err(Error::NotFound(format!("Project '{}' is not known", id)));
        }
        self.current_id = Some(id);
        self.rebuild_previews()
    }

    /// Merge a freshly fetched project into the session, wholesale
    pub(crate) fn absorb(&mut self, remote: Project) -> Result<()> {
        match self.projects.iter_mut().find(|p| p.id == remote.id) {
            Some(local) => local.absorb(remote),
            None => self.projects.push(remote),
        }
        self.rebuild_previews()
    }

    /// Rematerialize the preview list from the current project's stored
    /// (base64) image encodings
    fn rebuild_previews(&mut self) -> Result<()> {
        let previews = match self.current() {
            Some(project) => decode_previews(&project.images)?,
            None => Vec::new(),
        };
        self.previews = previews;
        Ok(())
    }
}
