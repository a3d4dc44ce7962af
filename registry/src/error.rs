use crate::types::ProjectId;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("no project matches id {0}")]
    NotFound(String),

    #[error("id prefix `{0}` matches more than one project")]
    Ambiguous(String),

    #[error("project {project} has no screenshot {screenshot}")]
    ScreenshotNotFound { project: ProjectId, screenshot: Uuid },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
