use thiserror::Error;

use crate::error::SceneError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Cli(String),
    #[error("scene setup failed: {0}")]
    Scene(#[from] SceneError),
    #[error("{0}")]
    Renderer(String),
}
