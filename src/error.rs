use thiserror::Error;

/// Errors raised while loading, parsing or drawing the scene.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    /// Bad face reference style, out-of-range index, missing values.
    #[error("line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    /// A face range references a material absent from the entity's table.
    #[error("material '{0}' is not defined")]
    MissingMaterial(String),

    /// A material lacks a field required by the active lighting mode.
    #[error("material '{material}' has no {field} value")]
    MissingMaterialField {
        material: String,
        field: &'static str,
    },

    /// The asset source could not deliver a file.
    #[error("failed to load '{path}': {message}")]
    LoadFailure { path: String, message: String },

    /// An operation was called in the wrong lifecycle state.
    #[error("usage error: {0}")]
    UsageError(String),
}

impl SceneError {
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        SceneError::MalformedInput {
            line,
            message: message.into(),
        }
    }

    pub fn load_failure(path: impl Into<String>, message: impl ToString) -> Self {
        SceneError::LoadFailure {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
