use crate::artifact::ArtifactKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplatError {
    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    #[error(
        "executable not found: neither {} nor {} could be started",
        .standard.display(),
        .high_res.display()
    )]
    ExecutableNotFound { standard: PathBuf, high_res: PathBuf },

    #[error("executable not found: {}", .0.display())]
    ExecutableMissing(PathBuf),

    #[error("failed to start {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} exited successfully but did not write {}", .path.display())]
    MissingOutput { kind: ArtifactKind, path: PathBuf },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Image(#[from] image::ImageError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed record {file}: {reason}")]
    Record { file: String, reason: String },

    #[error("invalid parameter '{field}': {reason}")]
    Param { field: &'static str, reason: String },

    #[error("invalid upload name {0:?}")]
    UploadName(String),
}
