use rolldown_error::BatchedBuildDiagnostic;
use std::path::PathBuf;
use thiserror::*;

#[derive(Error, Debug)]
pub enum KilnError {
    #[error("I/O Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Notify Error: {0}")]
    NotifyError(#[from] notify::Error),

    #[error("Rolldown Error: {0}")]
    RolldownError(#[from] BatchedBuildDiagnostic),

    #[error("Build error: {0}")]
    Build(#[from] anyhow::Error),

    #[error("Invalid import map {path}: {source}")]
    ImportMap {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to clean {path}: {source}")]
    Clean {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Watcher error: {0}")]
    Watcher(String),
}

pub type KilnResult<T = ()> = Result<T, KilnError>;

impl KilnError {
    pub fn response(&self) -> axum::http::Response<String> {
        use axum::http::{Response, StatusCode};

        let (message, code) = match self {
            KilnError::IoError(e) => (e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
            KilnError::FileNotFound(file) => {
                (format!("File not found: {}", file), StatusCode::NOT_FOUND)
            }
            _ => (self.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
        };

        Response::builder()
            .status(code)
            .body(message)
            .unwrap_or_else(|_| Response::new("Internal Server Error".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn missing_file_renders_as_not_found() {
        let response = KilnError::FileNotFound("dist/app.js".into()).response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), "File not found: dist/app.js");
    }

    #[test]
    fn other_errors_render_as_internal_errors() {
        let response = KilnError::Watcher("channel closed".into()).response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), "Watcher error: channel closed");
    }
}
