use thiserror::Error;

#[derive(Error, Debug)]
pub enum GcovError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("{tool} exited with {status}:\n{stderr}")]
    Tool {
        tool: String,
        status: String,
        stderr: String,
    },
}

pub type Result<T> = std::result::Result<T, GcovError>;
