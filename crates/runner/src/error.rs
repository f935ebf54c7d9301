use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("runner exited with {status}: {stderr_tail}")]
    Failed { status: i32, stderr_tail: String },

    #[error("script requires libraries that are not linked: {}", libs.join(", "))]
    MissingLibraries { libs: Vec<String> },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Frame(#[from] treb_events::EventError),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
