use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlogError {
    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("You are not logged in. Run `devblog login` first.")]
    Unauthorized,

    #[error("Only the author can {0} this post")]
    Forbidden(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BlogError>;
