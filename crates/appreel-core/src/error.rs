use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Section is not attachable: {0}")]
    NotAttachable(String),

    #[error("Section already has an active timeline: {0}")]
    DoubleAttach(String),

    #[error("Invalid slide plan: {0}")]
    InvalidPlan(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalogue error: {0}")]
    Catalogue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
