use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Capture Error: {0}")]
    Capture(String),

    #[error("Recording Error: {0}")]
    Recording(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("Config Parse Error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Vision Error: {0}")]
    Vision(String),
}
