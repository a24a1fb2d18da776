use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("camera error: {0}")]
    Camera(String),
    #[error("model file not found: {}", .0.display())]
    ModelMissing(PathBuf),
    #[error("window error: {0}")]
    Window(String),
    #[error("pointer error: {0}")]
    Pointer(String),
    #[error("configuration error: {0}")]
    Config(String),
}
