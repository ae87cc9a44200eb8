use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("DOCUMENT_NOT_FOUND: {0}")]
    DocumentNotFound(String),
    #[error("SECTION_BOUNDARY_NOT_FOUND: {0}")]
    SectionBoundaryNotFound(String),
    #[error("STORE_IO: {0}")]
    StoreIo(String),
    #[error("CONFIGURATION: {0}")]
    Configuration(String),
    #[error("UNSUPPORTED_SECTION: {0}")]
    UnsupportedSection(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::StoreIo(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Configuration(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
