use thiserror::Error;

/// Errors emitted while defining models or building records.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("unsupported target shape '{shape}': expected a map or a record with typed fields")]
    UnsupportedShape { shape: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unknown model '{0}'")]
    UnknownModel(String),
    #[error("unknown generator '{0}'")]
    UnknownGenerator(String),
    #[error("invalid declaration: {0}")]
    InvalidDeclaration(String),
    #[error("field '{field}' not yet resolved or does not exist")]
    NotResolved { field: String },
    #[error("field '{field}' is excluded and cannot be resolved")]
    ExcludedResolved { field: String },
    #[error(transparent)]
    Construct(#[from] fixtura_core::Error),
    #[error("construction failed: {0}")]
    Custom(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("lock poisoned: {0}")]
    Poisoned(&'static str),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl FactoryError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
