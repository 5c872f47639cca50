//! Error types for the cd-app service layer.

/// Application error wrapping the errors of the backend crates.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration validation failed: {0}")]
    Validation(String),

    #[error("Mass-loss table error: {0}")]
    MassLossTable(String),

    #[error("Initial conditions error: {0}")]
    InitialConditions(String),

    #[error("Disk setup error: {0}")]
    Disk(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cd-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<cd_config::ConfigError> for AppError {
    fn from(err: cd_config::ConfigError) -> Self {
        match err {
            cd_config::ConfigError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Config(other.to_string()),
        }
    }
}

impl From<cd_config::ValidationError> for AppError {
    fn from(err: cd_config::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<cd_photo::PhotoError> for AppError {
    fn from(err: cd_photo::PhotoError) -> Self {
        AppError::MassLossTable(err.to_string())
    }
}

impl From<cd_dynamics::DynamicsError> for AppError {
    fn from(err: cd_dynamics::DynamicsError) -> Self {
        AppError::InitialConditions(err.to_string())
    }
}

impl From<cd_disk::DiskError> for AppError {
    fn from(err: cd_disk::DiskError) -> Self {
        AppError::Disk(err.to_string())
    }
}

impl From<cd_sim::SimError> for AppError {
    fn from(err: cd_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<cd_results::ResultsError> for AppError {
    fn from(err: cd_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Results(err.to_string())
    }
}
