use thiserror::Error;

/// Failures while loading, saving or validating a [`crate::WorldConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failures while constructing or reconfiguring a [`crate::World`].
#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to spawn chunk mesh worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}
