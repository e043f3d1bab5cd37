#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write record slot: {0}")]
    SlotWrite(std::io::Error),
    #[error("failed to back up unreadable record slot: {0}")]
    SlotBackup(std::io::Error),
    #[error("failed to serialize records: {0}")]
    Serialization(serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidInput(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
