use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad threshold, undisplayable slot, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Missing required column in a target table.
    #[error("dataset '{dataset}': missing column '{column}'")]
    MissingColumn { dataset: String, column: String },
}
