use thiserror::Error;

/// All the ways things can go wrong in Alexandria
///
/// We use thiserror here because it generates the boilerplate for us.
/// Life's too short to manually implement Display and Error traits.
#[derive(Error, Debug)]
pub enum Error {
    /// The request never reached the API. Reported to the user separately
    /// from a failed lookup, mirroring a pre-flight connectivity check.
    #[error("No network connection: {0}")]
    NetworkUnavailable(String),

    #[error("Metadata lookup failed: {0}")]
    ApiError(String),

    #[error("Store operation failed: {0}")]
    StoreError(#[from] alexandria_store::StoreError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
