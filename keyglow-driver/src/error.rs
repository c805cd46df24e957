//! Driver error types

use thiserror::Error;

/// Errors that can occur while bringing up the vendor SDK
#[derive(Error, Debug)]
pub enum DriverError {
    /// The native lighting library could not be loaded at all.
    #[error("native lighting library unavailable: {0}")]
    NativeUnavailable(String),

    /// The library loaded but refused to initialize.
    #[error("lighting SDK initialization failed: {0}")]
    InitFailed(String),
}
