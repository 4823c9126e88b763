use thiserror::Error;

/// Failures a caller has to tell apart from plain validation messages.
///
/// Raised through `anyhow` like every other error in the crate; recover the
/// variant with `err.downcast_ref::<TrackerError>()`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("User not found")]
    UserNotFound(String),
    #[error("User already exists")]
    UserAlreadyExists(String),
    #[error("Not logged in. Run `caltrack login <email>` or `caltrack signup` first")]
    NotLoggedIn,
    #[error("No food detected in the image")]
    NoFoodDetected,
    #[error("Could not read the analysis response: {0}")]
    MalformedAnalysis(String),
}

/// Returns the [`TrackerError`] carried by an `anyhow` error, if any.
#[must_use]
pub fn tracker_error(err: &anyhow::Error) -> Option<&TrackerError> {
    err.downcast_ref::<TrackerError>()
}
