//! Error types shared by the resolver, context builder and front end.

use thiserror::Error;

/// Every way a conversion can fail.
///
/// Errors propagate to the caller unmodified; nothing inside the library
/// retries or recovers.
#[derive(Error, Debug)]
pub enum Error {
  /// A local file or a saved access token does not exist.
  #[error("not found: {0}")]
  NotFound(String),

  /// The remote store rejected the access token.
  #[error("authentication failed: {0}")]
  Authentication(String),

  /// Any other remote store failure (transport, status, malformed reply).
  #[error("upload failed: {0}")]
  Upload(String),

  /// Invalid view parameters or a missing required field.
  #[error("{0}")]
  Value(String),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("template error: {0}")]
  Template(#[from] minijinja::Error),

  #[error("file watcher error: {0}")]
  Watch(#[from] notify::Error),
}

impl Error {
  pub(crate) fn value(message: impl Into<String>) -> Self {
    Error::Value(message.into())
  }
}

impl From<reqwest::Error> for Error {
  fn from(err: reqwest::Error) -> Self {
    Error::Upload(err.to_string())
  }
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
