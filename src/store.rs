//! Seam between the resolver and wherever assets get published.

use std::future::Future;
use std::path::Path;

use crate::error::Result;

/// Publishes a local file and returns the public URL it can be fetched from.
///
/// Each call is one round trip; callers await it before issuing the next.
pub trait AssetStore: Send + Sync {
  fn store(&self, path: &Path) -> impl Future<Output = Result<String>> + Send;
}

