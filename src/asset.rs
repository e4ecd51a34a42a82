use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Where the generated page loads an asset from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetReference {
  /// Path relative to the output HTML, embedded as given.
  Local(String),
  /// Public URL returned by the remote store.
  Remote(String),
}

impl AssetReference {
  pub fn local(path: &Path) -> Self {
    AssetReference::Local(path.to_string_lossy().into_owned())
  }

  /// The text interpolated into the page.
  pub fn as_str(&self) -> &str {
    match self {
      AssetReference::Local(path) => path,
      AssetReference::Remote(url) => url,
    }
  }
}

impl fmt::Display for AssetReference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The input files of one conversion.
#[derive(Clone, Debug, Default)]
pub struct AssetPaths {
  pub object: PathBuf,
  pub texture: Option<PathBuf>,
  pub material: Option<PathBuf>,
}

impl AssetPaths {
  pub fn new(object: impl Into<PathBuf>) -> Self {
    Self {
      object: object.into(),
      texture: None,
      material: None,
    }
  }

  pub fn with_texture(mut self, texture: impl Into<PathBuf>) -> Self {
    self.texture = Some(texture.into());
    self
  }

  pub fn with_material(mut self, material: impl Into<PathBuf>) -> Self {
    self.material = Some(material.into());
    self
  }

  /// Every supplied path, object first.
  pub fn iter(&self) -> impl Iterator<Item = &Path> {
    std::iter::once(self.object.as_path())
      .chain(self.texture.as_deref())
      .chain(self.material.as_deref())
  }
}

/// Resolver output, one reference per supplied input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedAssets {
  pub object: AssetReference,
  pub texture: Option<AssetReference>,
  pub material: Option<AssetReference>,
}

/// Fails with `NotFound` unless `path` is an existing regular file.
pub(crate) fn ensure_file(path: &Path) -> Result<()> {
  if path.is_file() {
    Ok(())
  } else {
    Err(Error::NotFound(path.display().to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reference_text_is_the_path_or_url() {
    let local = AssetReference::local(Path::new("models/cube.obj"));
    assert_eq!(local.as_str(), "models/cube.obj");

    let remote = AssetReference::Remote("https://host/files/1".into());
    assert_eq!(remote.to_string(), "https://host/files/1");
  }

  #[test]
  fn iter_yields_supplied_paths_in_order() {
    let paths = AssetPaths::new("cube.obj").with_material("cube.mtl");
    let all: Vec<_> = paths.iter().collect();
    assert_eq!(all, vec![Path::new("cube.obj"), Path::new("cube.mtl")]);
  }
}
