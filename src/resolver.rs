//! Turns input paths into the references embedded in the page.
//!
//! Local mode wraps every path unchanged. Publish mode pushes each asset
//! through an [`AssetStore`]; a material file is first rewritten so that its
//! diffuse-map declarations point at published textures, and the rewritten
//! sibling is what gets published.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::asset::{ensure_file, AssetPaths, AssetReference, ResolvedAssets};
use crate::error::Result;
use crate::persist;
use crate::store::AssetStore;

/// Diffuse texture directive in a material library.
pub const DIFFUSE_MAP: &str = "map_Kd";

const ONLINE_MARKER: &str = "_online";

/// Wraps every supplied path as a local reference.
///
/// Only checks that the files exist.
pub fn resolve_local(paths: &AssetPaths) -> Result<ResolvedAssets> {
  for path in paths.iter() {
    ensure_file(path)?;
  }
  Ok(ResolvedAssets {
    object: AssetReference::local(&paths.object),
    texture: paths.texture.as_deref().map(AssetReference::local),
    material: paths.material.as_deref().map(AssetReference::local),
  })
}

/// Publishes every asset the page needs through `store`.
///
/// A texture is only published when no material file is given, since the
/// material takes over texturing. Calls are issued one at a time.
pub async fn publish<S: AssetStore>(
  paths: &AssetPaths,
  store: &S,
) -> Result<ResolvedAssets> {
  ensure_file(&paths.object)?;
  let object = publish_file(&paths.object, store).await?;

  let texture = match (&paths.texture, &paths.material) {
    (Some(texture), None) => {
      ensure_file(texture)?;
      Some(publish_file(texture, store).await?)
    }
    _ => None,
  };

  let material = match &paths.material {
    Some(material) => Some(publish_material(material, store).await?),
    None => None,
  };

  Ok(ResolvedAssets { object, texture, material })
}

async fn publish_file<S: AssetStore>(
  path: &Path,
  store: &S,
) -> Result<AssetReference> {
  let url = store.store(path).await?;
  log::info!("published {} -> {}", path.display(), url);
  Ok(AssetReference::Remote(url))
}

/// Rewrites a material file against `store`, writes the `_online` sibling
/// and publishes that sibling.
///
/// The original file is left untouched. The sibling stays on disk even if
/// publishing it fails afterwards.
pub async fn publish_material<S: AssetStore>(
  path: &Path,
  store: &S,
) -> Result<AssetReference> {
  ensure_file(path)?;
  let source = tokio::fs::read_to_string(path).await?;
  let base = path.parent().unwrap_or_else(|| Path::new(""));

  let rewritten = rewrite_material(&source, base, store).await?;

  let online = online_path(path);
  persist::write_file(&online, rewritten.as_bytes())?;
  log::info!("wrote rewritten material {}", online.display());

  publish_file(&online, store).await
}

/// Declaration line -> published texture, for one material file.
///
/// Keyed on the whole trimmed line rather than the texture path, so two
/// declarations naming the same file with different spacing are published
/// separately.
#[derive(Debug, Default)]
pub struct MaterialRewriteMap {
  entries: HashMap<String, AssetReference>,
}

impl MaterialRewriteMap {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, line: &str) -> Option<&AssetReference> {
    self.entries.get(line)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Returns the reference for `line`, publishing `texture` only the first
  /// time the line is seen.
  pub async fn resolve<S: AssetStore>(
    &mut self,
    line: &str,
    texture: &Path,
    store: &S,
  ) -> Result<AssetReference> {
    if let Some(known) = self.get(line) {
      log::debug!("reusing {} for `{}`", known, line);
      return Ok(known.clone());
    }
    let reference = publish_file(texture, store).await?;
    self.entries.insert(line.to_string(), reference.clone());
    Ok(reference)
  }
}

/// Replaces every diffuse-map declaration in `source` with one pointing at
/// the published texture. Texture paths are taken relative to `base`.
///
/// Lines are scanned in order so later duplicates hit the map filled by
/// earlier ones. All other bytes pass through unchanged.
pub async fn rewrite_material<S: AssetStore>(
  source: &str,
  base: &Path,
  store: &S,
) -> Result<String> {
  let mut map = MaterialRewriteMap::new();
  let mut out = String::with_capacity(source.len());

  for raw in source.split_inclusive('\n') {
    let (body, ending) = split_line_ending(raw);
    let line = body.trim();

    let mut tokens = line.split_whitespace();
    if tokens.next() != Some(DIFFUSE_MAP) {
      out.push_str(raw);
      continue;
    }
    let Some(texture) = tokens.next() else {
      log::warn!("`{}` names no texture, leaving it as is", line);
      out.push_str(raw);
      continue;
    };

    let reference = map.resolve(line, &base.join(texture), store).await?;
    out.push_str(DIFFUSE_MAP);
    out.push(' ');
    out.push_str(reference.as_str());
    out.push_str(ending);
  }

  Ok(out)
}

fn split_line_ending(raw: &str) -> (&str, &str) {
  if let Some(body) = raw.strip_suffix("\r\n") {
    (body, "\r\n")
  } else if let Some(body) = raw.strip_suffix('\n') {
    (body, "\n")
  } else {
    (raw, "")
  }
}

/// `model.mtl` -> `model_online.mtl`, next to the original.
pub fn online_path(path: &Path) -> PathBuf {
  let stem = path
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_default();
  let name = match path.extension() {
    Some(ext) => format!("{stem}{ONLINE_MARKER}.{}", ext.to_string_lossy()),
    None => format!("{stem}{ONLINE_MARKER}"),
  };
  path.with_file_name(name)
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;
  use crate::error::Error;

  fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, name).unwrap();
    path
  }

  #[test]
  fn local_mode_wraps_paths_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let object = touch(dir.path(), "cube.obj");
    let texture = touch(dir.path(), "skin.png");

    let paths = AssetPaths::new(&object).with_texture(&texture);
    let resolved = resolve_local(&paths).unwrap();

    assert_eq!(resolved.object, AssetReference::local(&object));
    assert_eq!(resolved.texture, Some(AssetReference::local(&texture)));
    assert_eq!(resolved.material, None);
  }

  #[test]
  fn local_mode_requires_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    let object = touch(dir.path(), "cube.obj");

    let missing = AssetPaths::new(dir.path().join("nope.obj"));
    assert!(matches!(resolve_local(&missing), Err(Error::NotFound(_))));

    let missing_texture =
      AssetPaths::new(&object).with_texture(dir.path().join("nope.png"));
    assert!(matches!(resolve_local(&missing_texture), Err(Error::NotFound(_))));
  }

  #[test]
  fn online_path_inserts_marker_before_extension() {
    assert_eq!(
      online_path(Path::new("assets/cube.mtl")),
      PathBuf::from("assets/cube_online.mtl")
    );
    assert_eq!(
      online_path(Path::new("materials")),
      PathBuf::from("materials_online")
    );
  }
}
