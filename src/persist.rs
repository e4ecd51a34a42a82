use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Writes `contents` to `path` as a whole.
///
/// Data goes to a hidden sibling first and is renamed over `path` only after
/// it has been flushed, so a failed write never leaves a truncated file at
/// `path`. The sibling is removed when anything fails.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
  replace(path, contents, Access::Shared)
}

/// Like [`write_file`], but on Unix only the owner can read the result.
/// The staging file is created with mode 0600, so the contents are never
/// visible to other users.
pub fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
  replace(path, contents, Access::Owner)
}

#[derive(Clone, Copy)]
enum Access {
  Shared,
  Owner,
}

fn replace(path: &Path, contents: &[u8], access: Access) -> Result<()> {
  let staging = staging_path(path);
  let written = write_and_sync(&staging, contents, access)
    .and_then(|()| fs::rename(&staging, path));

  if let Err(err) = written {
    let _ = fs::remove_file(&staging);
    return Err(err.into());
  }
  log::debug!("wrote {} bytes to {}", contents.len(), path.display());
  Ok(())
}

fn write_and_sync(
  path: &Path,
  contents: &[u8],
  access: Access,
) -> io::Result<()> {
  let mut file = open_staging(path, access)?;
  file.write_all(contents)?;
  file.sync_all()
}

fn open_staging(path: &Path, access: Access) -> io::Result<File> {
  // A leftover staging file would keep its old mode.
  match fs::remove_file(path) {
    Err(err) if err.kind() != io::ErrorKind::NotFound => return Err(err),
    _ => {}
  }
  let mut options = OpenOptions::new();
  options.write(true).create_new(true);
  #[cfg(unix)]
  if let Access::Owner = access {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(0o600);
  }
  #[cfg(not(unix))]
  let _ = access;
  options.open(path)
}

fn staging_path(path: &Path) -> PathBuf {
  let name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  path.with_file_name(format!(".{name}.partial"))
}
