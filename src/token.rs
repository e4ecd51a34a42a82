//! Saved Canvas access tokens, one file per host.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::persist;

const APP_DIR: &str = "obj_to_html";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
  Windows,
  Unix,
}

impl Platform {
  pub fn current() -> Self {
    if cfg!(windows) {
      Platform::Windows
    } else {
      Platform::Unix
    }
  }
}

/// Per-user configuration directory under `home`.
pub fn config_directory(platform: Platform, home: &Path) -> PathBuf {
  match platform {
    Platform::Windows => home.join("Documents").join(APP_DIR),
    Platform::Unix => home.join(".config").join(APP_DIR),
  }
}

#[derive(Clone, Debug)]
pub struct TokenStore {
  dir: PathBuf,
}

impl TokenStore {
  /// Tokens live in `<config_dir>/tokens`.
  pub fn new(config_dir: impl Into<PathBuf>) -> Self {
    Self {
      dir: config_dir.into().join("tokens"),
    }
  }

  pub fn path_for(&self, host: &str) -> Result<PathBuf> {
    if host.trim().is_empty() {
      return Err(Error::value("missing host"));
    }
    let key = host.replace('.', "_");
    Ok(self.dir.join(format!("{key}_access_token")))
  }

  pub fn save(&self, token: &str, host: &str) -> Result<()> {
    let path = self.path_for(host)?;
    fs::create_dir_all(&self.dir)?;
    persist::write_private(&path, token.as_bytes())?;
    log::info!("saved access token for {host}");
    Ok(())
  }

  pub fn load(&self, host: &str) -> Result<String> {
    let path = self.path_for(host)?;
    if !path.is_file() {
      return Err(Error::NotFound(format!("no saved access token for {host}")));
    }
    Ok(fs::read_to_string(&path)?.trim().to_string())
  }
}
