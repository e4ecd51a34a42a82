#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use obj_to_html::{AssetStore, Error, Result};

/// Hands out `https://files.test/<n>/<file name>` and records every call.
#[derive(Default)]
pub struct RecordingStore {
  calls: Mutex<Vec<PathBuf>>,
}

impl RecordingStore {
  pub fn calls(&self) -> Vec<PathBuf> {
    self.calls.lock().unwrap().clone()
  }
}

impl AssetStore for RecordingStore {
  async fn store(&self, path: &Path) -> Result<String> {
    let mut calls = self.calls.lock().unwrap();
    calls.push(path.to_path_buf());
    let name = path.file_name().unwrap().to_string_lossy();
    Ok(format!("https://files.test/{}/{}", calls.len(), name))
  }
}

/// Rejects every file as if the saved token had expired.
#[derive(Default)]
pub struct RejectingStore {
  calls: Mutex<usize>,
}

impl RejectingStore {
  pub fn calls(&self) -> usize {
    *self.calls.lock().unwrap()
  }
}

impl AssetStore for RejectingStore {
  async fn store(&self, _path: &Path) -> Result<String> {
    *self.calls.lock().unwrap() += 1;
    Err(Error::Authentication("announce rejected with 401".into()))
  }
}

pub fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
  let path = dir.join(name);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(&path, contents).unwrap();
  path
}

pub const CUBE_OBJ: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
f 1 2 3
";
