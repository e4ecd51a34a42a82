//! Publishes files to a Canvas LMS file area.
//!
//! Canvas uploads are a three-step exchange:
//!
//! 1. announce the file (name and target folder) to the files API, which
//!    answers with an `upload_url` and the `upload_params` to send along;
//! 2. POST the params and the bytes as a multipart form to `upload_url`;
//! 3. if the upload answered with a location, POST to it to confirm.
//!
//! The last response that carries a `url` gives the public link.

use std::path::Path;

use reqwest::header::LOCATION;
use reqwest::multipart::{Form, Part};
use reqwest::{redirect, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::asset::ensure_file;
use crate::error::{Error, Result};
use crate::store::AssetStore;

/// Where and as whom to upload.
#[derive(Clone, Debug)]
pub struct CanvasConfig {
  /// Canvas instance, e.g. `canvas.sydney.edu.au`.
  pub host: String,
  pub access_token: String,
  /// Folder path inside the file area; empty for the root.
  pub directory: String,
  /// Upload into this course's files instead of the user's own.
  pub course_id: Option<u64>,
}

impl CanvasConfig {
  /// `https://{host}/api/v1/{courses/<id> | users/self}/files`
  pub fn files_endpoint(&self) -> String {
    format!("https://{}/api/v1/{}/files", self.host, self.owner())
  }

  fn owner(&self) -> String {
    match self.course_id {
      Some(id) => format!("courses/{id}"),
      None => "users/self".to_string(),
    }
  }
}

#[derive(Deserialize)]
struct UploadTicket {
  upload_url: String,
  #[serde(default)]
  upload_params: Map<String, Value>,
}

#[derive(Deserialize)]
struct UploadedFile {
  url: Option<String>,
  location: Option<String>,
}

pub struct CanvasStore {
  client: Client,
  config: CanvasConfig,
  endpoint: String,
}

impl CanvasStore {
  pub fn new(config: CanvasConfig) -> Result<Self> {
    if config.host.trim().is_empty() {
      return Err(Error::value("missing host"));
    }
    // Canvas signals "confirm here" with a redirect we must not follow
    let client = Client::builder()
      .redirect(redirect::Policy::none())
      .build()?;
    let endpoint = config.files_endpoint();
    Ok(Self { client, config, endpoint })
  }

  /// Sends the announce step to `endpoint` instead of the Canvas host.
  pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
    self.endpoint = endpoint.into();
    self
  }

  async fn announce(&self, name: &str) -> Result<UploadTicket> {
    let params = [
      ("name", name),
      ("parent_folder_path", self.config.directory.as_str()),
    ];
    let response = self
      .client
      .post(&self.endpoint)
      .bearer_auth(&self.config.access_token)
      .form(&params)
      .send()
      .await?;
    let response = check(response, "announce")?;
    decode(response, "announce").await
  }

  async fn upload(
    &self,
    ticket: UploadTicket,
    name: &str,
    bytes: Vec<u8>,
  ) -> Result<UploadedFile> {
    let mut form = Form::new();
    for (key, value) in ticket.upload_params {
      let value = match value {
        Value::String(s) => s,
        other => other.to_string(),
      };
      form = form.text(key, value);
    }
    // Canvas requires the file to be the last field
    form = form.part("file", Part::bytes(bytes).file_name(name.to_string()));

    let response = self
      .client
      .post(&ticket.upload_url)
      .multipart(form)
      .send()
      .await?;

    if response.status().is_redirection() {
      let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| {
          Error::Upload("upload redirected without a location".into())
        })?;
      return Ok(UploadedFile {
        url: None,
        location: Some(location),
      });
    }
    let response = check(response, "upload")?;
    decode(response, "upload").await
  }

  async fn confirm(&self, location: &str) -> Result<UploadedFile> {
    let response = self
      .client
      .post(location)
      .bearer_auth(&self.config.access_token)
      .send()
      .await?;
    let response = check(response, "confirm")?;
    decode(response, "confirm").await
  }
}

impl AssetStore for CanvasStore {
  async fn store(&self, path: &Path) -> Result<String> {
    ensure_file(path)?;
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .ok_or_else(|| Error::NotFound(path.display().to_string()))?;
    let bytes = tokio::fs::read(path).await?;

    let ticket = self.announce(&name).await?;
    let uploaded = self.upload(ticket, &name, bytes).await?;

    let url = match uploaded.location {
      Some(location) => {
        let confirmed = self.confirm(&location).await?;
        confirmed.url.or(uploaded.url)
      }
      None => uploaded.url,
    };
    url.ok_or_else(|| {
      Error::Upload(format!("no file url returned for {name}"))
    })
  }
}

fn check(response: Response, step: &str) -> Result<Response> {
  let status = response.status();
  match status {
    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
      Error::Authentication(format!("{step} rejected with {status}")),
    ),
    s if s.is_success() => Ok(response),
    _ => Err(Error::Upload(format!("{step} failed with {status}"))),
  }
}

async fn decode<T: DeserializeOwned>(
  response: Response,
  step: &str,
) -> Result<T> {
  let body = response.bytes().await?;
  serde_json::from_slice(&body)
    .map_err(|err| Error::Upload(format!("{step} returned malformed json: {err}")))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config(course_id: Option<u64>) -> CanvasConfig {
    CanvasConfig {
      host: "canvas.example.edu".into(),
      access_token: "t".into(),
      directory: "models".into(),
      course_id,
    }
  }

  #[test]
  fn endpoint_targets_user_or_course() {
    assert_eq!(
      config(None).files_endpoint(),
      "https://canvas.example.edu/api/v1/users/self/files"
    );
    assert_eq!(
      config(Some(42)).files_endpoint(),
      "https://canvas.example.edu/api/v1/courses/42/files"
    );
  }

  #[test]
  fn empty_host_is_rejected() {
    let mut cfg = config(None);
    cfg.host = String::new();
    assert!(matches!(CanvasStore::new(cfg), Err(Error::Value(_))));
  }

  #[tokio::test]
  async fn missing_file_fails_before_any_request() {
    let store = CanvasStore::new(config(None))
      .unwrap()
      .with_endpoint("http://127.0.0.1:9/unreachable");
    let err = store.store(Path::new("no/such/file.obj")).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
  }
}
